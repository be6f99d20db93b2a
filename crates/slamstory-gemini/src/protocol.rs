//! Request and response types for the Gemini `generateContent` endpoint.
//! Field names follow the REST API's camelCase JSON.

use serde::{Deserialize, Serialize};

// ── Request ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A prompt plus a reference image, asking for image and text back.
    pub fn image(prompt: &str, mime_type: &str, data_base64: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::text(prompt),
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: data_base64.to_string(),
                        }),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Image, Modality::Text],
            }),
        }
    }

    /// A plain text prompt.
    pub fn text(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Image,
    Text,
}

// ── Response ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// The first part of the first candidate that carries inline image bytes.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref().filter(|d| !d.data.is_empty()))
    }

    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why the API produced nothing usable, when it says so.
    pub fn refusal(&self) -> Option<String> {
        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
            return Some(format!("prompt blocked: {reason}"));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .filter(|r| r != "STOP")
            .map(|r| format!("finish reason: {r}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_request_carries_prompt_reference_and_modalities() {
        let request = GenerateContentRequest::image("Match Point.", "image/jpeg", "c2VsZmll");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{
                    "parts": [
                        {"text": "Match Point."},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "c2VsZmll"}}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
            })
        );
    }

    #[test]
    fn text_request_has_no_generation_config() {
        let value = serde_json::to_value(GenerateContentRequest::text("hi")).unwrap();
        assert_eq!(value, json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn first_inline_image_skips_empty_inline_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": ""}},
                        {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
                    ]
                }
            }]
        }))
        .unwrap();

        let image = response.first_inline_image().expect("second part has bytes");
        assert_eq!(image.data, "c2Vjb25k");
    }

    #[test]
    fn first_inline_image_skips_leading_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your panel."},
                        {"inlineData": {"mimeType": "image/png", "data": "Zmlyc3Q="}},
                        {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let image = response.first_inline_image().unwrap();
        assert_eq!(image.data, "Zmlyc3Q=");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(response.text().as_deref(), Some("Here is your panel."));
        assert!(response.refusal().is_none());
    }

    #[test]
    fn text_only_or_empty_responses_have_no_image() {
        let text_only: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't draw that."}]}}]
        }))
        .unwrap();
        assert!(text_only.first_inline_image().is_none());

        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(blocked.first_inline_image().is_none());
        assert!(blocked.text().is_none());
        assert_eq!(blocked.refusal().as_deref(), Some("prompt blocked: SAFETY"));
    }

    #[test]
    fn api_errors_parse() {
        let err: ErrorResponse = serde_json::from_value(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        }))
        .unwrap();
        assert_eq!(err.error.code, 400);
        assert_eq!(err.error.message, "API key not valid.");
    }
}
