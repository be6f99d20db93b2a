//! HTTP client for the Gemini `generateContent` API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use slamstory_core::image::{GeneratedImage, UploadedImage};
use slamstory_core::{GenerativeBackend, SlamConfig, StoryError};

use crate::protocol::*;

/// Client for the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_model: String,
    text_model: String,
}

impl GeminiClient {
    pub fn new(config: &SlamConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            api_key,
            image_model: config.models.image_model.clone(),
            text_model: config.models.text_model.clone(),
        }
    }

    /// Build a client from config, resolving the API key from the environment first.
    pub fn from_config(config: &SlamConfig) -> slamstory_core::Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(config, api_key))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model.trim())
    }

    /// Send one `generateContent` call and decode the body.
    #[instrument(skip(self, request))]
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            anyhow::bail!("Gemini returned {}: {}", status, message.trim());
        }

        let response: GenerateContentResponse = resp.json().await?;
        debug!(candidates = response.candidates.len(), "Gemini responded");
        Ok(response)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_image(
        &self,
        prompt: &str,
        reference: &UploadedImage,
    ) -> slamstory_core::Result<GeneratedImage> {
        let request =
            GenerateContentRequest::image(prompt, &reference.mime_type, &reference.data_base64);
        let response = self
            .generate_content(&self.image_model, &request)
            .await
            .map_err(|e| StoryError::PanelGeneration(format!("{e:#}")))?;

        match response.first_inline_image() {
            Some(inline) => Ok(GeneratedImage::new(
                Some(inline.mime_type.clone()),
                inline.data.clone(),
            )),
            None => {
                if let Some(reason) = response.refusal() {
                    debug!(%reason, "No image in Gemini response");
                }
                Err(StoryError::NoImageData)
            }
        }
    }

    async fn generate_text(&self, prompt: &str) -> slamstory_core::Result<String> {
        let request = GenerateContentRequest::text(prompt);
        let response = self
            .generate_content(&self.text_model, &request)
            .await
            .map_err(|e| StoryError::TextGeneration(format!("{e:#}")))?;

        response.text().ok_or_else(|| {
            let reason = response
                .refusal()
                .unwrap_or_else(|| "empty response".to_string());
            StoryError::TextGeneration(reason)
        })
    }
}
