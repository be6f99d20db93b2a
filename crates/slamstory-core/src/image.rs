//! Image intake and generated image payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StoryError};

/// MIME type assumed when the file extension says nothing useful.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// MIME type assumed for generated panels that do not declare one.
pub const GENERATED_MIME_TYPE: &str = "image/png";

/// The user's reference photo, base64-encoded for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// File name shown in the preview area.
    pub display_name: String,
    pub mime_type: String,
    pub data_base64: String,
}

impl UploadedImage {
    pub fn from_bytes(display_name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            data_base64: STANDARD.encode(bytes),
        }
    }
}

/// Read the selected file and encode it. The contents are not validated;
/// a bad file only fails once the backend rejects it.
pub async fn read_image(path: &Path) -> Result<UploadedImage> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(StoryError::NoFile),
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(StoryError::NoFile);
    }

    let bytes = tokio::fs::read(path).await?;
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_for_path(path);
    debug!(file = %display_name, mime = mime_type, bytes = bytes.len(), "Image read");

    Ok(UploadedImage::from_bytes(display_name, mime_type, &bytes))
}

/// Guess the MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    known_mime(path).unwrap_or(DEFAULT_MIME_TYPE)
}

/// Whether a path looks like something worth offering in the file picker.
pub fn is_image_path(path: &Path) -> bool {
    known_mime(path).is_some()
}

fn known_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// An image returned by the backend for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data_base64: String,
}

impl GeneratedImage {
    pub fn new(mime_type: Option<String>, data_base64: String) -> Self {
        Self {
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERATED_MIME_TYPE.to_string()),
            data_base64,
        }
    }

    /// `data:` URL suitable for display or embedding.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data_base64.as_bytes())?)
    }

    /// Size of the decoded payload without decoding it.
    pub fn approx_len(&self) -> usize {
        self.data_base64.len() / 4 * 3
    }
}

/// Deterministic download name for a panel: `SlamStory-<title>.png`, with every
/// character outside `[A-Za-z0-9]` replaced by `-`.
pub fn download_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("SlamStory-{cleaned}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_names_replace_every_non_alphanumeric() {
        assert_eq!(download_file_name("VICTORY!"), "SlamStory-VICTORY-.png");
        assert_eq!(
            download_file_name("The Opening Serve"),
            "SlamStory-The-Opening-Serve.png"
        );
    }

    #[test]
    fn mime_types_follow_extensions() {
        assert_eq!(mime_for_path(Path::new("me.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("me.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("me")), DEFAULT_MIME_TYPE);
        assert!(is_image_path(Path::new("me.jpg")));
        assert!(is_image_path(Path::new("me.heic")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("Pictures")));
    }

    #[test]
    fn generated_image_defaults_to_png() {
        let image = GeneratedImage::new(None, "aGVsbG8=".to_string());
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(image.decode().unwrap(), b"hello");
    }

    #[tokio::test]
    async fn reading_a_missing_file_is_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image(&dir.path().join("absent.jpg")).await.unwrap_err();
        assert!(matches!(err, StoryError::NoFile));

        let err = read_image(dir.path()).await.unwrap_err();
        assert!(matches!(err, StoryError::NoFile));
    }

    #[tokio::test]
    async fn reading_encodes_without_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selfie.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let image = read_image(&path).await.unwrap();

        assert_eq!(image.display_name, "selfie.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(
            STANDARD.decode(image.data_base64).unwrap(),
            b"definitely not a png"
        );
    }
}
