//! The seam between the pipelines and whatever generative service answers them.

use async_trait::async_trait;

use crate::error::Result;
use crate::image::{GeneratedImage, UploadedImage};

/// A generative-AI service able to draw panels and write text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Short name for logs and the status bar.
    fn name(&self) -> &str;

    /// Generate one image from a prompt plus the reference photo.
    ///
    /// Must fail with [`crate::StoryError::NoImageData`] when the response
    /// carries no inline image.
    async fn generate_image(&self, prompt: &str, reference: &UploadedImage)
        -> Result<GeneratedImage>;

    /// Generate plain text from a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}
