//! Storyboard slots and what lands in them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, StoryError};
use crate::image::{download_file_name, GeneratedImage};
use crate::template::PromptTemplate;

/// Shown in a slot whose image request failed.
pub const PANEL_FAILED_MESSAGE: &str = "Failed to generate image. Please try again.";

/// Outcome of one panel request once it has settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelResult {
    Generated(GeneratedImage),
    /// Carries the underlying error text for logs; the view shows
    /// [`PANEL_FAILED_MESSAGE`].
    Failed(String),
}

impl PanelResult {
    pub fn is_generated(&self) -> bool {
        matches!(self, PanelResult::Generated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    Loading,
    Ready(GeneratedImage),
    Failed,
}

/// The render target for one panel position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSlot {
    pub id: String,
    pub title: String,
    pub caption: String,
    pub content: SlotContent,
}

impl PanelSlot {
    pub fn placeholder(template: &PromptTemplate) -> Self {
        Self {
            id: template.slot_id(),
            title: template.title.clone(),
            caption: template.caption.clone(),
            content: SlotContent::Loading,
        }
    }

    pub fn settle(&mut self, result: PanelResult) {
        self.content = match result {
            PanelResult::Generated(image) => SlotContent::Ready(image),
            PanelResult::Failed(_) => SlotContent::Failed,
        };
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match &self.content {
            SlotContent::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn download_file_name(&self) -> String {
        download_file_name(&self.title)
    }
}

/// Write a ready panel's image into `dir` under its download name.
pub async fn export_panel(slot: &PanelSlot, dir: &Path) -> Result<PathBuf> {
    let image = slot
        .image()
        .ok_or_else(|| StoryError::PanelNotReady(slot.title.clone()))?;
    let bytes = image.decode()?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(slot.download_file_name());
    tokio::fs::write(&path, &bytes).await?;

    info!(panel = %slot.id, path = %path.display(), bytes = bytes.len(), "Panel exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opponent::Opponent;
    use crate::template::storyboard_prompts;

    fn walkout_slot() -> PanelSlot {
        PanelSlot::placeholder(&storyboard_prompts(Opponent::default())[0])
    }

    #[test]
    fn placeholder_is_keyed_by_title() {
        let slot = walkout_slot();
        assert_eq!(slot.id, "panel-The-Walkout");
        assert_eq!(slot.content, SlotContent::Loading);
        assert_eq!(slot.download_file_name(), "SlamStory-The-Walkout.png");
    }

    #[tokio::test]
    async fn export_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let mut slot = walkout_slot();
        slot.settle(PanelResult::Generated(GeneratedImage::new(
            Some("image/png".to_string()),
            "cG5nLWJ5dGVz".to_string(),
        )));

        let path = export_panel(&slot, &out).await.unwrap();

        assert_eq!(path, out.join("SlamStory-The-Walkout.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn export_refuses_unsettled_or_failed_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = walkout_slot();

        let err = export_panel(&slot, dir.path()).await.unwrap_err();
        assert!(matches!(err, StoryError::PanelNotReady(_)));

        slot.settle(PanelResult::Failed("boom".to_string()));
        let err = export_panel(&slot, dir.path()).await.unwrap_err();
        assert!(matches!(err, StoryError::PanelNotReady(_)));
    }
}
