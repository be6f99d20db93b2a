//! Headless mode: the whole story in one pass, printed to stdout.

use anyhow::Result;
use std::path::Path;
use tracing::{error, info, warn};

use slamstory_core::image::read_image;
use slamstory_core::panel::{export_panel, SlotContent, PANEL_FAILED_MESSAGE};
use slamstory_core::pipeline::{generate_storyboard, generate_text_features};
use slamstory_core::text::{TextContent, TextFeature};
use slamstory_core::{GenerativeBackend, Opponent, StoryState};

/// Generate everything for `image`, save the ready panels into `out_dir`
/// and print both texts. A panel that cannot be saved is reported and
/// skipped. Returns the final state.
pub async fn run(
    backend: &dyn GenerativeBackend,
    image: &Path,
    opponent: Opponent,
    out_dir: &Path,
) -> Result<StoryState> {
    let mut state = StoryState::new();
    state.set_image(Some(read_image(image).await?))?;
    state.select_opponent(opponent);

    println!("SlamStory: you vs. {}", opponent);
    generate_storyboard(&mut state, backend).await?;

    let mut saved = 0;
    for (index, slot) in state.slots.iter().enumerate() {
        if !matches!(slot.content, SlotContent::Ready(_)) {
            println!("  [{}] {}: {}", index + 1, slot.title, PANEL_FAILED_MESSAGE);
            continue;
        }
        match export_panel(slot, out_dir).await {
            Ok(path) => {
                saved += 1;
                println!("  [{}] {}: {}", index + 1, slot.title, path.display());
            }
            Err(e) => {
                error!(title = %slot.title, "Export failed: {}", e);
                println!("  [{}] {}: could not save ({})", index + 1, slot.title, e);
            }
        }
    }

    if saved < state.slots.len() {
        warn!(saved, total = state.slots.len(), "Not every panel was saved");
    }
    info!(saved, dir = %out_dir.display(), "Panels written");

    generate_text_features(&mut state, backend).await?;
    for &feature in TextFeature::all() {
        println!();
        println!("== {} ==", feature.heading());
        match &state.text_container(feature).content {
            TextContent::Ready(text) => println!("{}", text),
            TextContent::Failed(message) => println!("{}", message),
            TextContent::Empty | TextContent::Loading => {}
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use slamstory_core::image::{GeneratedImage, UploadedImage};
    use slamstory_core::state::ViewState;

    struct FixedBackend;

    #[async_trait]
    impl GenerativeBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _reference: &UploadedImage,
        ) -> slamstory_core::Result<GeneratedImage> {
            Ok(GeneratedImage::new(None, "iVBORw0KGgo=".to_string()))
        }

        async fn generate_text(&self, _prompt: &str) -> slamstory_core::Result<String> {
            Ok("Game, set and match!".to_string())
        }
    }

    fn photo(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("me.jpg");
        std::fs::write(&path, b"selfie").unwrap();
        path
    }

    #[tokio::test]
    async fn writes_every_ready_panel() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let state = run(&FixedBackend, &photo(dir.path()), Opponent::default(), &out)
            .await
            .unwrap();

        for slot in &state.slots {
            assert!(out.join(slot.download_file_name()).is_file());
        }
        assert_eq!(state.view, ViewState::TextComplete);
    }

    #[tokio::test]
    async fn unwritable_output_still_produces_the_texts() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the output directory should go.
        let out = dir.path().join("taken");
        std::fs::write(&out, b"").unwrap();

        let state = run(&FixedBackend, &photo(dir.path()), Opponent::default(), &out)
            .await
            .unwrap();

        assert_eq!(state.view, ViewState::TextComplete);
        assert_eq!(
            state.commentary.content,
            TextContent::Ready("Game, set and match!".to_string())
        );
        assert_eq!(
            state.interview.content,
            TextContent::Ready("Game, set and match!".to_string())
        );
    }
}
