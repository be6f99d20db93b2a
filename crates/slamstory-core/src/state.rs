//! Application state and the view state machine.
//!
//! `StoryState` is the single owner of everything the view shows: the stored
//! photo, the storyboard slots, the text containers and the control labels.
//! Pipelines never touch it directly; they hand back settled results tagged
//! with the generation that produced them, and results from a generation
//! that has since been reset or replaced are dropped.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, StoryError};
use crate::image::UploadedImage;
use crate::opponent::Opponent;
use crate::panel::{PanelResult, PanelSlot};
use crate::template::{storyboard_prompts, PromptTemplate};
use crate::text::{TextContent, TextFeature, TextOutcome, TextPanel};

pub const PLACEHOLDER_PREVIEW: &str =
    "https://placehold.co/200x200/374151/E5E7EB?text=Upload+Photo";
pub const UPLOAD_PROMPT: &str = "Click here to upload a clear, front-facing photo.";
pub const UPLOAD_READY: &str = "Photo selected. Ready to generate!";
pub const GENERATE_LABEL: &str = "Step 2: Generate My SlamStory!";
pub const GENERATING_LABEL: &str = "Generating... Please Wait...";
pub const TEXT_LABEL: &str = "✨ Generate Match Commentary & Interview";
pub const TEXT_GENERATING_LABEL: &str = "Generating...";
pub const TEXT_REGENERATE_LABEL: &str = "✨ Regenerate Commentary & Interview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    Idle,
    Generating,
    PanelsComplete,
    TextGenerating,
    TextComplete,
}

impl ViewState {
    pub fn upload_visible(&self) -> bool {
        *self == ViewState::Idle
    }

    pub fn storyboard_visible(&self) -> bool {
        !self.upload_visible()
    }

    pub fn text_section_visible(&self) -> bool {
        matches!(
            self,
            ViewState::PanelsComplete | ViewState::TextGenerating | ViewState::TextComplete
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "Upload",
            ViewState::Generating => "Generating",
            ViewState::PanelsComplete => "Storyboard",
            ViewState::TextGenerating => "Writing",
            ViewState::TextComplete => "Complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Placeholder,
    Selected(String),
}

impl Preview {
    pub fn label(&self) -> &str {
        match self {
            Preview::Placeholder => PLACEHOLDER_PREVIEW,
            Preview::Selected(name) => name,
        }
    }
}

/// A button-like affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub enabled: bool,
}

impl Control {
    fn new(label: &str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            enabled,
        }
    }

    fn set(&mut self, label: &str, enabled: bool) {
        self.label = label.to_string();
        self.enabled = enabled;
    }
}

/// Everything a panel run needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub generation: u64,
    pub opponent: Opponent,
    pub image: Arc<UploadedImage>,
    pub templates: Vec<PromptTemplate>,
}

#[derive(Debug, Clone, Copy)]
pub struct TextTicket {
    pub generation: u64,
    pub opponent: Opponent,
}

#[derive(Debug, Clone)]
pub struct StoryState {
    pub image: Option<Arc<UploadedImage>>,
    pub preview: Preview,
    pub upload_label: String,
    /// Current value of the opponent selector.
    pub opponent: Opponent,
    pub view: ViewState,
    pub slots: Vec<PanelSlot>,
    pub commentary: TextPanel,
    pub interview: TextPanel,
    pub generate_control: Control,
    pub text_control: Control,
    pub error_banner: Option<String>,
    generation: u64,
}

impl Default for StoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryState {
    pub fn new() -> Self {
        Self {
            image: None,
            preview: Preview::Placeholder,
            upload_label: UPLOAD_PROMPT.to_string(),
            opponent: Opponent::default(),
            view: ViewState::Idle,
            slots: Vec::new(),
            commentary: TextPanel::default(),
            interview: TextPanel::default(),
            generate_control: Control::new(GENERATE_LABEL, false),
            text_control: Control::new(TEXT_LABEL, true),
            error_banner: None,
            generation: 0,
        }
    }

    /// Token of the run whose results are currently accepted.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Store the selected photo. With no file, nothing changes.
    pub fn set_image(&mut self, image: Option<UploadedImage>) -> Result<()> {
        let image = image.ok_or(StoryError::NoFile)?;
        info!(file = %image.display_name, mime = %image.mime_type, "Photo selected");
        self.preview = Preview::Selected(image.display_name.clone());
        self.upload_label = UPLOAD_READY.to_string();
        self.generate_control.enabled = true;
        self.image = Some(Arc::new(image));
        Ok(())
    }

    pub fn select_opponent(&mut self, opponent: Opponent) {
        self.opponent = opponent;
    }

    pub fn text_container(&self, feature: TextFeature) -> &TextPanel {
        match feature {
            TextFeature::Commentary => &self.commentary,
            TextFeature::Interview => &self.interview,
        }
    }

    fn text_container_mut(&mut self, feature: TextFeature) -> &mut TextPanel {
        match feature {
            TextFeature::Commentary => &mut self.commentary,
            TextFeature::Interview => &mut self.interview,
        }
    }

    /// Validate, lay out six placeholder slots and switch to the storyboard.
    ///
    /// Without a stored photo this only raises the banner: no slots are
    /// created and no template is built.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket> {
        let Some(image) = self.image.clone() else {
            warn!("Storyboard requested without a photo");
            self.error_banner = Some(StoryError::MissingImage.to_string());
            return Err(StoryError::MissingImage);
        };
        if self.view != ViewState::Idle {
            return Err(StoryError::Busy("start a new storyboard"));
        }

        let opponent = self.opponent;
        let templates = storyboard_prompts(opponent);

        self.generation += 1;
        self.generate_control.set(GENERATING_LABEL, false);
        self.view = ViewState::Generating;
        self.commentary = TextPanel::default();
        self.interview = TextPanel::default();
        self.slots = templates.iter().map(PanelSlot::placeholder).collect();
        self.error_banner = None;

        info!(
            generation = self.generation,
            opponent = %opponent,
            panels = templates.len(),
            "Storyboard generation started"
        );

        Ok(GenerationTicket {
            generation: self.generation,
            opponent,
            image,
            templates,
        })
    }

    /// Put a settled panel into its slot. Returns whether it was applied.
    pub fn apply_panel(&mut self, generation: u64, index: usize, result: PanelResult) -> bool {
        if !self.is_current(generation) {
            debug!(generation, current = self.generation, index, "Dropping stale panel result");
            return false;
        }
        let Some(slot) = self.slots.get_mut(index) else {
            warn!(index, slots = self.slots.len(), "Panel result for unknown slot");
            return false;
        };
        slot.settle(result);
        true
    }

    /// All panels have settled: offer the text features.
    pub fn finish_panels(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.view != ViewState::Generating {
            debug!(generation, "Ignoring stale storyboard completion");
            return false;
        }
        self.generate_control.label = GENERATE_LABEL.to_string();
        self.view = ViewState::PanelsComplete;
        info!(generation, "Storyboard generation finished");
        true
    }

    /// Show both text containers in their loading state and lock the control.
    pub fn begin_text(&mut self) -> Result<TextTicket> {
        if !matches!(self.view, ViewState::PanelsComplete | ViewState::TextComplete) {
            return Err(StoryError::Busy("generate commentary"));
        }

        self.generation += 1;
        self.view = ViewState::TextGenerating;
        self.text_control.set(TEXT_GENERATING_LABEL, false);
        for &feature in TextFeature::all() {
            let container = self.text_container_mut(feature);
            container.visible = true;
            container.content = TextContent::Loading;
        }

        Ok(TextTicket {
            generation: self.generation,
            opponent: self.opponent,
        })
    }

    pub fn apply_text(&mut self, generation: u64, feature: TextFeature, outcome: TextOutcome) -> bool {
        if !self.is_current(generation) {
            debug!(generation, ?feature, "Dropping stale text result");
            return false;
        }
        self.text_container_mut(feature).content = match outcome {
            TextOutcome::Generated(text) => TextContent::Ready(text),
            TextOutcome::Failed(_) => TextContent::Failed(feature.failure_message()),
        };
        true
    }

    /// Both text requests have settled, whatever their outcome.
    pub fn finish_text(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.view != ViewState::TextGenerating {
            return false;
        }
        self.text_control.set(TEXT_REGENERATE_LABEL, true);
        self.view = ViewState::TextComplete;
        true
    }

    /// Back to the upload screen with nothing stored. Safe to call repeatedly.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::new();
        self.generation = generation;
        info!(generation, "State reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GeneratedImage;
    use crate::panel::SlotContent;

    fn photo() -> UploadedImage {
        UploadedImage::from_bytes("me.jpg", "image/jpeg", b"jpeg")
    }

    fn generated() -> PanelResult {
        PanelResult::Generated(GeneratedImage::new(None, "aW1n".to_string()))
    }

    fn assert_initial(state: &StoryState) {
        assert!(state.image.is_none());
        assert_eq!(state.preview, Preview::Placeholder);
        assert_eq!(state.upload_label, UPLOAD_PROMPT);
        assert_eq!(state.opponent, Opponent::default());
        assert_eq!(state.view, ViewState::Idle);
        assert!(state.slots.is_empty());
        assert_eq!(state.commentary, TextPanel::default());
        assert_eq!(state.interview, TextPanel::default());
        assert_eq!(state.generate_control, Control::new(GENERATE_LABEL, false));
        assert_eq!(state.text_control, Control::new(TEXT_LABEL, true));
        assert!(state.error_banner.is_none());
    }

    #[test]
    fn missing_file_leaves_state_untouched() {
        let mut state = StoryState::new();
        assert!(matches!(state.set_image(None), Err(StoryError::NoFile)));
        assert_initial(&state);
    }

    #[test]
    fn selecting_a_photo_enables_generation() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();

        assert_eq!(state.upload_label, UPLOAD_READY);
        assert_eq!(state.preview, Preview::Selected("me.jpg".to_string()));
        assert!(state.generate_control.enabled);
    }

    #[test]
    fn generation_without_photo_only_shows_banner() {
        let mut state = StoryState::new();

        let err = state.begin_generation().unwrap_err();

        assert!(matches!(err, StoryError::MissingImage));
        assert_eq!(state.error_banner.as_deref(), Some("Please upload an image first."));
        assert!(state.slots.is_empty());
        assert_eq!(state.view, ViewState::Idle);
    }

    #[test]
    fn begin_generation_lays_out_placeholders() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();
        state.error_banner = Some("old".to_string());
        state.select_opponent(Opponent::NovakDjokovic);

        let ticket = state.begin_generation().unwrap();

        assert_eq!(ticket.opponent, Opponent::NovakDjokovic);
        assert_eq!(ticket.templates.len(), 6);
        assert_eq!(state.slots.len(), 6);
        assert!(state.slots.iter().all(|s| s.content == SlotContent::Loading));
        assert_eq!(state.slots[3].id, "panel-Match-Point");
        assert_eq!(state.generate_control, Control::new(GENERATING_LABEL, false));
        assert!(state.view.storyboard_visible());
        assert!(!state.view.upload_visible());
        assert!(!state.view.text_section_visible());
        assert!(state.error_banner.is_none());
    }

    #[test]
    fn panel_results_touch_only_their_slot() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();
        let ticket = state.begin_generation().unwrap();

        assert!(state.apply_panel(ticket.generation, 2, PanelResult::Failed("x".into())));

        for (i, slot) in state.slots.iter().enumerate() {
            let expected = if i == 2 { SlotContent::Failed } else { SlotContent::Loading };
            assert_eq!(slot.content, expected);
        }
        assert!(!state.apply_panel(ticket.generation, 9, generated()));
    }

    #[test]
    fn completion_reveals_text_section() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();
        let ticket = state.begin_generation().unwrap();
        for i in 0..6 {
            state.apply_panel(ticket.generation, i, generated());
        }

        assert!(state.finish_panels(ticket.generation));

        assert_eq!(state.view, ViewState::PanelsComplete);
        assert!(state.view.text_section_visible());
        assert_eq!(state.generate_control.label, GENERATE_LABEL);
    }

    #[test]
    fn text_control_cycles_through_regenerate() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();
        let ticket = state.begin_generation().unwrap();
        state.finish_panels(ticket.generation);

        let text = state.begin_text().unwrap();
        assert_eq!(state.text_control, Control::new(TEXT_GENERATING_LABEL, false));
        assert_eq!(state.commentary.content, TextContent::Loading);
        assert!(state.interview.visible);
        assert!(matches!(state.begin_text(), Err(StoryError::Busy(_))));

        state.apply_text(text.generation, TextFeature::Commentary, TextOutcome::Failed("503".into()));
        state.apply_text(
            text.generation,
            TextFeature::Interview,
            TextOutcome::Generated("How does it feel?".into()),
        );
        assert!(state.finish_text(text.generation));

        assert_eq!(
            state.commentary.content,
            TextContent::Failed("Could not generate commentary. Please try again.")
        );
        assert_eq!(state.interview.content, TextContent::Ready("How does it feel?".into()));
        assert_eq!(state.text_control, Control::new(TEXT_REGENERATE_LABEL, true));
        assert!(state.begin_text().is_ok());
    }

    #[test]
    fn text_before_storyboard_is_rejected() {
        let mut state = StoryState::new();
        assert!(matches!(state.begin_text(), Err(StoryError::Busy(_))));
        assert_initial(&state);
    }

    #[test]
    fn reset_mid_pipeline_discards_late_results() {
        let mut state = StoryState::new();
        state.set_image(Some(photo())).unwrap();
        state.select_opponent(Opponent::TaylorFritz);
        let ticket = state.begin_generation().unwrap();
        state.apply_panel(ticket.generation, 0, generated());

        state.reset();
        assert_initial(&state);

        assert!(!state.apply_panel(ticket.generation, 1, generated()));
        assert!(!state.finish_panels(ticket.generation));
        assert_initial(&state);
    }

    #[test]
    fn reset_is_idempotent_from_every_state() {
        let mut state = StoryState::new();
        state.reset();
        state.reset();
        assert_initial(&state);

        let _ = state.begin_generation();
        state.reset();
        assert_initial(&state);

        state.set_image(Some(photo())).unwrap();
        let ticket = state.begin_generation().unwrap();
        state.finish_panels(ticket.generation);
        let text = state.begin_text().unwrap();
        state.apply_text(text.generation, TextFeature::Interview, TextOutcome::Generated("q".into()));
        state.finish_text(text.generation);
        state.reset();
        assert_initial(&state);
    }
}
