//! Main application state and render loop.

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use slamstory_core::image::read_image;
use slamstory_core::panel::export_panel;
use slamstory_core::pipeline::{run_panels, run_text_features};
use slamstory_core::state::{GenerationTicket, TextTicket, ViewState};
use slamstory_core::{GenerativeBackend, Opponent, StoryState};

use crate::action::{Action, InputMode, Stage};
use crate::components::commentary::CommentaryComponent;
use crate::components::help::HelpComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::storyboard::StoryboardComponent;
use crate::components::upload::UploadComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::theme::Theme;

/// Main application state.
pub struct App {
    /// Everything the view shows.
    state: StoryState,
    /// Whether the app should exit.
    should_quit: bool,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,

    /// Image and text generation, shared with spawned tasks.
    backend: Arc<dyn GenerativeBackend>,
    /// Where saved panels are written.
    download_dir: PathBuf,
    /// Photo to load as soon as the loop starts.
    initial_image: Option<PathBuf>,

    // Components
    upload: UploadComponent,
    storyboard: StoryboardComponent,
    commentary: CommentaryComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(backend: Arc<dyn GenerativeBackend>, download_dir: PathBuf) -> Self {
        Self {
            state: StoryState::new(),
            should_quit: false,
            input_mode_flag: event::new_input_mode_flag(),
            backend,
            download_dir,
            initial_image: None,
            upload: UploadComponent::new(),
            storyboard: StoryboardComponent::new(),
            commentary: CommentaryComponent::new(),
            status_bar: StatusBarComponent::new(),
            help: HelpComponent::new(),
        }
    }

    /// Pre-fill the photo path from CLI args; it is loaded when the TUI starts.
    pub fn set_initial_image(&mut self, path: PathBuf) {
        self.upload = UploadComponent::with_path(&path.to_string_lossy());
        self.initial_image = Some(path);
    }

    /// Pre-select the opponent from CLI args.
    pub fn set_initial_opponent(&mut self, opponent: Opponent) {
        self.state.select_opponent(opponent);
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        let event_tx = tx.clone();
        let mode_flag = self.input_mode_flag.clone();
        let event_handler = EventHandler::new(event_tx, Duration::from_millis(120), mode_flag);
        tokio::spawn(async move {
            event_handler.run().await;
        });

        info!(backend = self.backend.name(), "TUI started");
        if let Some(path) = self.initial_image.take() {
            let _ = tx.send(Action::LoadImage(path));
        }

        self.sync_input_mode();

        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            if let Some(action) = rx.recv().await {
                self.handle_action(&action, &tx);

                if self.should_quit {
                    break;
                }
            }
        }

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn sync_input_mode(&self) {
        event::set_input_mode(&self.input_mode_flag, self.current_input_mode());
    }

    /// Raw keys go to the path field only while the upload section is showing.
    fn current_input_mode(&self) -> InputMode {
        if self.help.visible {
            return InputMode::Normal;
        }
        if self.upload.wants_input(&self.state) {
            InputMode::Editing
        } else {
            InputMode::Normal
        }
    }

    /// The header tab that matches the current view.
    fn current_stage(&self) -> Stage {
        match self.state.view {
            ViewState::Idle => Stage::Upload,
            ViewState::Generating | ViewState::PanelsComplete => Stage::Storyboard,
            ViewState::TextGenerating | ViewState::TextComplete => Stage::Commentary,
        }
    }

    /// Apply an action to the state, then dispatch it to the components.
    pub fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        let help_was_visible = self.help.visible;

        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::Reset => {
                self.state.reset();
                info!("Returned to the upload screen");
            }

            // ── Upload ──────────────────────────────────────────
            Action::LoadImage(path) => self.spawn_read_image(path.clone(), tx.clone()),
            Action::ImageLoaded { generation, image } => {
                let name = image.display_name.clone();
                if !self.state.is_current(*generation) {
                    debug!(generation, file = %name, "Dropping photo read from before a reset");
                } else if self.state.view.upload_visible()
                    && self.state.set_image(Some((**image).clone())).is_ok()
                {
                    let _ = tx.send(Action::SetStatus(format!("Loaded {}", name)));
                }
            }
            Action::ImageLoadFailed(reason) => {
                // Nothing is stored; the previous photo (if any) stays.
                if let Err(e) = self.state.set_image(None) {
                    warn!("Photo not loaded: {}", reason);
                    let _ = tx.send(Action::SetStatus(format!("{} ({})", e, reason)));
                }
            }
            Action::SelectOpponent(opponent) => self.state.select_opponent(*opponent),

            // ── Storyboard ──────────────────────────────────────
            Action::GenerateStoryboard => match self.state.begin_generation() {
                Ok(ticket) => self.spawn_storyboard(ticket, tx.clone()),
                Err(e) => {
                    let _ = tx.send(Action::SetStatus(e.to_string()));
                }
            },
            Action::PanelSettled {
                generation,
                index,
                result,
            } => {
                let ok = result.is_generated();
                if self.state.apply_panel(*generation, *index, (**result).clone()) {
                    let total = self.state.slots.len();
                    let msg = if ok {
                        format!("Panel {}/{} ready", index + 1, total)
                    } else {
                        format!("Panel {}/{} failed", index + 1, total)
                    };
                    let _ = tx.send(Action::SetStatus(msg));
                }
            }
            Action::StoryboardComplete { generation } => {
                if self.state.finish_panels(*generation) {
                    let _ = tx.send(Action::SetStatus(
                        "Storyboard complete. Press t for commentary & interview".to_string(),
                    ));
                }
            }
            Action::ExportPanel(index) => self.spawn_export(*index, tx.clone()),
            Action::PanelExported(path) => {
                let _ = tx.send(Action::SetStatus(format!("Saved {}", path.display())));
            }

            // ── Commentary & interview ──────────────────────────
            Action::GenerateText => match self.state.begin_text() {
                Ok(ticket) => self.spawn_text(ticket, tx.clone()),
                Err(e) => {
                    let _ = tx.send(Action::SetStatus(e.to_string()));
                }
            },
            Action::TextSettled {
                generation,
                feature,
                outcome,
            } => {
                self.state.apply_text(*generation, *feature, outcome.clone());
            }
            Action::TextComplete { generation } => {
                if self.state.finish_text(*generation) {
                    let _ = tx.send(Action::SetStatus("Commentary & interview ready".to_string()));
                }
            }
            _ => {}
        }

        let mut chained = Vec::new();
        let broadcast = matches!(
            action,
            Action::Tick
                | Action::Reset
                | Action::ImageLoaded { .. }
                | Action::GenerateStoryboard
                | Action::GenerateText
        );

        if broadcast {
            chained.extend(self.upload.handle_action(action, &self.state));
            chained.extend(self.storyboard.handle_action(action, &self.state));
            chained.extend(self.commentary.handle_action(action, &self.state));
        } else if !help_was_visible {
            // Forward input to the section on screen.
            let result = if self.state.view.upload_visible() {
                self.upload.handle_action(action, &self.state)
            } else if matches!(action, Action::ScrollUp | Action::ScrollDown) {
                self.commentary.handle_action(action, &self.state)
            } else {
                self.storyboard.handle_action(action, &self.state)
            };
            chained.extend(result);
        }

        self.help.handle_action(action, &self.state);
        self.status_bar.handle_action(action, &self.state);

        self.sync_input_mode();

        for next in chained {
            self.handle_action(&next, tx);
        }
    }

    // ── Async task spawners ─────────────────────────────────────

    /// Read the photo off the main loop. The result is tagged with the
    /// current generation so a reset in the meantime discards it.
    fn spawn_read_image(&self, path: PathBuf, tx: mpsc::UnboundedSender<Action>) {
        let generation = self.state.generation();
        tokio::spawn(async move {
            match read_image(&path).await {
                Ok(image) => {
                    let _ = tx.send(Action::ImageLoaded {
                        generation,
                        image: Box::new(image),
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), "Failed to read photo: {}", e);
                    let _ = tx.send(Action::ImageLoadFailed(path.display().to_string()));
                }
            }
        });
    }

    /// Run the six panels in the background, one request at a time. Every
    /// settled panel is reported tagged with the run's generation.
    fn spawn_storyboard(&self, ticket: GenerationTicket, tx: mpsc::UnboundedSender<Action>) {
        let backend = self.backend.clone();
        let _ = tx.send(Action::SetStatus(format!(
            "Generating your final against {}...",
            ticket.opponent
        )));

        tokio::spawn(async move {
            let GenerationTicket {
                generation,
                image,
                templates,
                ..
            } = ticket;

            let progress = tx.clone();
            let results = run_panels(backend.as_ref(), &image, &templates, |index, result| {
                let _ = progress.send(Action::PanelSettled {
                    generation,
                    index,
                    result: Box::new(result.clone()),
                });
            })
            .await;

            let failed = results.iter().filter(|r| !r.is_generated()).count();
            if failed > 0 {
                warn!(generation, failed, "Storyboard finished with failed panels");
            }
            let _ = tx.send(Action::StoryboardComplete { generation });
        });
    }

    fn spawn_text(&self, ticket: TextTicket, tx: mpsc::UnboundedSender<Action>) {
        let backend = self.backend.clone();
        let TextTicket {
            generation,
            opponent,
        } = ticket;

        tokio::spawn(async move {
            let progress = tx.clone();
            run_text_features(backend.as_ref(), opponent, |feature, outcome| {
                let _ = progress.send(Action::TextSettled {
                    generation,
                    feature,
                    outcome: outcome.clone(),
                });
            })
            .await;
            let _ = tx.send(Action::TextComplete { generation });
        });
    }

    fn spawn_export(&self, index: usize, tx: mpsc::UnboundedSender<Action>) {
        let Some(slot) = self.state.slots.get(index).cloned() else {
            return;
        };
        let dir = self.download_dir.clone();

        tokio::spawn(async move {
            match export_panel(&slot, &dir).await {
                Ok(path) => {
                    let _ = tx.send(Action::PanelExported(path));
                }
                Err(e) => {
                    error!(title = %slot.title, "Export failed: {}", e);
                    let _ = tx.send(Action::SetStatus(format!("Save failed: {}", e)));
                }
            }
        });
    }

    /// Render the full UI.
    pub fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(2), // Tab bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.render_tabs(frame, chunks[0]);

        if self.state.view.upload_visible() {
            self.upload.render(frame, chunks[1], &self.state);
        } else if self.state.view.text_section_visible() {
            let sections =
                Layout::vertical([Constraint::Percentage(60), Constraint::Min(6)]).split(chunks[1]);
            self.storyboard.render(frame, sections[0], &self.state);
            self.commentary.render(frame, sections[1], &self.state);
        } else {
            self.storyboard.render(frame, chunks[1], &self.state);
        }

        self.status_bar.render(frame, chunks[2], &self.state);

        // Overlays (rendered on top)
        self.help.render(frame, area, &self.state);
    }

    fn render_tabs(&self, frame: &mut ratatui::Frame, area: Rect) {
        let current = self.current_stage();
        let titles: Vec<Line> = Stage::all()
            .iter()
            .map(|stage| {
                let style = if *stage == current {
                    Theme::tab_active()
                } else if stage.index() < current.index() {
                    Theme::tab_completed()
                } else {
                    Theme::tab_inactive()
                };
                Line::from(Span::styled(stage.label(), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .select(current.index())
            .divider(Span::styled(" | ", Theme::dim()))
            .highlight_style(Theme::tab_active());

        frame.render_widget(tabs, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use slamstory_core::image::{GeneratedImage, UploadedImage};
    use slamstory_core::panel::SlotContent;
    use slamstory_core::state::GENERATE_LABEL;
    use slamstory_core::text::TextContent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockBackend {
        delay: Duration,
        image_calls: AtomicUsize,
        text_calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _reference: &UploadedImage,
        ) -> slamstory_core::Result<GeneratedImage> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(GeneratedImage::new(
                Some("image/png".to_string()),
                "iVBORw0KGgo=".to_string(),
            ))
        }

        async fn generate_text(&self, prompt: &str) -> slamstory_core::Result<String> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} chars of prompt", prompt.len()))
        }
    }

    struct Harness {
        app: App,
        backend: Arc<MockBackend>,
        tx: mpsc::UnboundedSender<Action>,
        rx: mpsc::UnboundedReceiver<Action>,
        _downloads: tempfile::TempDir,
    }

    impl Harness {
        fn new(backend: MockBackend) -> Self {
            let backend = Arc::new(backend);
            let downloads = tempfile::tempdir().unwrap();
            let app = App::new(backend.clone(), downloads.path().to_path_buf());
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                app,
                backend,
                tx,
                rx,
                _downloads: downloads,
            }
        }

        fn send(&mut self, action: Action) {
            self.app.handle_action(&action, &self.tx);
        }

        /// Feed queued actions back into the app until `done` matches one.
        async fn pump_until(&mut self, done: impl Fn(&Action) -> bool) {
            tokio::time::timeout(Duration::from_secs(5), async {
                loop {
                    let action = self.rx.recv().await.expect("channel closed");
                    self.app.handle_action(&action, &self.tx);
                    if done(&action) {
                        break;
                    }
                }
            })
            .await
            .expect("timed out waiting for action");
        }

        fn with_photo(&mut self) {
            self.app
                .state
                .set_image(Some(UploadedImage::from_bytes("me.jpg", "image/jpeg", b"me")))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn full_story_from_file_to_interview() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("me.png");
        std::fs::write(&photo, b"not really a png").unwrap();

        let mut h = Harness::new(MockBackend::default());
        h.send(Action::LoadImage(photo));
        h.pump_until(|a| matches!(a, Action::ImageLoaded { .. })).await;
        assert!(h.app.state.generate_control.enabled);

        h.send(Action::GenerateStoryboard);
        assert_eq!(h.app.state.view, ViewState::Generating);
        h.pump_until(|a| matches!(a, Action::StoryboardComplete { .. })).await;

        assert_eq!(h.app.state.view, ViewState::PanelsComplete);
        assert_eq!(h.app.state.slots.len(), 6);
        assert!(h
            .app
            .state
            .slots
            .iter()
            .all(|s| matches!(s.content, SlotContent::Ready(_))));
        assert_eq!(h.backend.image_calls.load(Ordering::SeqCst), 6);

        h.send(Action::GenerateText);
        h.pump_until(|a| matches!(a, Action::TextComplete { .. })).await;
        assert_eq!(h.app.state.view, ViewState::TextComplete);
        assert!(matches!(h.app.state.commentary.content, TextContent::Ready(_)));
        assert!(matches!(h.app.state.interview.content, TextContent::Ready(_)));
        assert_eq!(h.backend.text_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn photo_read_before_reset_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("me.png");
        std::fs::write(&photo, b"not really a png").unwrap();

        let mut h = Harness::new(MockBackend::default());
        h.send(Action::LoadImage(photo));
        h.send(Action::Reset);
        h.pump_until(|a| matches!(a, Action::ImageLoaded { .. })).await;

        assert!(h.app.state.image.is_none());
        assert!(!h.app.state.generate_control.enabled);
        assert!(h.app.upload.wants_input(&h.app.state));
    }

    #[tokio::test]
    async fn missing_file_leaves_state_alone() {
        let mut h = Harness::new(MockBackend::default());
        h.send(Action::LoadImage(PathBuf::from("/no/such/photo.jpg")));
        h.pump_until(|a| matches!(a, Action::ImageLoadFailed(_))).await;

        assert!(h.app.state.image.is_none());
        assert!(!h.app.state.generate_control.enabled);
    }

    #[tokio::test]
    async fn generate_without_photo_only_raises_the_banner() {
        let mut h = Harness::new(MockBackend::default());
        h.send(Action::GenerateStoryboard);

        assert_eq!(h.app.state.view, ViewState::Idle);
        assert!(h.app.state.error_banner.is_some());
        assert!(h.app.state.slots.is_empty());
        tokio::task::yield_now().await;
        assert_eq!(h.backend.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_mid_run_discards_late_panels() {
        let mut h = Harness::new(MockBackend {
            delay: Duration::from_millis(5),
            ..Default::default()
        });
        h.with_photo();
        h.send(Action::GenerateStoryboard);
        h.send(Action::Reset);
        assert_eq!(h.app.state.view, ViewState::Idle);

        h.pump_until(|a| matches!(a, Action::StoryboardComplete { .. })).await;

        assert_eq!(h.app.state.view, ViewState::Idle);
        assert!(h.app.state.slots.is_empty());
        assert!(h.app.state.image.is_none());
        assert_eq!(h.app.state.generate_control.label, GENERATE_LABEL);
    }

    #[tokio::test]
    async fn exporting_a_ready_panel_writes_it_to_disk() {
        let mut h = Harness::new(MockBackend::default());
        h.with_photo();
        h.send(Action::GenerateStoryboard);
        h.pump_until(|a| matches!(a, Action::StoryboardComplete { .. })).await;

        h.send(Action::ExportSelected);
        h.pump_until(|a| matches!(a, Action::PanelExported(_))).await;

        let expected = h
            .app
            .download_dir
            .join(h.app.state.slots[0].download_file_name());
        assert_eq!(std::fs::read(expected).unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn path_field_captures_keys_only_on_the_upload_screen() {
        let mut h = Harness::new(MockBackend::default());
        assert_eq!(h.app.current_input_mode(), InputMode::Editing);

        h.with_photo();
        h.send(Action::GenerateStoryboard);
        assert_eq!(h.app.current_input_mode(), InputMode::Normal);
    }

    #[test]
    fn upload_screen_renders_the_generate_control() {
        let backend: Arc<dyn GenerativeBackend> = Arc::new(MockBackend::default());
        let app = App::new(backend, PathBuf::from("."));

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains(GENERATE_LABEL));
        assert!(screen.contains("Carlos Alcaraz"));
    }
}
