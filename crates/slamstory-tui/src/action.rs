//! Action enum: the central message bus for the TUI.
//! All user interactions and async results flow through here.

use std::path::PathBuf;

use slamstory_core::image::UploadedImage;
use slamstory_core::panel::PanelResult;
use slamstory_core::text::{TextFeature, TextOutcome};
use slamstory_core::Opponent;

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// Clear the status message.
    ClearStatus,
    /// A tick event for animations and polling.
    Tick,
    /// Return every section to its initial state.
    Reset,

    // ── Upload ──────────────────────────────────────────────
    /// Read the file at this path as the reference photo.
    LoadImage(PathBuf),
    /// The photo was read and encoded. Dropped if `generation` is stale.
    ImageLoaded {
        generation: u64,
        image: Box<UploadedImage>,
    },
    /// The photo could not be read; nothing was stored.
    ImageLoadFailed(String),
    /// The opponent selector changed.
    SelectOpponent(Opponent),
    /// Focus the path field again (normal mode `e`).
    EditPath,
    /// Leave the path field (Esc in input mode).
    LeaveInput,

    // ── Storyboard ──────────────────────────────────────────
    /// Start the six-panel run.
    GenerateStoryboard,
    /// One panel request settled.
    PanelSettled {
        generation: u64,
        index: usize,
        result: Box<PanelResult>,
    },
    /// Every panel of the run has settled.
    StoryboardComplete { generation: u64 },
    /// Save the highlighted panel (resolved by the storyboard component).
    ExportSelected,
    /// Save the panel at this index.
    ExportPanel(usize),
    /// A panel was written to disk.
    PanelExported(PathBuf),

    // ── Commentary & interview ──────────────────────────────
    /// Start (or restart) both text requests.
    GenerateText,
    /// One text request settled.
    TextSettled {
        generation: u64,
        feature: TextFeature,
        outcome: TextOutcome,
    },
    /// Both text requests have settled.
    TextComplete { generation: u64 },

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed (only sent when in input mode).
    CharInput(char),
    /// Backspace pressed (only sent when in input mode).
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    /// Tab in input mode: accept a path suggestion.
    SwitchInputField,
    /// Enter in input mode.
    NewlineInput,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),

    // ── Scrolling / Selection ───────────────────────────────
    ScrollUp,
    ScrollDown,
    SelectNext,
    SelectPrev,
    Confirm,
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the active component instead of interpreted as
/// global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are global shortcuts.
    Normal,
    /// Keys go to the focused text field.
    Editing,
}

/// The three screens shown in the header, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Upload,
    Storyboard,
    Commentary,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[Stage::Upload, Stage::Storyboard, Stage::Commentary]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Upload => "1.Upload",
            Stage::Storyboard => "2.Storyboard",
            Stage::Commentary => "3.Commentary",
        }
    }

    /// Numeric index (0-based).
    pub fn index(&self) -> usize {
        match self {
            Stage::Upload => 0,
            Stage::Storyboard => 1,
            Stage::Commentary => 2,
        }
    }
}
