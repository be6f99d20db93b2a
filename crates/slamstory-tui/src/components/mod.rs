//! Component trait and all TUI components.
//!
//! Components keep only their own view state (cursor, selection, scroll).
//! Everything generated lives in [`StoryState`], which the App owns and
//! lends to each component for input handling and rendering.

pub mod commentary;
pub mod help;
pub mod status_bar;
pub mod storyboard;
pub mod upload;

use ratatui::layout::Rect;
use ratatui::Frame;

use slamstory_core::StoryState;

use crate::action::Action;

/// Trait implemented by all TUI components.
pub trait Component {
    /// Handle an action and optionally return a new action to dispatch.
    fn handle_action(&mut self, action: &Action, state: &StoryState) -> Option<Action> {
        let _ = (action, state);
        None
    }

    /// Render the component into the given area.
    fn render(&self, frame: &mut Frame, area: Rect, state: &StoryState);
}

/// Shorten `s` to at most `max_len` characters, ending in "..." when cut.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        String::new()
    }
}
