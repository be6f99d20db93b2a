//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use slamstory_core::StoryState;

use crate::action::Action;
use crate::components::{truncate, Component};
use crate::theme::Theme;

const WELCOME: &str = "Pick a photo and an opponent, then generate your SlamStory.";

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
}

impl StatusBarComponent {
    pub fn new() -> Self {
        Self {
            message: WELCOME.to_string(),
        }
    }
}

impl Default for StatusBarComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action, _state: &StoryState) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => {
                self.message = msg.clone();
                None
            }
            Action::ClearStatus => {
                self.message.clear();
                None
            }
            Action::Reset => {
                self.message = WELCOME.to_string();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &StoryState) {
        let width = area.width as usize;

        // Right side: compact key hints
        let hints = "q·?·g·t·r·d";
        let hints_len = hints.chars().count() + 1;

        let badge = state.view.label();
        let badge_len = badge.len() + 2;

        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(hints_len)
            .saturating_sub(4);
        let msg = truncate(&self.message, msg_budget);

        // Pad to push hints to the right edge
        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        let line = Line::from(vec![
            Span::styled(format!(" {} ", badge), Theme::muted()),
            Span::styled("  ", Theme::dim()),
            Span::styled(msg, Theme::dim()),
            Span::raw(" ".repeat(pad)),
            Span::styled(hints, Theme::key_hint()),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
