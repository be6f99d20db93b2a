//! Help overlay with the keybinding reference.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use slamstory_core::StoryState;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct HelpComponent {
    pub visible: bool,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self { visible: false }
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(area);

        let horizontal = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(vertical[1]);

        horizontal[1]
    }
}

impl Default for HelpComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action, _state: &StoryState) -> Option<Action> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
                None
            }
            Action::Tick
            | Action::SetStatus(_)
            | Action::PanelSettled { .. }
            | Action::StoryboardComplete { .. }
            | Action::TextSettled { .. }
            | Action::TextComplete { .. } => None,
            _ if self.visible => {
                // Any key closes help.
                self.visible = false;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _state: &StoryState) {
        if !self.visible {
            return;
        }

        let dialog = Self::centered_rect(area, 58, 21);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Keybindings ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::accent()));

        let help_text = vec![
            Line::from(""),
            key_line("q / Ctrl+C", "Quit"),
            key_line("?", "Toggle this help"),
            key_line("r", "Reset and start over"),
            Line::from(""),
            Line::from(Span::styled("── Upload ──", Theme::header())),
            key_line("type / Tab", "Photo path / accept suggestion"),
            key_line("Enter", "Load photo"),
            key_line("Up / Down", "Choose opponent"),
            key_line("Ctrl+G / g", "Generate storyboard"),
            key_line("Esc / e", "Leave / edit path field"),
            Line::from(""),
            Line::from(Span::styled("── Storyboard ──", Theme::header())),
            key_line("Left / Right", "Select panel"),
            key_line("d / Enter", "Save selected panel"),
            key_line("t", "Generate commentary & interview"),
            key_line("Up / Down", "Scroll commentary"),
        ];

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", key), Theme::selected()),
        Span::styled(desc, Theme::normal()),
    ])
}
