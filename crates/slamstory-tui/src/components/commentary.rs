//! Match commentary and post-match interview containers.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use slamstory_core::text::{TextContent, TextFeature, TextPanel};
use slamstory_core::StoryState;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct CommentaryComponent {
    /// Scroll offset shared by both containers.
    pub scroll: u16,
}

impl CommentaryComponent {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }

    fn render_container(&self, frame: &mut Frame, area: Rect, feature: TextFeature, panel: &TextPanel) {
        let block = Block::default()
            .title(format!(" {} ", feature.heading()))
            .title_style(Theme::header())
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let body = match &panel.content {
            TextContent::Empty => Paragraph::new(""),
            TextContent::Loading => Paragraph::new(Span::styled(
                "Generating...",
                Style::default().fg(Theme::warning()),
            )),
            TextContent::Ready(text) => Paragraph::new(
                text.lines()
                    .map(|l| Line::from(Span::styled(l, Theme::normal())))
                    .collect::<Vec<_>>(),
            )
            .scroll((self.scroll, 0)),
            TextContent::Failed(message) => Paragraph::new(Span::styled(
                *message,
                Style::default().fg(Theme::error()),
            )),
        };

        frame.render_widget(body.wrap(Wrap { trim: false }).block(block), area);
    }
}

impl Default for CommentaryComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CommentaryComponent {
    fn handle_action(&mut self, action: &Action, _state: &StoryState) -> Option<Action> {
        match action {
            Action::ScrollDown => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            Action::Reset | Action::GenerateText => {
                self.scroll = 0;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &StoryState) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);

        let control = &state.text_control;
        let header = Line::from(vec![
            Span::styled(format!(" {} ", control.label), Theme::control(control.enabled)),
            Span::styled("  t", Theme::key_hint()),
            Span::styled(" generate  ", Theme::dim()),
            Span::styled("↑↓", Theme::key_hint()),
            Span::styled(" scroll", Theme::dim()),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let shown: Vec<(TextFeature, &TextPanel)> = TextFeature::all()
            .iter()
            .map(|&feature| (feature, state.text_container(feature)))
            .filter(|(_, panel)| panel.visible)
            .collect();
        if shown.is_empty() {
            return;
        }

        let areas = Layout::horizontal(vec![Constraint::Ratio(1, shown.len() as u32); shown.len()])
            .split(chunks[1]);
        for ((feature, panel), area) in shown.into_iter().zip(areas.iter()) {
            self.render_container(frame, *area, feature, panel);
        }
    }
}
