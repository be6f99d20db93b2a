//! The six-panel storyboard grid.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use slamstory_core::panel::{PanelSlot, SlotContent, PANEL_FAILED_MESSAGE};
use slamstory_core::StoryState;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

const COLUMNS: usize = 3;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub struct StoryboardComponent {
    /// Highlighted slot.
    pub selected: usize,
    frame: usize,
}

impl StoryboardComponent {
    pub fn new() -> Self {
        Self {
            selected: 0,
            frame: 0,
        }
    }

    fn export_selected(&self, state: &StoryState) -> Option<Action> {
        let slot = state.slots.get(self.selected)?;
        match slot.content {
            SlotContent::Ready(_) => Some(Action::ExportPanel(self.selected)),
            SlotContent::Loading => Some(Action::SetStatus(format!(
                "\"{}\" is still generating",
                slot.title
            ))),
            SlotContent::Failed => Some(Action::SetStatus(format!(
                "\"{}\" has no image to save",
                slot.title
            ))),
        }
    }

    fn render_slot(&self, frame: &mut Frame, area: Rect, slot: &PanelSlot, selected: bool) {
        let border_style = if selected {
            Style::default().fg(Theme::accent())
        } else {
            Theme::border()
        };
        let block = Block::default()
            .title(format!(" {} ", slot.title))
            .title_style(if selected { Theme::selected() } else { Theme::header() })
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut lines = match &slot.content {
            SlotContent::Loading => vec![Line::from(Span::styled(
                format!("{} Generating panel...", SPINNER[self.frame % SPINNER.len()]),
                Style::default().fg(Theme::warning()),
            ))],
            SlotContent::Ready(image) => vec![
                Line::from(Span::styled(
                    format!("✓ {} · {} KB", image.mime_type, image.approx_len().div_ceil(1024)),
                    Style::default().fg(Theme::success()),
                )),
                Line::from(Span::styled(
                    format!("⤓ {}", slot.download_file_name()),
                    Theme::dim(),
                )),
            ],
            SlotContent::Failed => vec![Line::from(Span::styled(
                PANEL_FAILED_MESSAGE,
                Style::default().fg(Theme::error()),
            ))],
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(slot.caption.as_str(), Theme::muted())));

        let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(body, area);
    }
}

impl Default for StoryboardComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StoryboardComponent {
    fn handle_action(&mut self, action: &Action, state: &StoryState) -> Option<Action> {
        let count = state.slots.len();
        match action {
            Action::Tick => {
                self.frame = self.frame.wrapping_add(1);
                None
            }
            Action::SelectNext => {
                if count > 0 {
                    self.selected = (self.selected + 1) % count;
                }
                None
            }
            Action::SelectPrev => {
                if count > 0 {
                    self.selected = (self.selected + count - 1) % count;
                }
                None
            }
            Action::ExportSelected | Action::Confirm => self.export_selected(state),
            Action::Reset | Action::GenerateStoryboard => {
                self.selected = 0;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &StoryState) {
        let settled = state
            .slots
            .iter()
            .filter(|s| s.content != SlotContent::Loading)
            .count();

        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(6)]).split(area);

        let header = Line::from(vec![
            Span::styled(
                format!(" Your SlamStory vs. {} ", state.opponent),
                Theme::title(),
            ),
            Span::styled(
                format!(" {}/{} panels ", settled, state.slots.len()),
                Theme::muted(),
            ),
            Span::styled(
                format!(" {} ", state.generate_control.label),
                Theme::control(state.generate_control.enabled),
            ),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let rows = state.slots.len().div_ceil(COLUMNS).max(1);
        let row_areas =
            Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(chunks[1]);

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::horizontal(vec![Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
                .split(*row_area);
            for (col, cell) in cells.iter().enumerate() {
                let index = row * COLUMNS + col;
                if let Some(slot) = state.slots.get(index) {
                    self.render_slot(frame, *cell, slot, index == self.selected);
                }
            }
        }
    }
}
