//! Upload section: photo path, opponent selector and the generate control.
//!
//! Features:
//! - Path field: single-line with filesystem autocomplete, limited to
//!   directories and files that look like images
//! - Tab accepts a suggestion, Enter loads the photo
//! - Up/Down walk the suggestions, or the opponent list when there are none
//! - Ctrl+G (or `g` outside the field) starts the storyboard

use std::path::{Path, PathBuf};

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use slamstory_core::image::is_image_path;
use slamstory_core::{Opponent, StoryState};

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

/// Maximum number of path suggestions to display.
const MAX_SUGGESTIONS: usize = 8;

pub struct UploadComponent {
    /// Current photo path input.
    pub path_input: String,
    /// Cursor position (byte offset) within the path.
    pub cursor: usize,
    /// Whether the path field has focus.
    editing: bool,

    // ── Path suggestions ────────────────────────────────────
    suggestions: Vec<PathSuggestion>,
    suggestion_index: Option<usize>,
    /// The path input value that was last used to compute suggestions.
    suggestions_for: String,
}

#[derive(Debug, Clone)]
struct PathSuggestion {
    full_path: String,
    name: String,
    is_dir: bool,
}

impl UploadComponent {
    pub fn new() -> Self {
        Self::with_path("~/")
    }

    pub fn with_path(path: &str) -> Self {
        let mut this = Self {
            path_input: path.to_string(),
            cursor: path.len(),
            editing: true,
            suggestions: Vec::new(),
            suggestion_index: None,
            suggestions_for: String::new(),
        };
        this.refresh_suggestions();
        this
    }

    /// Whether this component wants raw key input.
    pub fn wants_input(&self, state: &StoryState) -> bool {
        self.editing && state.view.upload_visible()
    }

    fn clamp_cursor(&mut self) {
        if self.cursor > self.path_input.len() {
            self.cursor = self.path_input.len();
        }
    }

    fn insert_str(&mut self, s: &str) {
        self.clamp_cursor();
        self.path_input.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    fn delete_char(&mut self) {
        self.clamp_cursor();
        if let Some((prev, _)) = self.path_input[..self.cursor].char_indices().next_back() {
            self.path_input.remove(prev);
            self.cursor = prev;
        }
    }

    /// Delete back to the previous path separator (Ctrl+W).
    fn delete_segment(&mut self) {
        self.clamp_cursor();
        let before = &self.path_input[..self.cursor];
        let trimmed = before.trim_end_matches('/');
        let start = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);
        self.path_input.drain(start..self.cursor);
        self.cursor = start;
    }

    fn has_suggestions(&self) -> bool {
        self.editing && !self.suggestions.is_empty()
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_index = None;
    }

    // ── Path suggestion logic ───────────────────────────────

    fn refresh_suggestions(&mut self) {
        if self.path_input == self.suggestions_for {
            return;
        }
        self.suggestions_for = self.path_input.clone();
        self.clear_suggestions();

        if self.path_input.is_empty() {
            return;
        }

        let expanded = expand_home(&self.path_input);
        let path = Path::new(&expanded);

        let (search_dir, prefix): (PathBuf, String) = if expanded.ends_with('/') {
            (path.to_path_buf(), String::new())
        } else {
            let parent = path.parent().unwrap_or(Path::new("/"));
            let file_prefix = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default();
            (parent.to_path_buf(), file_prefix)
        };

        let entries = match std::fs::read_dir(&search_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        let prefix_lower = prefix.to_lowercase();

        let mut results: Vec<PathSuggestion> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') && !prefix.starts_with('.') {
                    return None;
                }
                if !prefix.is_empty() && !name.to_lowercase().starts_with(&prefix_lower) {
                    return None;
                }

                let full_path = entry.path();
                let is_dir = full_path.is_dir();
                if !is_dir && !is_image_path(&full_path) {
                    return None;
                }

                Some(PathSuggestion {
                    full_path: full_path.to_string_lossy().to_string(),
                    name,
                    is_dir,
                })
            })
            .collect();

        // Photos first, then directories, each alphabetical.
        results.sort_by(|a, b| {
            a.is_dir
                .cmp(&b.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        results.truncate(MAX_SUGGESTIONS);

        self.suggestions = results;
    }

    fn accept_suggestion(&mut self) {
        let idx = self.suggestion_index.unwrap_or(0);
        if let Some(suggestion) = self.suggestions.get(idx) {
            let mut new_path = suggestion.full_path.clone();
            if suggestion.is_dir && !new_path.ends_with('/') {
                new_path.push('/');
            }
            self.path_input = new_path;
            self.cursor = self.path_input.len();
            self.suggestions_for.clear();
            self.clear_suggestions();
            self.refresh_suggestions();
        }
    }

    /// Enter in the path field: take a highlighted suggestion, or load the photo.
    fn submit_path(&mut self) -> Option<Action> {
        if self.has_suggestions() && self.suggestion_index.is_some() {
            self.accept_suggestion();
            return None;
        }
        self.clear_suggestions();

        let trimmed = self.path_input.trim();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return Some(Action::SetStatus("Enter the path of a photo first".to_string()));
        }
        Some(Action::LoadImage(PathBuf::from(expand_home(trimmed))))
    }

    fn render_path_field(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Theme::accent())
        } else {
            Theme::border()
        };
        let block = Block::default()
            .title(" Step 1: Photo ")
            .title_style(if focused { Theme::key_hint() } else { Theme::muted() })
            .borders(Borders::ALL)
            .border_style(border_style);

        let text = self.path_input.as_str();
        let display = if !focused {
            if text.is_empty() {
                Paragraph::new(Span::styled("/path/to/photo.jpg", Theme::dim()))
            } else {
                Paragraph::new(Span::styled(text, Theme::normal()))
            }
        } else {
            let pos = self.cursor.min(text.len());
            let (before, after) = text.split_at(pos);
            let mut chars = after.chars();
            let cursor_char = chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
            Paragraph::new(Line::from(vec![
                Span::styled(before, Theme::normal()),
                Span::styled(
                    cursor_char,
                    Style::default().fg(Theme::bg()).bg(Theme::accent()),
                ),
                Span::styled(chars.as_str(), Theme::normal()),
            ]))
        };

        frame.render_widget(display.block(block), area);
    }

    fn render_suggestions(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(Theme::border());

        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let style = if self.suggestion_index == Some(i) {
                    Style::default()
                        .fg(Theme::bg())
                        .bg(Theme::accent())
                        .add_modifier(Modifier::BOLD)
                } else if s.is_dir {
                    Style::default().fg(Theme::accent())
                } else {
                    Theme::normal()
                };
                let icon = if s.is_dir { "/" } else { " " };
                ListItem::new(Line::from(Span::styled(format!(" {}{} ", s.name, icon), style)))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_opponents(&self, frame: &mut Frame, area: Rect, selected: Opponent) {
        let block = Block::default()
            .title(" Opponent ")
            .title_style(Theme::muted())
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let items: Vec<ListItem> = Opponent::all()
            .iter()
            .map(|opponent| {
                if *opponent == selected {
                    ListItem::new(Line::from(Span::styled(
                        format!("▸ {}", opponent.name()),
                        Theme::selected(),
                    )))
                } else {
                    ListItem::new(Line::from(Span::styled(
                        format!("  {}", opponent.name()),
                        Theme::normal(),
                    )))
                }
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

impl Default for UploadComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for UploadComponent {
    fn handle_action(&mut self, action: &Action, state: &StoryState) -> Option<Action> {
        match action {
            // ── Text input ──────────────────────────────────────
            Action::CharInput(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                self.refresh_suggestions();
                None
            }
            Action::BackspaceInput => {
                self.delete_char();
                self.refresh_suggestions();
                None
            }
            Action::DeleteWord => {
                self.delete_segment();
                self.refresh_suggestions();
                None
            }
            Action::PasteBulk(text) => {
                if self.editing {
                    let first = text.lines().next().unwrap_or("").trim();
                    self.insert_str(first);
                    self.refresh_suggestions();
                }
                None
            }
            Action::SwitchInputField => {
                self.accept_suggestion();
                None
            }
            Action::NewlineInput => self.submit_path(),

            // ── Focus ───────────────────────────────────────────
            Action::EditPath => {
                self.editing = true;
                self.suggestions_for.clear();
                self.refresh_suggestions();
                None
            }
            Action::LeaveInput => {
                self.editing = false;
                self.clear_suggestions();
                None
            }
            Action::ImageLoaded { generation, .. } if state.is_current(*generation) => {
                self.editing = false;
                self.clear_suggestions();
                None
            }

            // ── Suggestions or opponent ─────────────────────────
            Action::ScrollDown | Action::SelectNext => {
                if self.has_suggestions() {
                    let max = self.suggestions.len();
                    self.suggestion_index = Some(match self.suggestion_index {
                        None => 0,
                        Some(i) => (i + 1).min(max - 1),
                    });
                    None
                } else {
                    Some(Action::SelectOpponent(state.opponent.next()))
                }
            }
            Action::ScrollUp | Action::SelectPrev => {
                if self.has_suggestions() {
                    self.suggestion_index = match self.suggestion_index {
                        None | Some(0) => None,
                        Some(i) => Some(i - 1),
                    };
                    None
                } else {
                    Some(Action::SelectOpponent(state.opponent.prev()))
                }
            }

            Action::Confirm => Some(Action::GenerateStoryboard),

            Action::Reset => {
                *self = Self::new();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &StoryState) {
        let suggestion_height = if self.has_suggestions() {
            self.suggestions.len() as u16 + 1
        } else {
            0
        };
        let opponent_height = Opponent::all().len() as u16 + 2;
        let banner_height = if state.error_banner.is_some() { 2 } else { 0 };

        let chunks = Layout::vertical([
            Constraint::Length(3),                 // Path input
            Constraint::Length(suggestion_height), // Suggestions dropdown
            Constraint::Length(4),                 // Preview
            Constraint::Length(opponent_height),   // Opponent selector
            Constraint::Length(3),                 // Generate control
            Constraint::Length(banner_height),     // Error banner
            Constraint::Min(1),                    // Instructions
        ])
        .split(area);

        let focused = self.wants_input(state);
        self.render_path_field(frame, chunks[0], focused);
        if self.has_suggestions() {
            self.render_suggestions(frame, chunks[1]);
        }

        // ── Preview ─────────────────────────────────────────────
        let preview_style = if state.image.is_some() {
            Style::default().fg(Theme::success())
        } else {
            Theme::dim()
        };
        let preview = Paragraph::new(vec![
            Line::from(Span::styled(state.preview.label(), preview_style)),
            Line::from(Span::styled(state.upload_label.as_str(), Theme::muted())),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Preview ")
                .title_style(Theme::muted())
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );
        frame.render_widget(preview, chunks[2]);

        self.render_opponents(frame, chunks[3], state.opponent);

        // ── Generate control ────────────────────────────────────
        let control = &state.generate_control;
        let button = Paragraph::new(Line::from(Span::styled(
            format!("  {}  ", control.label),
            Theme::control(control.enabled),
        )))
        .block(Block::default().borders(Borders::ALL).border_style(Theme::border()));
        frame.render_widget(button, chunks[4]);

        if let Some(ref banner) = state.error_banner {
            let banner = Paragraph::new(Span::styled(format!(" {}", banner), Theme::banner()))
                .wrap(Wrap { trim: true });
            frame.render_widget(banner, chunks[5]);
        }

        // ── Instructions ────────────────────────────────────────
        let hints = if self.has_suggestions() {
            vec![
                Span::styled("  tab", Theme::key_hint()),
                Span::styled(" accept  ", Theme::dim()),
                Span::styled("↑↓", Theme::key_hint()),
                Span::styled(" navigate  ", Theme::dim()),
                Span::styled("enter", Theme::key_hint()),
                Span::styled(" load", Theme::dim()),
            ]
        } else if focused {
            vec![
                Span::styled("  enter", Theme::key_hint()),
                Span::styled(" load photo  ", Theme::dim()),
                Span::styled("↑↓", Theme::key_hint()),
                Span::styled(" opponent  ", Theme::dim()),
                Span::styled("ctrl+g", Theme::key_hint()),
                Span::styled(" generate  ", Theme::dim()),
                Span::styled("esc", Theme::key_hint()),
                Span::styled(" leave field", Theme::dim()),
            ]
        } else {
            vec![
                Span::styled("  g", Theme::key_hint()),
                Span::styled(" generate  ", Theme::dim()),
                Span::styled("↑↓", Theme::key_hint()),
                Span::styled(" opponent  ", Theme::dim()),
                Span::styled("e", Theme::key_hint()),
                Span::styled(" edit path", Theme::dim()),
            ]
        };
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[6]);
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(input: &str) -> String {
    match input.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.to_string_lossy().to_string() + rest,
            None => input.to_string(),
        },
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(component: &mut UploadComponent, text: &str, state: &StoryState) {
        for c in text.chars() {
            component.handle_action(&Action::CharInput(c), state);
        }
    }

    #[test]
    fn enter_loads_the_typed_path() {
        let state = StoryState::new();
        let mut upload = UploadComponent::with_path("");
        typed(&mut upload, "/tmp/me.jpg", &state);

        match upload.handle_action(&Action::NewlineInput, &state) {
            Some(Action::LoadImage(path)) => assert_eq!(path, PathBuf::from("/tmp/me.jpg")),
            other => panic!("expected LoadImage, got {:?}", other),
        }
    }

    #[test]
    fn enter_on_a_directory_asks_for_a_photo() {
        let state = StoryState::new();
        let mut upload = UploadComponent::with_path("");
        typed(&mut upload, "/definitely/not/here/", &state);
        assert!(matches!(
            upload.handle_action(&Action::NewlineInput, &state),
            Some(Action::SetStatus(_))
        ));
    }

    #[test]
    fn arrows_move_the_opponent_without_suggestions() {
        let state = StoryState::new();
        let mut upload = UploadComponent::with_path("");

        assert!(matches!(
            upload.handle_action(&Action::ScrollDown, &state),
            Some(Action::SelectOpponent(o)) if o == state.opponent.next()
        ));
        assert!(matches!(
            upload.handle_action(&Action::ScrollUp, &state),
            Some(Action::SelectOpponent(o)) if o == state.opponent.prev()
        ));
    }

    #[test]
    fn suggestions_only_list_photos_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("serve.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("shoots")).unwrap();

        let root = format!("{}/", dir.path().display());
        let upload = UploadComponent::with_path(&root);

        let names: Vec<&str> = upload.suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["serve.jpg", "shoots"]);
    }

    #[test]
    fn tab_accepts_the_first_suggestion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forehand.png"), b"x").unwrap();

        let state = StoryState::new();
        let mut upload = UploadComponent::with_path(&format!("{}/fore", dir.path().display()));
        upload.handle_action(&Action::SwitchInputField, &state);

        assert_eq!(
            upload.path_input,
            dir.path().join("forehand.png").to_string_lossy()
        );
        assert_eq!(upload.cursor, upload.path_input.len());
    }

    #[test]
    fn ctrl_w_removes_one_path_segment() {
        let state = StoryState::new();
        let mut upload = UploadComponent::with_path("/photos/court/final.jpg");
        upload.handle_action(&Action::DeleteWord, &state);
        assert_eq!(upload.path_input, "/photos/court/");
        upload.handle_action(&Action::DeleteWord, &state);
        assert_eq!(upload.path_input, "/photos/");
    }

    #[test]
    fn leaving_the_field_stops_capturing_keys() {
        let state = StoryState::new();
        let mut upload = UploadComponent::with_path("");
        assert!(upload.wants_input(&state));
        upload.handle_action(&Action::LeaveInput, &state);
        assert!(!upload.wants_input(&state));
        upload.handle_action(&Action::EditPath, &state);
        assert!(upload.wants_input(&state));
    }
}
