//! Color scheme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// The color palette for slamstory's TUI: night-session hard court blues
/// with a trophy-gold accent.
pub struct Theme;

impl Theme {
    // ── Base colors ─────────────────────────────────────────
    pub fn bg() -> Color {
        Color::Reset
    }

    pub fn fg() -> Color {
        Color::Rgb(200, 200, 200)
    }

    pub fn fg_dim() -> Color {
        Color::Rgb(100, 100, 100)
    }

    pub fn fg_muted() -> Color {
        Color::Rgb(140, 140, 140)
    }

    // ── Accent colors ───────────────────────────────────────
    pub fn accent() -> Color {
        Color::Rgb(90, 150, 255)
    }

    pub fn accent_secondary() -> Color {
        Color::Rgb(235, 195, 80)
    }

    pub fn success() -> Color {
        Color::Rgb(80, 200, 120)
    }

    pub fn warning() -> Color {
        Color::Rgb(230, 180, 80)
    }

    pub fn error() -> Color {
        Color::Rgb(240, 80, 80)
    }

    // ── Structural colors ───────────────────────────────────
    pub fn border_color() -> Color {
        Color::Rgb(60, 60, 60)
    }

    // ── Composite styles ────────────────────────────────────

    pub fn title() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::fg()).add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::fg())
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::fg_dim())
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::fg_muted())
    }

    pub fn border() -> Style {
        Style::default().fg(Self::border_color())
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Self::accent())
    }

    pub fn banner() -> Style {
        Style::default()
            .fg(Self::error())
            .add_modifier(Modifier::BOLD)
    }

    /// A button-like control, greyed out when disabled.
    pub fn control(enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(Self::bg())
                .bg(Self::accent_secondary())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Self::fg_dim()).add_modifier(Modifier::DIM)
        }
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Self::fg_dim())
    }

    pub fn tab_completed() -> Style {
        Style::default()
            .fg(Self::success())
            .add_modifier(Modifier::DIM)
    }
}
