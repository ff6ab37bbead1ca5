//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};
use tasktimer_proto::Category;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Running/online indicator color.
pub const SUCCESS: Color = Color::Green;

/// Offline record indicator color.
pub const WARNING: Color = Color::Yellow;

/// Offline connection indicator color.
pub const ERROR: Color = Color::Red;

/// Accent for the creation category.
pub const CRIACAO: Color = Color::Magenta;

/// Accent for the adjustments category.
pub const AJUSTES: Color = Color::Blue;

/// Panel title color for the input box.
pub const INPUT_TITLE: Color = Color::Cyan;

/// Panel title color for the task list.
pub const TASKS_TITLE: Color = Color::Green;

/// Panel title color for the totals box.
pub const TOTALS_TITLE: Color = Color::Yellow;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (hints, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Accent color of a category.
#[must_use]
pub const fn category_color(category: Category) -> Color {
    match category {
        Category::Criacao => CRIACAO,
        Category::Ajustes => AJUSTES,
    }
}

/// Style for the input cursor (bright white, bold).
#[must_use]
pub fn input_cursor() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
