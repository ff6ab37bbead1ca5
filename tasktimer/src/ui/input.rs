//! New-task input line with the category selector.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tasktimer_proto::Category;

use super::theme;
use crate::app::{App, InputMode};

/// Render the input box.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_editing = app.input_mode == InputMode::Editing;

    let mut spans: Vec<Span> = Category::ALL
        .iter()
        .map(|c| {
            let style = if *c == app.category {
                theme::selected()
            } else {
                theme::dimmed()
            };
            Span::styled(format!(" {} ", c.label()), style)
        })
        .collect();
    spans.push(Span::raw("  "));

    if app.input.is_empty() && !is_editing {
        spans.push(Span::styled("a: nova tarefa", theme::dimmed()));
    } else {
        spans.push(Span::styled(app.input.as_str(), theme::normal()));
        if is_editing {
            spans.push(Span::styled("█", theme::input_cursor()));
        }
    }

    let block = Block::default()
        .title(Span::styled("Nova tarefa", theme::panel_title(theme::INPUT_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_editing {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
