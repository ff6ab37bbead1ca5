//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.input_mode {
        InputMode::Editing => "Enter: criar | Tab: categoria | Esc: cancelar",
        InputMode::Normal => {
            "a: nova | Espaço: iniciar/parar | d: remover | r: recarregar | e: CSV | p: PDF | q: sair"
        }
    };

    let (dot_color, connection) = if app.is_online {
        (theme::SUCCESS, "Online")
    } else {
        (theme::ERROR, "Offline")
    };

    let mut spans = vec![
        Span::styled("tasktimer", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {connection}")),
        Span::raw(" | "),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.as_str(), theme::normal()));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
