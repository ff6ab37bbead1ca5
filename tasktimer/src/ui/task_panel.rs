//! Task list and totals rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tasktimer_proto::Category;

use super::theme;
use crate::app::App;
use crate::export::format_duration;
use crate::tasks::SyncState;

/// Render the task list.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .board
        .tasks()
        .iter()
        .map(|record| {
            let task = &record.task;
            let running = app.board.is_running(&task.id);
            let (marker, marker_style) = if running {
                ("▶", theme::normal().fg(theme::SUCCESS))
            } else {
                ("■", theme::dimmed())
            };

            let mut spans = vec![
                Span::styled(marker, marker_style),
                Span::raw(" "),
                Span::styled(
                    format_duration(task.elapsed()),
                    if running {
                        theme::bold()
                    } else {
                        theme::normal()
                    },
                ),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", task.category.label()),
                    theme::normal().fg(theme::category_color(task.category)),
                ),
                Span::raw(" "),
                Span::styled(task.name.as_str(), theme::normal()),
            ];
            match record.sync {
                SyncState::Synced => {}
                SyncState::Pending => spans.push(Span::styled(" (salvando…)", theme::dimmed())),
                SyncState::Offline => {
                    spans.push(Span::styled(" (offline)", theme::normal().fg(theme::WARNING)));
                }
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(
            "Tarefas",
            theme::panel_title(theme::TASKS_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());

    let mut state = ListState::default();
    if !app.board.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render per-category and overall totals.
pub fn render_totals(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for category in Category::ALL {
        spans.push(Span::styled(
            format!("{}: ", category.label()),
            theme::normal().fg(theme::category_color(category)),
        ));
        spans.push(Span::raw(format_duration(
            app.board.category_total(category),
        )));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled("Total: ", theme::bold()));
    spans.push(Span::styled(
        format_duration(app.board.grand_total()),
        theme::bold(),
    ));

    let block = Block::default()
        .title(Span::styled(
            "Totais",
            theme::panel_title(theme::TOTALS_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
