//! Table view rendering.
//!
//! Displays a summary row per host (status, latency statistics, loss and the
//! last ten samples), followed by a grid of the last twenty seconds across
//! all hosts.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use super::common::render_empty;
use super::theme::Theme;
use crate::app::App;
use crate::data::{HostSummary, PointStatus, GRID_ROWS, SUMMARY_WINDOW};
use crate::source::Sample;

const REPLY_DOT: &str = "●";
const TIMEOUT_DOT: &str = "✕";

/// Render the table view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.store.is_empty() {
        render_empty(frame, app, area, "Hosts");
        return;
    }

    let summary_height = app.store.len() as u16 + 3;
    let chunks = Layout::vertical([Constraint::Length(summary_height), Constraint::Min(5)]).split(area);

    render_summary(frame, app, chunks[0]);
    render_grid(frame, app, chunks[1]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Host", "Status", "Current", "Min", "Avg", "Max", "Loss", "Last 10"])
        .style(app.theme.header);

    let rows: Vec<Row> = app
        .store
        .summaries()
        .into_iter()
        .map(|s| summary_row(&s, &app.theme))
        .collect();

    let widths = [
        Constraint::Fill(3),  // Host
        Constraint::Length(6), // Status
        Constraint::Length(8), // Current
        Constraint::Length(6), // Min
        Constraint::Length(6), // Avg
        Constraint::Length(6), // Max
        Constraint::Length(5), // Loss
        Constraint::Length((SUMMARY_WINDOW * 2) as u16),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Hosts ({}) ", app.store.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

fn summary_row<'a>(s: &HostSummary, theme: &Theme) -> Row<'a> {
    let label = if s.stale {
        Cell::from(format!("{} (stale)", s.label)).style(Style::default().add_modifier(Modifier::DIM))
    } else {
        Cell::from(s.label.clone())
    };

    Row::new(vec![
        label,
        Cell::from(s.status.label()).style(theme.status_style(s.status)),
        Cell::from(s.current_text()),
        Cell::from(s.min_text()),
        Cell::from(s.avg_text()),
        Cell::from(s.max_text()),
        Cell::from(s.loss_text()),
        Cell::from(indicator_strip(&s.recent, theme)),
    ])
}

/// One dot per sample, oldest first.
fn indicator_strip<'a>(samples: &[Sample], theme: &Theme) -> Line<'a> {
    let spans: Vec<Span> = samples
        .iter()
        .map(|sample| {
            let (dot, status) = if sample.is_reply() {
                (REPLY_DOT, PointStatus::Success)
            } else {
                (TIMEOUT_DOT, PointStatus::Timeout)
            };
            Span::styled(format!("{} ", dot), theme.point_style(status))
        })
        .collect();
    Line::from(spans)
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let grid = app.store.history_grid();

    let mut header_cells = vec![Cell::from("Time")];
    header_cells.extend(grid.columns.iter().map(|c| Cell::from(c.clone())));
    let header = Row::new(header_cells).style(app.theme.header);

    // Newest first so the most recent rows stay visible on short terminals
    let rows: Vec<Row> = grid
        .rows
        .iter()
        .rev()
        .map(|row| {
            let mut cells = vec![Cell::from(row.label())];
            cells.extend(row.cells.iter().map(|sample| {
                let style = if sample.is_reply() {
                    Style::default()
                } else {
                    app.theme.point_style(PointStatus::Timeout)
                };
                Cell::from(sample.describe()).style(style)
            }));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(8)];
    widths.extend(grid.columns.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Last {} seconds ", GRID_ROWS))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}
