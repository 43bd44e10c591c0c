//! Graph view: one latency chart per host.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::common::render_empty;
use crate::app::App;
use crate::data::chart::{x_labels, y_labels, Y_MAX};
use crate::data::{ChartSeries, CHART_WINDOW};

/// Rows given to each host's chart.
const CHART_HEIGHT: u16 = 12;

/// Render the graph view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let charts = app.store.charts();
    if charts.is_empty() {
        render_empty(frame, app, area, "Latency");
        return;
    }

    let visible = usize::from((area.height / CHART_HEIGHT).max(1));
    let shown: Vec<&ChartSeries> = charts.iter().skip(app.scroll).take(visible).collect();

    let constraints: Vec<Constraint> = shown.iter().map(|_| Constraint::Length(CHART_HEIGHT)).collect();
    let rows = Layout::vertical(constraints).split(area);

    for (series, row) in shown.iter().zip(rows.iter()) {
        render_series(frame, app, series, *row);
    }
}

fn render_series(frame: &mut Frame, app: &App, series: &ChartSeries, area: Rect) {
    let replies = series.replies();
    let timeouts = series.timeouts();

    let latest = series.latest();
    let latest_style = latest.map_or(Style::default(), |p| app.theme.point_style(p.status));
    let latest_text = latest.map_or_else(String::new, |p| p.describe());

    let datasets = vec![
        Dataset::default()
            .name("reply")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.healthy))
            .data(&replies),
        Dataset::default()
            .name("timeout")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(app.theme.critical))
            .data(&timeouts),
    ];

    let mut title = vec![Span::styled(format!(" {} ", series.label), app.theme.header)];
    if series.stale {
        title.push(Span::styled("(stale) ", Style::default().add_modifier(Modifier::DIM)));
    }
    title.push(Span::styled(
        format!("{} ", latest_text),
        latest_style.add_modifier(Modifier::BOLD),
    ));

    let block = Block::default()
        .title(ratatui::text::Line::from(title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let x_min = -((CHART_WINDOW - 1) as f64);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("s ago")
                .style(Style::default().fg(app.theme.border))
                .bounds([x_min, 0.0])
                .labels(x_labels().to_vec()),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, Y_MAX])
                .labels(y_labels()),
        )
        .hidden_legend_constraints((Constraint::Length(0), Constraint::Length(0)));

    frame.render_widget(chart, area);
}
