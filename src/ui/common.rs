//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, alert banner, status bar,
//! and help overlay.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::centered;
use crate::app::{App, View};
use crate::data::duration::format_age;
use crate::data::HostStatus;

/// Render the header bar with tunnel health overview.
///
/// Displays: status indicator, up/down host counts, time since last refresh.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" TUNNELWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(last_refresh) = app.status.last_refresh else {
        let line = Line::from(vec![title, Span::raw("│ Waiting for first snapshot...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let summaries = app.store.summaries();
    let up = summaries.iter().filter(|s| s.status == HostStatus::Up).count();
    let down = summaries.len() - up;

    let status_style = if down > 0 {
        app.theme.status_style(HostStatus::Down)
    } else {
        app.theme.status_style(HostStatus::Up)
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        title,
        Span::raw("│ "),
        Span::styled(format!("{}", up), Style::default().fg(app.theme.healthy)),
        Span::raw(" up "),
        if down > 0 {
            Span::styled(format!("{}", down), app.theme.status_style(HostStatus::Down))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down │ "),
        Span::raw(format!("Refreshed {} ago", format_age(last_refresh.elapsed()))),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Graph "), Line::from(" 2:Table ")];

    let selected = match app.current_view {
        View::Graph => 0,
        View::Table => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the outage banner shown while every tunnel is down.
pub fn render_alert_banner(frame: &mut Frame, app: &App, area: Rect) {
    let text = " ⚠ VPN TUNNELS DOWN │ Enter/R: Recover Now  d: Dismiss ";
    let paragraph = Paragraph::new(text).style(app.theme.alert_style());
    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom.
///
/// Shows: auto-reset status, reset progress, last poll error, controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status_style = if app.status.is_reset_status() {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(" Auto reset: "),
        Span::styled(app.status.auto_reset_status.clone(), status_style),
        Span::raw(" │ "),
    ];

    if app.alert_state().is_resetting() {
        spans.push(Span::styled(
            "Resetting...",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("r:reset"));
    }

    if let Some(err) = app.poll_error() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(app.theme.critical),
        ));
    }

    spans.push(Span::styled(
        format!(" │ {} │ Tab:switch l:log e:export ?:help q:quit", app.source_description()),
        Style::default().add_modifier(Modifier::DIM),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Views"),
        Line::from("  Tab / 1 / 2   Switch graph/table"),
        Line::from("  ↑/↓ j/k       Scroll charts"),
        Line::from("  l             Toggle SSH log"),
        Line::from(""),
        section(" Recovery"),
        Line::from("  r             Reset VPN (password)"),
        Line::from("  Enter / R     Recover now (alert)"),
        Line::from("  d             Dismiss alert"),
        Line::from("  Esc           Cancel prompt"),
        Line::from(""),
        section(" General"),
        Line::from("  e             Export to JSON"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);
    let help_area = centered(area, 42, 20);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Placeholder shown before any host data has arrived.
pub fn render_empty(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let text = match app.poll_error() {
        Some(err) => format!("No data yet\n\n{}", err),
        None => "No data yet".to_string(),
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
}
