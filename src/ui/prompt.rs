//! Modal overlays for the tunnel reset: the password prompt and the SSH log.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered;
use crate::app::App;
use crate::recovery::Origin;

/// Render the credential prompt.
///
/// Only the masked form of the input is ever drawn.
pub fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let heading = match app.alert_state().origin() {
        Some(Origin::Auto) => "VPN tunnels are down. Enter the password to reset them.",
        _ => "Enter the password to reset the VPN tunnels.",
    };

    let lines = vec![
        Line::from(heading),
        Line::from(""),
        Line::from(vec![
            Span::styled("Password: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.masked_input()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Enter:submit  Esc:cancel",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Reset VPN ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.warning));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    let prompt_area = centered(area, 60, 8);

    frame.render_widget(Clear, prompt_area);
    frame.render_widget(paragraph, prompt_area);
}

/// Render the transcript of the latest remote reset.
pub fn render_ssh_log(frame: &mut Frame, app: &App, area: Rect) {
    let log_area = centered(area, area.width.saturating_sub(8), area.height.saturating_sub(6));

    let lines: Vec<Line> = if app.status.ssh_log.is_empty() {
        vec![Line::from(Span::styled(
            "No SSH output yet",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        app.status.ssh_log.iter().map(|l| Line::from(l.as_str())).collect()
    };

    // Keep the tail in view
    let inner_height = log_area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let block = Block::default()
        .title(" SSH Output (l:close) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(Clear, log_area);
    frame.render_widget(paragraph, log_area);
}
