//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`chart`]: Graph view, one latency chart per host
//! - [`table`]: Table view, per-host summaries and the recent-history grid
//! - [`prompt`]: Credential prompt and SSH log overlays
//! - [`common`]: Shared components (header, tabs, alert banner, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │ Alert banner (while tunnels down)    │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (chart/table::render)                │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - prompt::render_ssh_log
//!    - prompt::render_prompt
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod prompt;
pub mod table;
pub mod theme;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Frame;

use crate::app::{App, View};

pub use theme::Theme;

/// Draw one full frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let banner_height = if app.alert_state().alert_visible() { 1 } else { 0 };

    let chunks = Layout::vertical([
        Constraint::Length(1),             // Header bar
        Constraint::Length(1),             // Tabs
        Constraint::Length(banner_height), // Alert banner
        Constraint::Min(8),                // Content
        Constraint::Length(1),             // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);
    if banner_height > 0 {
        common::render_alert_banner(frame, app, chunks[2]);
    }

    match app.current_view {
        View::Graph => chart::render(frame, app, chunks[3]),
        View::Table => table::render(frame, app, chunks[3]),
    }

    common::render_status_bar(frame, app, chunks[4]);

    if app.status.show_ssh_log {
        prompt::render_ssh_log(frame, app, area);
    }
    if app.alert_state().is_prompt_open() {
        prompt::render_prompt(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}

/// Center a `width` x `height` box inside `area`, shrinking it to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
