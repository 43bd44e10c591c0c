use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, View, EXPORT_FILE};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // The prompt captures every keystroke
    if app.alert_state().is_prompt_open() {
        handle_prompt_input(app, key);
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    let alert_visible = app.alert_state().alert_visible();

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab | KeyCode::BackTab => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Graph),
        KeyCode::Char('2') => app.set_view(View::Table),

        // Graph scrolling
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),

        // Alert banner
        KeyCode::Enter | KeyCode::Char('R') if alert_visible => app.recover_now(),
        KeyCode::Char('d') if alert_visible => app.dismiss_alert(),

        // Manual reset
        KeyCode::Char('r') => app.manual_reset(),

        // SSH log overlay
        KeyCode::Char('l') => app.toggle_ssh_log(),
        KeyCode::Esc if app.status.show_ssh_log => app.toggle_ssh_log(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while the credential prompt is open
fn handle_prompt_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Backspace => app.prompt_pop(),
        KeyCode::Char(c) => app.prompt_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(),
        MouseEventKind::ScrollDown => app.scroll_down(),

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            // Approximate tab positions: Graph (0-9), Table (10-19)
            if mouse.column < 10 {
                app.set_view(View::Graph);
            } else if mouse.column < 20 {
                app.set_view(View::Table);
            }
        }

        _ => {}
    }
}
