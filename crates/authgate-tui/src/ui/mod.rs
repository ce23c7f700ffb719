//! UI rendering
//!
//! Rendering functions that convert shell state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod screens;
mod splash;
mod status;
mod tabs;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::{InputState, Shell};

/// Render the entire UI.
///
/// While the session is pending only the splash is drawn: no screen from
/// either stack is visible.
pub fn render(frame: &mut Frame, shell: &Shell, input: &InputState) {
    const TABS_HEIGHT: u16 = 3;
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TABS_HEIGHT),
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [tabs_area, main_area, status_area] = chunks.as_ref() else {
        return;
    };

    match shell.visible_screen() {
        Some(route) => {
            tabs::render(frame, route, *tabs_area);
            screens::render(frame, route, input, *main_area);
        },
        None => splash::render(frame, *main_area),
    }
    status::render(frame, shell, *status_area);
}

#[cfg(test)]
mod tests {
    use authgate_app::ShellEvent;
    use authgate_core::{AuthSnapshot, Route};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::KeyInput;

    fn draw(shell: &Shell, input: &InputState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).expect("terminal");
        terminal.draw(|frame| render(frame, shell, input)).expect("draw");

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn settled(logged_in: bool) -> Shell {
        let mut shell = Shell::new();
        let _ = shell.handle(ShellEvent::AuthChanged(AuthSnapshot {
            is_logged_in: logged_in,
            is_loading: false,
        }));
        shell
    }

    #[test]
    fn pending_draws_splash_only() {
        let text = draw(&Shell::new(), &InputState::new());

        assert!(text.contains("Checking session"));
        assert!(!text.contains("Sign in"));
        assert!(!text.contains("Home"));
    }

    #[test]
    fn logged_out_draws_login_with_masked_credential() {
        let mut input = InputState::new();
        for c in "secret".chars() {
            input.handle_key(KeyInput::Char(c), Some(Route::Login));
        }
        let text = draw(&settled(false), &input);

        assert!(text.contains("Sign in"));
        assert!(text.contains("******"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("Explore"));
    }

    #[test]
    fn logged_in_draws_authenticated_tabs() {
        let text = draw(&settled(true), &InputState::new());

        assert!(text.contains("Home"));
        assert!(text.contains("Explore"));
        assert!(text.contains("Profile"));
        assert!(!text.contains("Create account"));
    }
}
