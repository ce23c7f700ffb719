//! Screen bodies
//!
//! One body per route. Only the sign-in screen takes text input; the
//! credential is drawn masked.

use authgate_core::Route;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::InputState;

const PROMPT_WIDTH: u16 = 13; // left border + "Credential: "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the body of `route`.
pub fn render(frame: &mut Frame, route: Route, input: &InputState, area: Rect) {
    let lines = match route {
        Route::Login => vec![
            Line::from(format!("Credential: {}", "*".repeat(input.buffer().chars().count()))),
            Line::from(""),
            Line::from("Enter: sign in (empty resumes the stored credential)"),
            Line::from("Tab: create account | Esc: quit"),
        ],
        Route::Signup => vec![
            Line::from("Accounts are issued out of band."),
            Line::from("Paste the issued credential on the sign-in screen."),
            Line::from(""),
            Line::from("Tab: sign in | r: re-check | Esc: quit"),
        ],
        Route::Home => vec![
            Line::from("You are signed in."),
            Line::from(""),
            Line::from("Tab: next screen | 1-5: jump | r: re-check"),
            Line::from("l: sign out | f: force sign out | Esc: quit"),
        ],
        Route::Explore => vec![
            Line::from("Screens in this stack are only reachable with a session."),
            Line::from("Jumping to 1 or 2 is redirected back here."),
        ],
        Route::Profile => vec![
            Line::from("Session credential is held in the configured store."),
            Line::from("Sign out erases it; force sign out keeps it."),
        ],
    };

    let block = Block::default().borders(Borders::ALL).title(format!(" {} ", route.title()));
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);

    if route == Route::Login {
        place_cursor(frame, input, area);
    }
}

fn place_cursor(frame: &mut Frame, input: &InputState, area: Rect) {
    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
