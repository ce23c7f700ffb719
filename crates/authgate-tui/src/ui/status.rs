//! Status bar
//!
//! Displays the session state and the shell's status line.

use authgate_app::Status;
use authgate_core::GateState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::Shell;

/// Render the status bar.
pub fn render(frame: &mut Frame, shell: &Shell, area: Rect) {
    let session = match shell.gate() {
        GateState::Pending => Span::styled("Pending", Style::default().fg(Color::Yellow)),
        GateState::Unauthenticated => Span::styled("Signed out", Style::default().fg(Color::Red)),
        GateState::Authenticated => Span::styled(
            "Signed in",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let message = match shell.status() {
        Some(Status::Progress(text)) => Span::styled(format!(" | {text}"), Style::default()),
        Some(Status::Error(text)) => {
            Span::styled(format!(" | {text}"), Style::default().fg(Color::LightRed))
        },
        None => Span::raw(""),
    };

    let status_line = Line::from(vec![Span::raw(" "), session, message]);
    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
