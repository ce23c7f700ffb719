//! Splash
//!
//! Drawn while a check, login or logout is outstanding.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Render the splash.
pub fn render(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("Checking session...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" authgate "));

    frame.render_widget(paragraph, area);
}
