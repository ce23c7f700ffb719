//! Tab bar
//!
//! Lists the screens of the visible stack and highlights the current one.

use authgate_core::Route;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Tabs},
};

/// Render the tab bar for the stack `current` belongs to.
pub fn render(frame: &mut Frame, current: Route, area: Rect) {
    let routes = current.stack().routes();
    let titles = routes.iter().map(|route| route.title());
    let selected = routes.iter().position(|route| *route == current);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}
