use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// Bordered block with a padded title.
pub fn panel_block<'a>(title: &str, theme: &Theme, focused: bool) -> Block<'a> {
    let border = if focused {
        theme.border_focused
    } else {
        theme.border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", title), theme.header))
}

/// Lines shown inside a panel whose table is empty.
pub fn no_data_lines(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("No data for the current selection", theme.dim)),
    ]
}

/// Render a neutral "no data" panel.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let paragraph = Paragraph::new(Text::from(no_data_lines(theme)))
        .alignment(Alignment::Center)
        .block(panel_block(title, theme, false));
    frame.render_widget(paragraph, area);
}

/// Render pre-built lines inside a titled panel.
pub fn render_lines(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>, theme: &Theme) {
    let paragraph = Paragraph::new(Text::from(lines)).block(panel_block(title, theme, false));
    frame.render_widget(paragraph, area);
}
