use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use dashboard_core::formatting::format_number;
use dashboard_data::aggregator::SummaryCounts;

use crate::components::panel::panel_block;
use crate::themes::Theme;

/// `(title, value)` for each of the four cards, left to right.
pub fn card_values(summary: &SummaryCounts) -> [(&'static str, String); 4] {
    let fmt = |n: usize| format_number(n as f64, 0);
    [
        ("Total Records", fmt(summary.total_records)),
        ("Unique Users", fmt(summary.unique_users)),
        ("Unique Applications", fmt(summary.unique_applications)),
        ("Unique Hosts", fmt(summary.unique_hosts)),
    ]
}

/// Four equal-width metric cards.
pub fn render_summary_cards(frame: &mut Frame, area: Rect, summary: &SummaryCounts, theme: &Theme) {
    let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

    for ((title, value), column) in card_values(summary).into_iter().zip(columns.iter()) {
        let card = Paragraph::new(Text::from(vec![Line::from(Span::styled(
            value,
            theme.value,
        ))]))
        .alignment(Alignment::Center)
        .block(panel_block(title, theme, false));
        frame.render_widget(card, *column);
    }
}
