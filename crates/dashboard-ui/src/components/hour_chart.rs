use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    widgets::{Axis, Chart, Dataset, GraphType},
    Frame,
};

use dashboard_core::formatting::format_minutes;
use dashboard_data::aggregator::HourTotal;

use crate::components::panel::{panel_block, render_no_data};
use crate::themes::Theme;

pub const TITLE: &str = "Work Pattern by Hour";

/// `(hour, minutes)` points for the chart, in ascending hour order.
pub fn hour_points(hours: &[HourTotal]) -> Vec<(f64, f64)> {
    hours
        .iter()
        .map(|h| (f64::from(h.hour), h.minutes))
        .collect()
}

/// Line chart of minutes per hour of day over a fixed `0..=23` axis.
pub fn render_hour_chart(frame: &mut Frame, area: Rect, hours: &[HourTotal], theme: &Theme) {
    if hours.is_empty() {
        render_no_data(frame, area, TITLE, theme);
        return;
    }

    let points = hour_points(hours);
    let max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_top = if max > 0.0 { max * 1.1 } else { 1.0 };

    let dataset = Dataset::default()
        .name("minutes")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.series_color(0)))
        .data(&points);

    let x_labels: Vec<String> = ["0", "6", "12", "18", "23"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let y_labels = vec![
        "0".to_string(),
        format_minutes((max / 2.0).round()),
        format_minutes(max.round()),
    ];

    let chart = Chart::new(vec![dataset])
        .block(panel_block(TITLE, theme, false))
        .x_axis(
            Axis::default()
                .title("hour")
                .style(theme.dim)
                .bounds([0.0, 23.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("min")
                .style(theme.dim)
                .bounds([0.0, y_top])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}
