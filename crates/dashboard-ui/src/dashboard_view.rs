//! The interactive dashboard screen.
//!
//! Layout, top to bottom: header, summary cards, then the filter sidebar
//! next to three rows of chart panels, and finally the alerts and key-hint
//! lines.  Every panel falls back to a neutral "no data" placeholder when
//! its table is empty.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use dashboard_data::analysis::DashboardTables;
use dashboard_data::reader::IngestReport;
use dashboard_runtime::filter_session::FilterSession;

use crate::components::bar_chart::{HorizontalBars, StackedBars};
use crate::components::header::DashboardHeader;
use crate::components::heatmap::Heatmap;
use crate::components::hour_chart::render_hour_chart;
use crate::components::panel::{render_lines, render_no_data};
use crate::components::progress_bar::{ShareBar, TopUserBar};
use crate::components::summary_cards::render_summary_cards;
use crate::filter_panel::{render_filter_panel, FilterPanel};
use crate::themes::Theme;

const SIDEBAR_WIDTH: u16 = 32;
const LABEL_WIDTH: usize = 14;

pub const KEY_HINTS: &str =
    "Tab focus  ↑/↓ move  Space toggle  a all  n none  h host  [ ] start  { } end  r reset  q quit";

/// Everything the dashboard screen reads on each frame.
pub struct DashboardView<'a> {
    pub session: &'a FilterSession,
    pub panel: &'a FilterPanel,
    /// Most recent reload failure, shown until the next successful load.
    pub last_error: Option<&'a str>,
    /// Input path shown while waiting for the first load.
    pub source: &'a str,
    pub theme: &'a Theme,
}

impl<'a> DashboardView<'a> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(dataset) = self.session.dataset() else {
            render_waiting(frame, area, self.source, self.last_error, self.theme);
            return;
        };

        let [header_area, cards_area, body_area, footer_area] = split4(
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]),
            area,
        );

        let source = dataset.display_name();
        let loaded = dataset.loaded_at.format("%H:%M:%S").to_string();
        let summary = self.session.filter().describe();
        let header = DashboardHeader::new(&source, &summary, self.theme).loaded_at(&loaded);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        let tables = self.session.tables();
        render_summary_cards(frame, cards_area, &tables.summary, self.theme);

        let body = Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(body_area);
        render_filter_panel(frame, body[0], self.panel, self.session, self.theme);
        render_charts(frame, body[1], tables, self.theme);

        let footer = vec![
            alerts_line(&[], self.theme),
            status_line(&dataset.report, self.last_error, self.theme),
            Line::from(Span::styled(KEY_HINTS, self.theme.dim)),
        ];
        frame.render_widget(Paragraph::new(Text::from(footer)), footer_area);
    }
}

fn split4(layout: Layout, area: Rect) -> [Rect; 4] {
    let parts = layout.split(area);
    [parts[0], parts[1], parts[2], parts[3]]
}

/// Inner bar width for a bordered panel of `area` with `label_width` labels.
fn bar_width(area: Rect, label_width: usize) -> u16 {
    let reserved = 2 + label_width as u16 + 1 + 9;
    area.width.saturating_sub(reserved).max(1)
}

/// The three chart rows to the right of the sidebar.
pub fn render_charts(frame: &mut Frame, area: Rect, tables: &DashboardTables, theme: &Theme) {
    let rows = Layout::vertical([Constraint::Ratio(1, 3); 3]).split(area);
    let top = Layout::horizontal([Constraint::Ratio(1, 2); 2]).split(rows[0]);
    let middle = Layout::horizontal([Constraint::Ratio(1, 2); 2]).split(rows[1]);
    let bottom = Layout::horizontal([Constraint::Ratio(1, 2); 2]).split(rows[2]);

    // Application overview: bars then the share bar and its legend.
    let title = "Application Overview";
    if tables.by_application.is_empty() {
        render_no_data(frame, top[0], title, theme);
    } else {
        let width = bar_width(top[0], LABEL_WIDTH);
        let mut lines = HorizontalBars::new(&tables.by_application, theme)
            .label_width(LABEL_WIDTH)
            .bar_width(width)
            .to_lines();
        lines.push(Line::from(""));
        let shares = ShareBar::new(&tables.application_shares, theme)
            .width(top[0].width.saturating_sub(2));
        lines.push(shares.bar_line());
        lines.extend(shares.legend_lines());
        render_lines(frame, top[0], title, lines, theme);
    }

    let title = "User Activity";
    if tables.by_user.is_empty() {
        render_no_data(frame, top[1], title, theme);
    } else {
        let lines = HorizontalBars::new(&tables.by_user, theme)
            .label_width(LABEL_WIDTH)
            .bar_width(bar_width(top[1], LABEL_WIDTH))
            .single_color(1)
            .to_lines();
        render_lines(frame, top[1], title, lines, theme);
    }

    // Host usage with the top-user bar underneath.
    let title = "Host Usage";
    if tables.by_host.is_empty() {
        render_no_data(frame, middle[0], title, theme);
    } else {
        let mut lines = HorizontalBars::new(&tables.by_host, theme)
            .label_width(LABEL_WIDTH)
            .bar_width(bar_width(middle[0], LABEL_WIDTH))
            .single_color(2)
            .to_lines();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Top user", theme.label)));
        lines.push(
            TopUserBar::new(tables.top_user.as_ref(), theme)
                .width(bar_width(middle[0], LABEL_WIDTH))
                .to_line(),
        );
        render_lines(frame, middle[0], title, lines, theme);
    }

    render_hour_chart(frame, middle[1], &tables.by_hour, theme);

    let title = "User × Hour";
    if tables.user_hour.is_empty() {
        render_no_data(frame, bottom[0], title, theme);
    } else {
        let lines = Heatmap::new(&tables.user_hour, theme).label_width(10).to_lines();
        render_lines(frame, bottom[0], title, lines, theme);
    }

    let title = "User × Application";
    if tables.user_application.is_empty() {
        render_no_data(frame, bottom[1], title, theme);
    } else {
        let lines = StackedBars::new(&tables.user_application, theme)
            .label_width(10)
            .bar_width(bar_width(bottom[1], 10))
            .to_lines();
        render_lines(frame, bottom[1], title, lines, theme);
    }
}

/// `Alerts: ...` line.  Nothing raises alerts today, so callers pass an
/// empty slice and the line reads "No alerts detected.".
pub fn alerts_line<'a>(alerts: &[String], theme: &Theme) -> Line<'a> {
    if alerts.is_empty() {
        return Line::from(vec![
            Span::styled("Alerts: ", theme.label),
            Span::styled("No alerts detected.", theme.success),
        ]);
    }
    Line::from(vec![
        Span::styled("Alerts: ", theme.label),
        Span::styled(alerts.join("; "), theme.warning),
    ])
}

/// Ingest counters, or the last reload error when one is pending.
pub fn status_line<'a>(report: &IngestReport, last_error: Option<&str>, theme: &Theme) -> Line<'a> {
    if let Some(err) = last_error {
        return Line::from(vec![
            Span::styled("Reload failed: ", theme.error),
            Span::styled(err.to_string(), theme.dim),
        ]);
    }
    let mut spans = vec![
        Span::styled(
            format!("{} of {} rows", report.rows_retained, report.rows_read),
            theme.dim,
        ),
    ];
    if report.dropped_invalid_date > 0 {
        spans.push(Span::styled(
            format!(" | {} invalid dates dropped", report.dropped_invalid_date),
            theme.warning,
        ));
    }
    if report.malformed_rows > 0 {
        spans.push(Span::styled(
            format!(" | {} malformed rows", report.malformed_rows),
            theme.warning,
        ));
    }
    Line::from(spans)
}

/// Shown until the first dataset arrives.
pub fn render_waiting(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    last_error: Option<&str>,
    theme: &Theme,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Loading ", theme.info),
            Span::styled(source.to_string(), theme.value),
            Span::styled(" ...", theme.info),
        ]),
    ];
    if let Some(err) = last_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(err.to_string(), theme.error)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)));
    render_lines(frame, area, crate::components::header::TITLE, lines, theme);
}
