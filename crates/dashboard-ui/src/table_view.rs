//! Static report screen: the user × application pivot table.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per user, one
//! column per application, a per-user total column and a highlighted totals
//! row at the bottom.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use dashboard_core::formatting::{format_minutes, format_number};
use dashboard_data::aggregator::Matrix;
use dashboard_data::analysis::DashboardTables;

use crate::components::display_key;
use crate::components::header::DashboardHeader;
use crate::components::panel::{panel_block, render_no_data};
use crate::themes::Theme;

pub const TITLE: &str = "Minutes by User and Application";

/// Pivot cells formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotText {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub totals: Vec<String>,
}

impl PivotText {
    pub fn from_matrix(matrix: &Matrix<String>) -> Self {
        let mut header = vec!["User".to_string()];
        header.extend(matrix.columns.iter().map(|c| display_key(c).to_string()));
        header.push("Total".to_string());

        let rows = matrix
            .rows
            .iter()
            .zip(&matrix.values)
            .enumerate()
            .map(|(i, (user, cells))| {
                let mut row = vec![display_key(user).to_string()];
                row.extend(cells.iter().map(|v| format_minutes(*v)));
                row.push(format_minutes(matrix.row_total(i)));
                row
            })
            .collect();

        let column_totals = matrix.column_totals();
        let grand_total: f64 = column_totals.iter().sum();
        let mut totals = vec![format!("TOTAL ({} users)", matrix.rows.len())];
        totals.extend(column_totals.iter().map(|v| format_minutes(*v)));
        totals.push(format_minutes(grand_total));

        Self {
            header,
            rows,
            totals,
        }
    }

    /// Column widths wide enough for every cell plus two columns of padding.
    pub fn widths(&self) -> Vec<u16> {
        (0..self.header.len())
            .map(|c| {
                std::iter::once(&self.header)
                    .chain(&self.rows)
                    .chain(std::iter::once(&self.totals))
                    .filter_map(|row| row.get(c))
                    .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                    .max()
                    .unwrap_or(0) as u16
                    + 2
            })
            .collect()
    }
}

/// Render the pivot table into `area`.
pub fn render_pivot_table(frame: &mut Frame, area: Rect, matrix: &Matrix<String>, theme: &Theme) {
    if matrix.is_empty() {
        render_no_data(frame, area, TITLE, theme);
        return;
    }

    let text = PivotText::from_matrix(matrix);
    let header = Row::new(
        text.header
            .iter()
            .map(|h| Cell::from(h.clone()).style(theme.table_header)),
    )
    .height(1);

    let mut rows: Vec<Row> = text
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(cells.iter().map(|c| Cell::from(c.clone()))).style(style)
        })
        .collect();
    rows.push(Row::new(text.totals.iter().map(|c| Cell::from(c.clone()))).style(theme.table_total));

    let widths: Vec<Constraint> = text.widths().into_iter().map(Constraint::Length).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(TITLE, theme, false))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Full report screen: header, one summary line, the pivot and an exit hint.
pub fn render_report(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    tables: &DashboardTables,
    filter_summary: &str,
    theme: &Theme,
) {
    let parts = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    let header = DashboardHeader::new(source, filter_summary, theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), parts[0]);

    let summary = Line::from(vec![
        Span::styled("Records: ", theme.label),
        Span::styled(
            format_number(tables.summary.total_records as f64, 0),
            theme.value,
        ),
        Span::styled("   Total: ", theme.label),
        Span::styled(format!("{} min", format_minutes(tables.total_minutes())), theme.value),
    ]);
    frame.render_widget(Paragraph::new(summary), parts[1]);

    render_pivot_table(frame, parts[2], &tables.user_application, theme);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Press 'q' or Ctrl+C to exit",
            theme.dim,
        ))),
        parts[3],
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
