//! Horizontal bar charts built from styled spans.
//!
//! Bars are scaled to the largest value in the chart, so the top entry
//! always fills the full bar width.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use dashboard_core::formatting::format_minutes;
use dashboard_data::aggregator::{KeyTotal, Matrix};

use crate::components::{display_key, fit_label};
use crate::themes::Theme;

const BAR_CHAR: &str = "█";

/// Number of bar cells for `value` on a `0..=max` scale of `width` cells.
///
/// Positive values never collapse to an empty bar.
fn scaled(value: f64, max: f64, width: u16) -> usize {
    if !(max > 0.0) || !(value > 0.0) {
        return 0;
    }
    let cells = ((value / max).min(1.0) * f64::from(width)).round() as usize;
    cells.max(1)
}

// ── HorizontalBars ────────────────────────────────────────────────────────────

/// One bar per key total: `label █████ 40`.
pub struct HorizontalBars<'a> {
    pub totals: &'a [KeyTotal],
    pub theme: &'a Theme,
    pub label_width: usize,
    pub bar_width: u16,
    /// Palette index for every bar; `None` colours each bar by position.
    pub series: Option<usize>,
}

impl<'a> HorizontalBars<'a> {
    pub fn new(totals: &'a [KeyTotal], theme: &'a Theme) -> Self {
        Self {
            totals,
            theme,
            label_width: 16,
            bar_width: 30,
            series: None,
        }
    }

    pub fn label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    pub fn bar_width(mut self, width: u16) -> Self {
        self.bar_width = width;
        self
    }

    pub fn single_color(mut self, series: usize) -> Self {
        self.series = Some(series);
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let max = self.totals.iter().map(|t| t.minutes).fold(0.0, f64::max);

        self.totals
            .iter()
            .enumerate()
            .map(|(i, total)| {
                let color = self.theme.series_color(self.series.unwrap_or(i));
                Line::from(vec![
                    Span::styled(
                        format!("{} ", fit_label(display_key(&total.key), self.label_width)),
                        self.theme.label,
                    ),
                    Span::styled(
                        BAR_CHAR.repeat(scaled(total.minutes, max, self.bar_width)),
                        Style::default().fg(color),
                    ),
                    Span::styled(format!(" {}", format_minutes(total.minutes)), self.theme.value),
                ])
            })
            .collect()
    }
}

// ── StackedBars ───────────────────────────────────────────────────────────────

/// One stacked bar per pivot row, one coloured segment per column.
///
/// Bar lengths are scaled to the largest row total; segment boundaries are
/// rounded from cumulative sums so a row never exceeds its scaled length.
pub struct StackedBars<'a> {
    pub matrix: &'a Matrix<String>,
    pub theme: &'a Theme,
    pub label_width: usize,
    pub bar_width: u16,
}

impl<'a> StackedBars<'a> {
    pub fn new(matrix: &'a Matrix<String>, theme: &'a Theme) -> Self {
        Self {
            matrix,
            theme,
            label_width: 12,
            bar_width: 40,
        }
    }

    pub fn label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    pub fn bar_width(mut self, width: u16) -> Self {
        self.bar_width = width;
        self
    }

    /// Bar lines followed by a single legend line of the column keys.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let totals: Vec<f64> = (0..self.matrix.rows.len())
            .map(|r| self.matrix.row_total(r))
            .collect();
        let max = totals.iter().copied().fold(0.0, f64::max);

        let mut lines: Vec<Line<'a>> = self
            .matrix
            .rows
            .iter()
            .zip(&self.matrix.values)
            .zip(&totals)
            .map(|((user, cells), total)| {
                let mut spans = vec![Span::styled(
                    format!("{} ", fit_label(display_key(user), self.label_width)),
                    self.theme.label,
                )];
                spans.extend(self.segments(cells, max));
                spans.push(Span::styled(
                    format!(" {}", format_minutes(*total)),
                    self.theme.value,
                ));
                Line::from(spans)
            })
            .collect();

        let mut legend = Vec::new();
        for (i, app) in self.matrix.columns.iter().enumerate() {
            legend.push(Span::styled(
                "■ ",
                Style::default().fg(self.theme.series_color(i)),
            ));
            legend.push(Span::styled(
                format!("{}  ", display_key(app)),
                self.theme.dim,
            ));
        }
        lines.push(Line::from(legend));
        lines
    }

    fn segments(&self, cells: &[f64], max: f64) -> Vec<Span<'a>> {
        if !(max > 0.0) {
            return Vec::new();
        }
        let width = f64::from(self.bar_width);
        let mut spans = Vec::new();
        let mut cumulative = 0.0;
        let mut drawn = 0usize;
        for (i, value) in cells.iter().enumerate() {
            cumulative += value.max(0.0);
            let end = ((cumulative / max).min(1.0) * width).round() as usize;
            let n = end.saturating_sub(drawn);
            if n > 0 {
                spans.push(Span::styled(
                    BAR_CHAR.repeat(n),
                    Style::default().fg(self.theme.series_color(i)),
                ));
            }
            drawn = drawn.max(end);
        }
        spans
    }
}
