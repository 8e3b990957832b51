use ratatui::style::Style;
use ratatui::text::{Line, Span};

use dashboard_core::formatting::format_minutes;
use dashboard_data::aggregator::Matrix;

use crate::components::{display_key, fit_label};
use crate::themes::Theme;

/// Display columns per hour cell.
const CELL_WIDTH: usize = 3;

/// User by hour-of-day grid, one coloured cell per pivot value.
///
/// Cell colours come from [`Theme::heat_color`] on a scale of
/// `0..=matrix.max_value()`.
pub struct Heatmap<'a> {
    pub matrix: &'a Matrix<u32>,
    pub theme: &'a Theme,
    pub label_width: usize,
}

impl<'a> Heatmap<'a> {
    pub fn new(matrix: &'a Matrix<u32>, theme: &'a Theme) -> Self {
        Self {
            matrix,
            theme,
            label_width: 12,
        }
    }

    pub fn label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    /// Hour header, one line per user, then a scale legend.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let max = self.matrix.max_value();
        let mut lines = Vec::with_capacity(self.matrix.rows.len() + 2);

        let mut header = vec![Span::raw(" ".repeat(self.label_width + 1))];
        header.extend(self.matrix.columns.iter().map(|hour| {
            Span::styled(format!("{:>width$}", hour, width = CELL_WIDTH), self.theme.dim)
        }));
        lines.push(Line::from(header));

        for (user, cells) in self.matrix.rows.iter().zip(&self.matrix.values) {
            let mut spans = vec![Span::styled(
                format!("{} ", fit_label(display_key(user), self.label_width)),
                self.theme.label,
            )];
            spans.extend(cells.iter().map(|value| {
                Span::styled(
                    format!(" {}", "█".repeat(CELL_WIDTH - 1)),
                    Style::default().fg(self.theme.heat_color(*value, max)),
                )
            }));
            lines.push(Line::from(spans));
        }

        let mut legend = vec![Span::styled("0 ", self.theme.dim)];
        legend.extend(
            self.theme
                .heat
                .iter()
                .map(|color| Span::styled("█", Style::default().fg(*color))),
        );
        legend.push(Span::styled(
            format!(" {} min", format_minutes(max)),
            self.theme.dim,
        ));
        lines.push(Line::from(legend));

        lines
    }
}
