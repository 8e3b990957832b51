use crate::components::display_key;
use crate::themes::Theme;
use dashboard_core::formatting::format_minutes;
use dashboard_data::aggregator::{ShareSlice, TopUser};
use ratatui::text::{Line, Span};

/// Visual settings shared by the bars in this module.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── TopUserBar ───────────────────────────────────────────────────────────────

/// Progress bar for the top user's share of the maximum per-user total.
///
/// Renders as `<user> [fill/empty] NN%  M min`.  With no top user (empty
/// selection) an empty bar labelled `-` is shown.
pub struct TopUserBar<'a> {
    pub top: Option<&'a TopUser>,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> TopUserBar<'a> {
    pub fn new(top: Option<&'a TopUser>, theme: &'a Theme) -> Self {
        Self {
            top,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    pub fn to_line(&self) -> Line<'a> {
        let percent = self.top.map_or(0, |t| t.percent_of_max.min(100));
        let filled = (u32::from(percent) * u32::from(self.config.width) / 100) as usize;
        let empty = usize::from(self.config.width).saturating_sub(filled);

        let filled_str = self.config.filled_char.to_string().repeat(filled);
        let empty_str = self.config.empty_char.to_string().repeat(empty);

        let (name, minutes) = match self.top {
            Some(t) => (display_key(&t.user).to_string(), format_minutes(t.minutes)),
            None => ("-".to_string(), "0".to_string()),
        };

        Line::from(vec![
            Span::styled(format!("{} ", name), self.theme.value),
            Span::styled("[", self.theme.dim),
            Span::styled(filled_str, self.theme.progress_style(f64::from(percent))),
            Span::styled(empty_str, self.theme.progress_empty),
            Span::styled("] ", self.theme.dim),
            Span::styled(format!("{:>3}%", percent), self.theme.value),
            Span::styled(format!("  {} min", minutes), self.theme.label),
        ])
    }
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// Proportional multi-coloured bar with one segment per slice.
///
/// Used as the pie replacement in the application overview: segments are
/// sized by share and coloured by position in the palette, followed by short
/// `key: NN%` labels.
pub struct ShareBar<'a> {
    pub slices: &'a [ShareSlice],
    pub theme: &'a Theme,
    pub width: u16,
}

impl<'a> ShareBar<'a> {
    pub fn new(slices: &'a [ShareSlice], theme: &'a Theme) -> Self {
        Self {
            slices,
            theme,
            width: 50,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// The bar alone, without labels.
    pub fn bar_line(&self) -> Line<'a> {
        let mut spans = Vec::new();
        for (i, slice) in self.slices.iter().enumerate() {
            let chars = ((slice.percent / 100.0) * f64::from(self.width)).round() as usize;
            if chars > 0 {
                spans.push(Span::styled(
                    "█".repeat(chars),
                    ratatui::style::Style::default().fg(self.theme.series_color(i)),
                ));
            }
        }
        Line::from(spans)
    }

    /// One legend line per non-zero slice: `■ key  NN.N%  M min`.
    pub fn legend_lines(&self) -> Vec<Line<'a>> {
        self.slices
            .iter()
            .enumerate()
            .filter(|(_, s)| s.percent > 0.0)
            .map(|(i, s)| {
                Line::from(vec![
                    Span::styled(
                        "■ ",
                        ratatui::style::Style::default().fg(self.theme.series_color(i)),
                    ),
                    Span::styled(display_key(&s.key).to_string(), self.theme.text),
                    Span::styled(format!("  {:.1}%", s.percent), self.theme.value),
                    Span::styled(format!("  {} min", format_minutes(s.minutes)), self.theme.dim),
                ])
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn top(percent: u8) -> TopUser {
        TopUser {
            user: "alice".to_string(),
            minutes: 40.0,
            percent_of_max: percent,
        }
    }

    #[test]
    fn test_top_user_bar_full() {
        let theme = Theme::dark();
        let t = top(100);
        let line = TopUserBar::new(Some(&t), &theme).to_line();

        assert_eq!(line.spans[2].content.chars().count(), 50);
        assert!(line.spans[2].content.chars().all(|c| c == '█'));
        assert_eq!(line.spans[3].content.len(), 0);
        let full = text(&line);
        assert!(full.starts_with("alice "), "text: {full}");
        assert!(full.contains("100%"), "text: {full}");
        assert!(full.contains("40 min"), "text: {full}");
    }

    #[test]
    fn test_top_user_bar_partial_width() {
        let theme = Theme::dark();
        let t = top(25);
        let line = TopUserBar::new(Some(&t), &theme).width(20).to_line();
        assert_eq!(line.spans[2].content.chars().count(), 5);
        assert_eq!(line.spans[3].content.chars().count(), 15);
    }

    #[test]
    fn test_top_user_bar_without_user() {
        let theme = Theme::dark();
        let line = TopUserBar::new(None, &theme).to_line();
        assert_eq!(line.spans[2].content.len(), 0);
        assert_eq!(line.spans[3].content.chars().count(), 50);
        assert!(text(&line).contains("  0%"));
    }

    fn slices() -> Vec<ShareSlice> {
        vec![
            ShareSlice { key: "X".into(), minutes: 30.0, percent: 75.0 },
            ShareSlice { key: "Y".into(), minutes: 10.0, percent: 25.0 },
            ShareSlice { key: "Z".into(), minutes: 0.0, percent: 0.0 },
        ]
    }

    #[test]
    fn test_share_bar_segments() {
        let theme = Theme::dark();
        let s = slices();
        let line = ShareBar::new(&s, &theme).width(40).bar_line();
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content.chars().count(), 30);
        assert_eq!(line.spans[1].content.chars().count(), 10);
    }

    #[test]
    fn test_share_bar_legend_skips_zero() {
        let theme = Theme::dark();
        let s = slices();
        let legend = ShareBar::new(&s, &theme).legend_lines();
        assert_eq!(legend.len(), 2);
        assert!(text(&legend[0]).contains("75.0%"));
        assert!(text(&legend[1]).contains("Y"));
    }
}
