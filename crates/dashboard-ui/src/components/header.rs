use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

pub const TITLE: &str = "TEAM APPLICATION USAGE DASHBOARD";

/// Dashboard header rendering four lines:
///
/// 1. Title with sparkle decorations.
/// 2. A 60-column `=` separator.
/// 3. `[ source file | loaded at ]`.
/// 4. The active filter summary.
pub struct DashboardHeader<'a> {
    /// Display name of the loaded file, or a placeholder before the first load.
    pub source: &'a str,
    /// Local time of the last successful load, e.g. `"14:02:11"`.
    pub loaded_at: Option<&'a str>,
    /// One-line filter description.
    pub filter_summary: &'a str,
    pub theme: &'a Theme,
}

impl<'a> DashboardHeader<'a> {
    pub fn new(source: &'a str, filter_summary: &'a str, theme: &'a Theme) -> Self {
        Self {
            source,
            loaded_at: None,
            filter_summary,
            theme,
        }
    }

    pub fn loaded_at(mut self, loaded_at: &'a str) -> Self {
        self.loaded_at = Some(loaded_at);
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.source, self.theme.value),
        ];
        if let Some(ts) = self.loaded_at {
            info.push(Span::styled(" | loaded ", self.theme.label));
            info.push(Span::styled(ts, self.theme.value));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.info),
                Span::styled(format!(" {} ", TITLE), self.theme.header),
                Span::styled(SPARKLES, self.theme.info),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(vec![
                Span::styled("Filters: ", self.theme.label),
                Span::styled(self.filter_summary, self.theme.text),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
