use ratatui::style::{Color, Modifier, Style};

/// Terminal background type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0–6 are dark, 7–15 light.  Missing or unparseable
/// values are treated as dark.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|val| val.split(';').next_back().and_then(|bg| bg.parse::<u8>().ok()))
        .map_or(BackgroundType::Dark, |bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
}

/// Every style used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Panels ───────────────────────────────────────────────────────────────
    pub border: Style,
    /// Border of the panel that has keyboard focus.
    pub border_focused: Style,
    /// Cursor row inside a focused list.
    pub cursor: Style,

    // ── Progress bars ────────────────────────────────────────────────────────
    pub progress_low: Style,
    pub progress_medium: Style,
    pub progress_high: Style,
    pub progress_empty: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    /// Series colours, cycled by index.
    pub palette: [Color; 8],
    /// Heatmap ramp from lowest to highest.
    pub heat: [Color; 5],
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            cursor: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),

            progress_low: Style::default().fg(Color::Green),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            palette: [
                Color::Cyan,
                Color::Magenta,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::Red,
                Color::LightCyan,
                Color::LightMagenta,
            ],
            heat: [
                Color::Rgb(49, 54, 149),
                Color::Rgb(69, 117, 180),
                Color::Rgb(254, 224, 144),
                Color::Rgb(244, 109, 67),
                Color::Rgb(215, 48, 39),
            ],
        }
    }

    /// Light-background theme with dark text.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::Gray),
            border_focused: Style::default().fg(Color::Blue),
            cursor: Style::default()
                .fg(Color::White)
                .bg(Color::Blue),

            progress_low: Style::default().fg(Color::Green),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            palette: [
                Color::Blue,
                Color::Magenta,
                Color::Green,
                Color::Red,
                Color::Cyan,
                Color::Yellow,
                Color::DarkGray,
                Color::LightBlue,
            ],
            heat: [
                Color::Rgb(224, 243, 248),
                Color::Rgb(145, 191, 219),
                Color::Rgb(254, 224, 144),
                Color::Rgb(252, 141, 89),
                Color::Rgb(215, 48, 39),
            ],
        }
    }

    /// Basic 8-colour ANSI theme without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::White),
            cursor: Style::default().add_modifier(Modifier::REVERSED),

            progress_low: Style::default().fg(Color::Green),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),

            table_header: Style::default().fg(Color::Cyan),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),

            palette: [
                Color::Cyan,
                Color::Magenta,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::Red,
                Color::White,
                Color::Gray,
            ],
            heat: [
                Color::Blue,
                Color::Cyan,
                Color::Green,
                Color::Yellow,
                Color::Red,
            ],
        }
    }

    /// Choose a theme from the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name; unknown names auto-detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Progress-bar fill style: `< 50 %` low, `50–80 %` medium, `≥ 80 %` high.
    pub fn progress_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.progress_high
        } else if percentage >= 50.0 {
            self.progress_medium
        } else {
            self.progress_low
        }
    }

    /// Colour for the `index`-th series, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }

    /// Heatmap colour for `value` on a `0..=max` scale.
    ///
    /// Zero cells (and any cell when `max` is not positive) get the lowest
    /// colour.
    pub fn heat_color(&self, value: f64, max: f64) -> Color {
        if !(max > 0.0) || !(value > 0.0) {
            return self.heat[0];
        }
        let steps = self.heat.len() - 1;
        let ratio = (value / max).clamp(0.0, 1.0);
        let idx = ((ratio * steps as f64).ceil() as usize).clamp(1, steps);
        self.heat[idx]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
