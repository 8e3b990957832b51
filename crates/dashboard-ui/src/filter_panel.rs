//! Sidebar with the date range, host selector and the user and application
//! checkbox lists.
//!
//! [`FilterPanel`] only tracks focus and cursor positions; the selection
//! itself lives in [`FilterSession`].

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use dashboard_runtime::filter_session::{FilterSession, SelectionAxis};

use crate::components::display_key;
use crate::components::panel::panel_block;
use crate::themes::Theme;

/// Which sidebar section receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFocus {
    Dates,
    Host,
    Users,
    Applications,
}

impl FilterFocus {
    const ORDER: [FilterFocus; 4] = [
        FilterFocus::Dates,
        FilterFocus::Host,
        FilterFocus::Users,
        FilterFocus::Applications,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            FilterFocus::Dates => "Date Range",
            FilterFocus::Host => "Host",
            FilterFocus::Users => "Users",
            FilterFocus::Applications => "Applications",
        }
    }

    /// The checkbox list this section edits, if any.
    pub fn axis(self) -> Option<SelectionAxis> {
        match self {
            FilterFocus::Users => Some(SelectionAxis::Users),
            FilterFocus::Applications => Some(SelectionAxis::Applications),
            FilterFocus::Dates | FilterFocus::Host => None,
        }
    }
}

/// Focus and list cursors of the filter sidebar.
#[derive(Debug, Clone)]
pub struct FilterPanel {
    focus: FilterFocus,
    user_cursor: usize,
    app_cursor: usize,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            focus: FilterFocus::Users,
            user_cursor: 0,
            app_cursor: 0,
        }
    }
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> FilterFocus {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn cursor(&self, axis: SelectionAxis) -> usize {
        match axis {
            SelectionAxis::Users => self.user_cursor,
            SelectionAxis::Applications => self.app_cursor,
        }
    }

    /// Move the cursor of the focused list by `delta`, clamped to `len`.
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        let Some(axis) = self.focus.axis() else {
            return;
        };
        let max = len.saturating_sub(1);
        let cursor = self.cursor_mut(axis);
        *cursor = cursor.saturating_add_signed(delta).min(max);
    }

    /// Key under the cursor of the focused list.
    pub fn current_key<'s>(&self, session: &'s FilterSession) -> Option<&'s str> {
        let axis = self.focus.axis()?;
        session
            .choices(axis)
            .get(self.cursor(axis))
            .map(String::as_str)
    }

    /// Pull both cursors back inside their lists after a dataset change.
    pub fn clamp_to(&mut self, session: &FilterSession) {
        for axis in [SelectionAxis::Users, SelectionAxis::Applications] {
            let max = session.choices(axis).len().saturating_sub(1);
            let cursor = self.cursor_mut(axis);
            *cursor = (*cursor).min(max);
        }
    }

    fn cursor_mut(&mut self, axis: SelectionAxis) -> &mut usize {
        match axis {
            SelectionAxis::Users => &mut self.user_cursor,
            SelectionAxis::Applications => &mut self.app_cursor,
        }
    }
}

// ── Line builders ─────────────────────────────────────────────────────────────

fn date_lines<'a>(session: &FilterSession, theme: &Theme) -> Vec<Line<'a>> {
    let range = match session.filter().date_range {
        Some((start, end)) => format!("{} → {}", start, end),
        None => "all dates".to_string(),
    };
    vec![
        Line::from(Span::styled(range, theme.value)),
        Line::from(Span::styled("[ ] start   { } end", theme.dim)),
    ]
}

fn host_lines<'a>(session: &FilterSession, theme: &Theme) -> Vec<Line<'a>> {
    vec![
        Line::from(vec![
            Span::styled("< ", theme.dim),
            Span::styled(session.filter().host.to_string(), theme.value),
            Span::styled(" >", theme.dim),
        ]),
        Line::from(Span::styled("h next host", theme.dim)),
    ]
}

/// Checkbox lines for `axis`, highlighting the cursor row when focused.
pub fn checkbox_lines<'a>(
    session: &FilterSession,
    axis: SelectionAxis,
    cursor: Option<usize>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let choices = session.choices(axis);
    if choices.is_empty() {
        return vec![Line::from(Span::styled("(none)", theme.dim))];
    }
    choices
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let mark = if session.is_selected(axis, key) {
                "[x] "
            } else {
                "[ ] "
            };
            let style = if cursor == Some(i) {
                theme.cursor
            } else {
                theme.text
            };
            Line::from(Span::styled(format!("{}{}", mark, display_key(key)), style))
        })
        .collect()
}

/// First visible row so `cursor` stays inside a list of `height` rows.
fn scroll_offset(cursor: usize, height: u16) -> u16 {
    let visible = usize::from(height.max(1));
    cursor.saturating_sub(visible - 1).min(usize::from(u16::MAX)) as u16
}

// ── Render ────────────────────────────────────────────────────────────────────

pub fn render_filter_panel(
    frame: &mut Frame,
    area: Rect,
    panel: &FilterPanel,
    session: &FilterSession,
    theme: &Theme,
) {
    let sections = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let focused = |f: FilterFocus| panel.focus() == f;

    let dates = Paragraph::new(Text::from(date_lines(session, theme))).block(panel_block(
        FilterFocus::Dates.title(),
        theme,
        focused(FilterFocus::Dates),
    ));
    frame.render_widget(dates, sections[0]);

    let host = Paragraph::new(Text::from(host_lines(session, theme))).block(panel_block(
        FilterFocus::Host.title(),
        theme,
        focused(FilterFocus::Host),
    ));
    frame.render_widget(host, sections[1]);

    for (focus, section) in [
        (FilterFocus::Users, sections[2]),
        (FilterFocus::Applications, sections[3]),
    ] {
        let Some(axis) = focus.axis() else {
            continue;
        };
        let is_focused = focused(focus);
        let cursor = panel.cursor(axis);
        let lines = checkbox_lines(session, axis, is_focused.then_some(cursor), theme);
        let selected = session
            .choices(axis)
            .iter()
            .filter(|k| session.is_selected(axis, k))
            .count();
        let title = format!(
            "{} {}/{}",
            focus.title(),
            selected,
            session.choices(axis).len()
        );
        let list = Paragraph::new(Text::from(lines))
            .scroll((scroll_offset(cursor, section.height.saturating_sub(2)), 0))
            .block(panel_block(&title, theme, is_focused));
        frame.render_widget(list, section);
    }
}
