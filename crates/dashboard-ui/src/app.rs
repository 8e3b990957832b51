//! Main application state and TUI event loops.
//!
//! [`App`] owns the theme, the [`FilterSession`] and the sidebar state.  It
//! drives the interactive dashboard (fed by [`DatasetUpdate`]s from the
//! reload orchestrator) and the static report screen.

use std::io;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use dashboard_core::models::FilterConfig;
use dashboard_data::analysis::DashboardTables;
use dashboard_runtime::filter_session::{FilterSession, RangeBound};
use dashboard_runtime::orchestrator::DatasetUpdate;

use crate::dashboard_view::DashboardView;
use crate::filter_panel::{FilterFocus, FilterPanel};
use crate::table_view;
use crate::themes::Theme;

type CrosstermTerminal = Terminal<CrosstermBackend<io::Stdout>>;

const TICK_RATE: Duration = Duration::from_millis(250);

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current dataset, selection and computed tables.
    pub session: FilterSession,
    /// Sidebar focus and cursors.
    pub panel: FilterPanel,
    /// Command-line selection, overlaid on every newly loaded dataset.
    pub seed: FilterConfig,
    /// Input path as given on the command line.
    pub source: String,
    /// Most recent reload failure, cleared by the next successful load.
    pub last_error: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, source: impl Into<String>, seed: FilterConfig) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            session: FilterSession::new(),
            panel: FilterPanel::new(),
            seed,
            source: source.into(),
            last_error: None,
            should_quit: false,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the interactive dashboard, receiving datasets from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while
    /// updates arrive on the async channel via `try_recv`.
    pub async fn run_dashboard(mut self, mut rx: mpsc::Receiver<DatasetUpdate>) -> io::Result<()> {
        let mut terminal = setup_terminal()?;

        let result = self
            .event_loop(
                &mut rx,
                |app| terminal.draw(|frame| app.render(frame)).map(|_| ()),
                poll_event,
            )
            .await;

        // Restore terminal state unconditionally.
        restore_terminal(&mut terminal)?;
        result
    }

    /// Draw, handle one input event, apply pending dataset updates, repeat
    /// until quit.  Yields to the scheduler after every frame so sibling
    /// branches of a `select!` (signal handling) still get polled.
    async fn event_loop(
        &mut self,
        rx: &mut mpsc::Receiver<DatasetUpdate>,
        mut draw: impl FnMut(&Self) -> io::Result<()>,
        mut next_event: impl FnMut() -> io::Result<Option<Event>>,
    ) -> io::Result<()> {
        loop {
            draw(&*self)?;

            if let Some(Event::Key(key)) = next_event()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }

            // Drain any pending dataset updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(update) => self.handle_update(update),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        tracing::warn!("reload channel disconnected; leaving dashboard");
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }

            tokio::task::yield_now().await;
        }
    }

    /// Show the static report screen until `q` / `Ctrl+C`.
    pub async fn run_report(mut self, tables: DashboardTables, filter_summary: String) -> io::Result<()> {
        let mut terminal = setup_terminal()?;

        let result = loop {
            let drawn = terminal.draw(|frame| {
                let area = frame.area();
                table_view::render_report(
                    frame,
                    area,
                    &self.source,
                    &tables,
                    &filter_summary,
                    &self.theme,
                );
            });
            if let Err(err) = drawn {
                break Err(err);
            }

            match event::poll(TICK_RATE) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if is_quit(&key) {
                            self.should_quit = true;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => break Err(err),
                },
                Ok(false) => {}
                Err(err) => break Err(err),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        restore_terminal(&mut terminal)?;
        result
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Apply a message from the reload orchestrator.
    pub fn handle_update(&mut self, update: DatasetUpdate) {
        match update {
            DatasetUpdate::Loaded(dataset) => {
                tracing::info!(
                    file = %dataset.display_name(),
                    records = dataset.records.len(),
                    "new dataset received"
                );
                self.session.install_dataset(dataset);
                self.session.apply_overrides(&self.seed);
                self.panel.clamp_to(&self.session);
                self.last_error = None;
            }
            DatasetUpdate::Failed(err) => {
                tracing::warn!(error = %err, "dataset reload failed");
                self.last_error = Some(err);
            }
        }
    }

    /// Map one key press onto the sidebar or the filter session.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if is_quit(&key) {
            self.should_quit = true;
            return;
        }

        let axis = self.panel.focus().axis();
        match key.code {
            KeyCode::Tab => self.panel.focus_next(),
            KeyCode::BackTab => self.panel.focus_prev(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => match self.panel.focus() {
                FilterFocus::Host => self.session.cycle_host(),
                FilterFocus::Users | FilterFocus::Applications => {
                    if let (Some(axis), Some(key)) = (axis, self.panel.current_key(&self.session)) {
                        let key = key.to_string();
                        self.session.toggle(axis, &key);
                    }
                }
                FilterFocus::Dates => {}
            },
            KeyCode::Char('a') => {
                if let Some(axis) = axis {
                    self.session.select_all(axis);
                }
            }
            KeyCode::Char('n') => {
                if let Some(axis) = axis {
                    self.session.select_none(axis);
                }
            }
            KeyCode::Char('h') => self.session.cycle_host(),
            KeyCode::Char('[') => self.session.shift_range(RangeBound::Start, -1),
            KeyCode::Char(']') => self.session.shift_range(RangeBound::Start, 1),
            KeyCode::Char('{') => self.session.shift_range(RangeBound::End, -1),
            KeyCode::Char('}') => self.session.shift_range(RangeBound::End, 1),
            KeyCode::Char('r') => self.session.reset(),
            _ => {}
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn move_cursor(&mut self, delta: isize) {
        if let Some(axis) = self.panel.focus().axis() {
            let len = self.session.choices(axis).len();
            self.panel.move_cursor(delta, len);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        DashboardView {
            session: &self.session,
            panel: &self.panel,
            last_error: self.last_error.as_deref(),
            source: &self.source,
            theme: &self.theme,
        }
        .render(frame, area);
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

/// Wait up to one tick for a terminal event.
fn poll_event() -> io::Result<Option<Event>> {
    if event::poll(TICK_RATE)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Leave raw mode and the alternate screen without a [`Terminal`] handle,
/// for when a running view is cancelled from outside.
pub fn reset_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

fn setup_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{ActivityRecord, HostFilter};
    use dashboard_data::reader::IngestReport;
    use dashboard_runtime::data_manager::{Dataset, FileFingerprint};
    use dashboard_runtime::filter_session::SelectionAxis;
    use ratatui::backend::TestBackend;
    use std::path::Path;
    use std::sync::Arc;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn rec(day: u32, host: &str, user: &str, app: &str, minutes: f64) -> ActivityRecord {
        ActivityRecord {
            date: d(day),
            written_at: d(day).and_hms_opt(10, 0, 0),
            host: host.to_string(),
            user: user.to_string(),
            application: app.to_string(),
            total_active_time_minutes: Some(minutes),
        }
    }

    fn dataset(records: Vec<ActivityRecord>) -> Arc<Dataset> {
        Arc::new(Dataset::from_records(
            Path::new("usage.csv"),
            records,
            IngestReport::default(),
            FileFingerprint {
                modified: None,
                len: 0,
            },
        ))
    }

    fn loaded_app() -> App {
        let mut app = App::new("dark", "usage.csv", FilterConfig::default());
        app.handle_update(DatasetUpdate::Loaded(dataset(vec![
            rec(2, "h1", "alice", "X", 30.0),
            rec(2, "h1", "alice", "Y", 10.0),
            rec(3, "h2", "bob", "X", 5.0),
        ])));
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_app_creation_defaults() {
        let app = App::new("neon", "usage.csv", FilterConfig::default());
        assert_eq!(app.source, "usage.csv");
        assert!(!app.should_quit);
        assert!(app.last_error.is_none());
        assert!(app.session.dataset().is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_loaded_update_installs_dataset() {
        let app = loaded_app();
        assert_eq!(app.session.tables().summary.total_records, 3);
        assert_eq!(app.session.filter().users.len(), 2);
    }

    #[test]
    fn test_failed_update_keeps_dataset() {
        let mut app = loaded_app();
        app.handle_update(DatasetUpdate::Failed("disk gone".into()));
        assert_eq!(app.last_error.as_deref(), Some("disk gone"));
        assert_eq!(app.session.tables().summary.total_records, 3);

        app.handle_update(DatasetUpdate::Loaded(dataset(vec![rec(
            4, "h1", "carol", "Z", 1.0,
        )])));
        assert!(app.last_error.is_none());
        assert_eq!(app.session.tables().summary.total_records, 1);
    }

    #[test]
    fn test_seed_overlaid_on_every_load() {
        let seed = FilterConfig::default().with_host(HostFilter::Only("h2".into()));
        let mut app = App::new("dark", "usage.csv", seed);
        app.handle_update(DatasetUpdate::Loaded(dataset(vec![
            rec(2, "h1", "alice", "X", 30.0),
            rec(3, "h2", "bob", "X", 5.0),
        ])));
        assert_eq!(app.session.filter().host, HostFilter::Only("h2".into()));
        assert_eq!(app.session.tables().summary.total_records, 1);
    }

    #[test]
    fn test_space_toggles_user_under_cursor() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.session.is_selected(SelectionAxis::Users, "bob"));
        assert_eq!(app.session.tables().summary.total_records, 2);
    }

    #[test]
    fn test_select_none_and_all() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel.focus(), FilterFocus::Applications);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.session.filter().applications.is_empty());
        assert_eq!(app.session.tables().summary.total_records, 3);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session.filter().applications.len(), 2);
    }

    #[test]
    fn test_host_and_range_keys() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.session.filter().host, HostFilter::Only("h1".into()));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.session.filter().host, HostFilter::All);

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.session.filter().date_range, Some((d(3), d(3))));
        press(&mut app, KeyCode::Char('['));
        press(&mut app, KeyCode::Char('{'));
        assert_eq!(app.session.filter().date_range, Some((d(2), d(2))));
        press(&mut app, KeyCode::Char('}'));
        assert_eq!(app.session.filter().date_range, Some((d(2), d(3))));
    }

    #[test]
    fn test_space_on_host_focus_cycles_host() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.panel.focus(), FilterFocus::Dates);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.filter().host, HostFilter::All);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.filter().host, HostFilter::Only("h1".into()));
    }

    #[test]
    fn test_render_does_not_panic() {
        let backend = TestBackend::new(160, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = loaded_app();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let empty = App::new("light", "usage.csv", FilterConfig::default());
        terminal.draw(|frame| empty.render(frame)).unwrap();
    }

    #[tokio::test]
    async fn test_event_loop_applies_updates_and_quits() {
        let mut app = App::new("dark", "usage.csv", FilterConfig::default());
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(DatasetUpdate::Loaded(dataset(vec![rec(2, "h1", "alice", "X", 30.0)])))
            .await
            .unwrap();

        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        let mut events = vec![None, Some(quit)].into_iter();
        let mut frames = 0;

        app.event_loop(
            &mut rx,
            |_| {
                frames += 1;
                Ok(())
            },
            || Ok(events.next().flatten()),
        )
        .await
        .unwrap();

        assert_eq!(frames, 2);
        assert!(app.should_quit);
        assert!(app.session.dataset().is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_event_loop_lets_sibling_branches_run() {
        let mut app = App::new("dark", "usage.csv", FilterConfig::default());
        let (_tx, mut rx) = mpsc::channel::<DatasetUpdate>(1);

        let interrupted = tokio::select! {
            result = app.event_loop(&mut rx, |_| Ok(()), || Ok(None)) => {
                result.unwrap();
                false
            }
            _ = tokio::time::sleep(Duration::from_millis(20)) => true,
        };

        assert!(interrupted);
        assert!(!app.should_quit);
    }
}
