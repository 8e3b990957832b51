mod bootstrap;

use std::path::PathBuf;

use anyhow::{bail, Result};
use dashboard_core::settings::Settings;
use dashboard_data::analysis::analyze_file;
use dashboard_runtime::orchestrator::ReloadOrchestrator;
use dashboard_ui::app::App;

/// Where logs go for `view`: full-screen views must not write to the
/// terminal, so they fall back to the default log file.
fn log_target(view: &str, log_file: Option<&PathBuf>) -> Option<PathBuf> {
    match (view, log_file) {
        (_, Some(path)) => Some(path.clone()),
        ("dashboard" | "report", None) => Some(bootstrap::default_log_file()),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories()?;
    let log_file = log_target(&settings.view, settings.log_file.as_ref());
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Usage dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Refresh: {}s",
        settings.view,
        settings.theme,
        settings.refresh_rate
    );

    let filter = settings.filter_config()?;
    let path = settings.file.clone();
    let source = path.display().to_string();

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting dashboard for {}", source);

            let orchestrator = ReloadOrchestrator::new(path, u64::from(settings.refresh_rate));
            let (rx, handle) = orchestrator.start();

            let app = App::new(&settings.theme, source, filter);

            // The loop exits on 'q' / Ctrl+C inside the TUI.  A SIGINT from
            // outside cancels it between frames, so the terminal is reset here.
            tokio::select! {
                result = app.run_dashboard(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; stopping reload task");
                    handle.abort();
                    dashboard_ui::app::reset_terminal()?;
                }
            }
        }

        "report" => {
            let result = analyze_file(&path, &filter)?;
            tracing::info!(
                "Report: {} of {} records matched",
                result.metadata.records_matched,
                result.metadata.records_considered
            );

            let app = App::new(&settings.theme, source, filter.clone());
            app.run_report(result.tables, filter.describe()).await?;
        }

        "json" => {
            let result = analyze_file(&path, &filter)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        unknown => bail!("Unknown view mode: {}", unknown),
    }

    Ok(())
}
