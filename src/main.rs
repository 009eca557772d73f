//! Weightwise: obesity-level prediction
//!
//! Main entry point. Runs the terminal UI when attached to a terminal,
//! otherwise reads JSON submissions from stdin and writes JSON lines.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weightwise::adapters::sanitize::SanitizingMakeWriter;
use weightwise::tui::App;
use weightwise::{headless, AppConfig, ArtifactBundle, PredictionService};

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Logging to the terminal would corrupt the TUI (alternate screen).
    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory should not stop startup.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    tracing::info!("Starting Weightwise (locale {})...", config.locale);

    // No partial mode: refuse to start without a complete, consistent set.
    let bundle = ArtifactBundle::load(&config.artifact_dir, &config.integrity_policy())
        .with_context(|| format!("Failed to load artifacts from {:?}", config.artifact_dir))
        .inspect_err(|e| tracing::error!("{e:#}"))?;
    let service = PredictionService::from_bundle(bundle);

    if interactive {
        let mut app = App::new(service, config.locale);
        app.run()?;
    } else {
        let stdin = std::io::stdin().lock();
        let stdout = std::io::stdout().lock();
        let (ok, failed) = headless::run(&service, config.locale, stdin, stdout)?;
        if ok == 0 && failed > 0 {
            anyhow::bail!("all {failed} submissions were rejected");
        }
    }

    tracing::info!("Weightwise shutdown complete.");
    Ok(())
}
