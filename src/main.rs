//! CLI entry point for moodle-sync.

use anyhow::{Context, Result};
use clap::Parser;
use moodle_sync_core::{FileConfig, Pipeline, PipelineError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

mod cli;
mod logging;

use cli::Args;
use logging::LogSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Config is read before a log sink exists: errors go to stderr and
    // warnings are held until logging is up.
    let mut file_config = FileConfig::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    args.apply_overrides(&mut file_config);
    let config_warnings = std::mem::take(&mut file_config.warnings);
    let config = match file_config.into_portal_config() {
        Ok(config) => config,
        Err(e) if config_warnings.is_empty() => return Err(e.into()),
        Err(e) => return Err(anyhow::Error::new(e).context(config_warnings.join("; "))),
    };

    let sink = if args.log_stderr {
        LogSink::Stderr
    } else {
        LogSink::File(config.log_path.clone())
    };
    let default_level = logging::resolve_log_level(args.verbose, args.quiet, config.log_level);
    logging::init_tracing(default_level, &sink)?;

    for warning in &config_warnings {
        warn!("{warning}");
    }
    debug!(?args, "CLI arguments parsed");
    info!(base_url = %config.base_url, target_dir = %config.target_dir.display(), "Starting downloader");

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let interval = config.interval;
    let mut pipeline = Pipeline::new(config);
    loop {
        match pipeline.run_until(stop_requested(stop_rx.clone())).await {
            Ok(report) => info!(
                courses = report.courses,
                written = report.written,
                skipped = report.skipped,
                "Download cycle completed"
            ),
            Err(PipelineError::Interrupted) => break,
            Err(e) => {
                error!(error = %e, "Download cycle failed");
                return Err(e.into());
            }
        }

        if args.once {
            break;
        }
        debug!(seconds = interval.as_secs(), "waiting for next cycle");
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = stop_requested(stop_rx.clone()) => break,
        }
    }

    info!("Stopped downloader");
    Ok(())
}

/// Resolves once Ctrl-C has been received.
async fn stop_requested(mut stop_rx: watch::Receiver<bool>) {
    if stop_rx.wait_for(|stop| *stop).await.is_err() {
        // Sender gone without a signal: never fire.
        std::future::pending::<()>().await;
    }
}
