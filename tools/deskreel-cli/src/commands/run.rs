//! Run the capture loop.

use deskreel_capture_engine::{get_backend, CaptureOrchestrator, OrchestratorConfig};
use deskreel_common::config::AppConfig;
use tokio_util::sync::CancellationToken;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let backend = get_backend();
    tracing::info!(?backend, "Capture backend selected");

    let mut orchestrator =
        CaptureOrchestrator::new(OrchestratorConfig::from_app_config(&config), backend);
    let cancel = CancellationToken::new();

    println!("Capturing to {}", config.storage_root.display());
    println!(
        "  Interval: {}s, threshold: {}{}",
        config.capture.interval_secs,
        config.capture.change_threshold,
        if config.capture.save_all_captures {
            ", saving every frame"
        } else {
            ""
        }
    );
    println!("Press Ctrl+C to stop...");

    // Installed before the loop starts so an early SIGTERM is not fatal.
    let mut shutdown = ShutdownSignals::install()?;

    let capture_loop = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            orchestrator.run(cancel).await;
            orchestrator.status()
        }
    });

    let signal = shutdown.recv().await;
    println!();
    tracing::info!(signal, "Shutdown requested, finishing current cycle");
    cancel.cancel();

    let status = capture_loop.await?;
    println!(
        "Stopped after {} cycles: {} frames stored, {} unchanged, {} log records",
        status.cycles_run, status.frames_stored, status.frames_unchanged, status.log_records_written
    );
    if let Some(error) = status.last_error {
        println!("Last error: {error}");
    }

    Ok(())
}

/// Signals that stop the daemon cleanly: Ctrl+C, and SIGTERM from the
/// service manager or at logout.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Register the handlers. From here on these signals no longer kill
    /// the process.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first shutdown signal and name it.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for Ctrl+C, stopping");
                "error"
            }
        }
    }
}
