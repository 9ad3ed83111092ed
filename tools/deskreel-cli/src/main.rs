//! deskreel CLI: run the capture daemon and inspect what it stored.
//!
//! Usage:
//!   deskreel run [OPTIONS]      Capture until Ctrl+C or SIGTERM
//!   deskreel check              Check the desktop helpers deskreel uses
//!   deskreel day [DATE]         Validate one stored day
//!   deskreel config [--init]    Show or create the config file

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use deskreel_common::config::LoggingConfig;

mod commands;

use commands::ConfigArgs;

#[derive(Parser)]
#[command(
    name = "deskreel",
    about = "Periodic multi-monitor screenshots with a window activity log",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture loop until interrupted
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Seconds between captures
        #[arg(long)]
        interval: Option<u64>,

        /// Largest per-channel difference still treated as unchanged (0-255)
        #[arg(long)]
        threshold: Option<u8>,

        /// Store every frame, skipping change detection
        #[arg(long)]
        save_all: bool,
    },

    /// Check display session and helper tools
    Check,

    /// Validate and summarize one day of captures
    Day {
        /// Day to inspect, YYYY-MM-DD [default: today]
        date: Option<NaiveDate>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the resolved configuration
    Config {
        /// Write the defaults to the standard location if no file exists
        #[arg(long)]
        init: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            interval,
            threshold,
            save_all,
        } => {
            let resolved = config.resolve()?;
            let mut app = resolved.config;
            if let Some(interval) = interval {
                app.capture.interval_secs = interval;
            }
            if let Some(threshold) = threshold {
                app.capture.change_threshold = threshold;
            }
            if save_all {
                app.capture.save_all_captures = true;
            }
            if cli.verbose {
                app.logging.level = "debug".to_string();
            }
            deskreel_common::logging::init_logging(&app.logging);
            if let Some(warning) = resolved.warning {
                tracing::warn!("{warning}");
            }
            commands::run::run(app).await
        }
        Commands::Check => {
            init_console_logging(cli.verbose);
            commands::check::run()
        }
        Commands::Day { date, config } => {
            init_console_logging(cli.verbose);
            commands::day::run(date, config)
        }
        Commands::Config { init, config } => {
            init_console_logging(cli.verbose);
            commands::config::run(init, config)
        }
    }
}

fn init_console_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    deskreel_common::logging::init_logging(&LoggingConfig {
        level: level.to_string(),
        json: false,
        file: None,
    });
}
