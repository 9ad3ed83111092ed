pub mod check;
pub mod config;
pub mod day;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use deskreel_common::config::AppConfig;

/// Where configuration comes from, shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Config file [default: $XDG_CONFIG_HOME/deskreel/config.json]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage root, overriding the config file
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// A loaded configuration plus a problem worth logging once logging is up.
pub struct Resolved {
    pub config: AppConfig,
    pub warning: Option<String>,
}

impl ConfigArgs {
    /// Load the configuration and apply the root override.
    ///
    /// An explicit `--config` must load; the standard location falls back
    /// to defaults with a warning.
    pub fn resolve(&self) -> anyhow::Result<Resolved> {
        let (mut config, warning) = match &self.config {
            Some(path) => (AppConfig::load_from(path)?, None),
            None => AppConfig::load(),
        };
        if let Some(root) = &self.root {
            config.storage_root = root.clone();
        }
        Ok(Resolved { config, warning })
    }
}
