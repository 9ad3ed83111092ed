//! Show or initialize the configuration file.

use deskreel_common::config::{config_file_path, AppConfig};

use super::ConfigArgs;

pub fn run(init: bool, args: ConfigArgs) -> anyhow::Result<()> {
    if init {
        let path = args.config.clone().unwrap_or_else(config_file_path);
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            AppConfig::default().save_to(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    let resolved = args.resolve()?;
    if let Some(warning) = resolved.warning {
        println!("Warning: {warning}");
    }
    resolved.config.validate()?;
    println!("{}", serde_json::to_string_pretty(&resolved.config)?);
    Ok(())
}
