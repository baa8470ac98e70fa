use crate::config::Config;
use crate::types::OutputFormat;
use anyhow::{Result, bail};
use std::path::Path;

pub fn show(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let exists = config_path.exists();

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": exists,
                "settings": config,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Plain => {
            let origin = if exists { "" } else { " (not found, using defaults)" };
            println!("# {}{}", config_path.display(), origin);
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default().save_to(config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
