use super::args::{Cli, Commands, ConfigCommand};
use super::handlers;
use crate::config::{self, Config};
use crate::logging;
use anyhow::{Context, Result};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config_path = config::resolve_config_path(cli.config.as_deref())
        .context("Could not determine a settings file location; pass --config")?;
    log::debug!("settings file: {}", config_path.display());

    match cli.command {
        Commands::Tree {
            file,
            unknown_data,
            no_intern,
            color,
        } => {
            let config = Config::load_from(&config_path)?;
            let mut options = config.reconstruct_options();
            if let Some(behavior) = unknown_data {
                options = options.with_unknown_data_behavior(behavior);
            }
            if no_intern {
                options = options.with_interning(false);
            }
            let color = color.unwrap_or(config.color);
            handlers::tree::handle(&file, options, color, cli.format)
        }

        Commands::Explain {
            condition,
            evaluated,
        } => {
            let config = Config::load_from(&config_path)?;
            handlers::explain::handle(&condition, evaluated.as_deref(), config.color, cli.format)
        }

        Commands::Diff { left, right } => {
            let config = Config::load_from(&config_path)?;
            handlers::diff::handle(&left, &right, config.color, cli.format)
        }

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(&config_path, cli.format),
            ConfigCommand::Init { force } => handlers::config::init(&config_path, force),
        },
    }
}
