// NOTE: Command Organization
//
// One verb per analysis entry point (tree, explain, diff), plus a `config`
// namespace for the settings file. Global flags (--format, --log-level,
// --config) apply to every command.

use crate::types::{ColorChoice, LogLevel, OutputFormat};
use buildscope_types::UnknownDataBehavior;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buildscope")]
#[command(about = "Reconstruct and explain build logs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Settings file (default: $BUILDSCOPE_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rebuild the build tree from a JSON Lines record file")]
    Tree {
        /// Record file; `-` reads standard input
        file: PathBuf,

        /// How to report records this reader does not understand
        #[arg(long)]
        unknown_data: Option<UnknownDataBehavior>,

        /// Skip the string interning pass
        #[arg(long)]
        no_intern: bool,

        #[arg(long)]
        color: Option<ColorChoice>,
    },

    #[command(about = "Evaluate a condition, optionally explaining it with its evaluated form")]
    Explain {
        /// Condition as written, e.g. "'$(Configuration)' == 'Debug'"
        condition: String,

        /// Same condition after property substitution
        evaluated: Option<String>,
    },

    #[command(about = "Compare two command lines argument by argument")]
    Diff {
        left: String,
        right: String,
    },

    #[command(about = "Manage the settings file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective settings and where they come from")]
    Show,

    #[command(about = "Write a settings file with default values")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
