// NOTE: buildscope CLI Rationale
//
// Why a record stream (not the binary log) as input?
// - Decoding the binary container is a separate tool's job
// - JSON Lines records can be produced, filtered and inspected with standard tools
// - The same records drive the engine in-process and in tests
//
// Why settle unknown data in one summary node?
// - Logs from newer build engines should still open in older readers
// - One node per skipped record would drown the real diagnostics
// - `--unknown-data throw-exception` is there when a hard failure is wanted

mod args;
mod commands;
pub mod config;
mod handlers;
mod logging;
pub mod output;
pub mod types;

pub use args::{Cli, Commands, ConfigCommand};
pub use commands::run;
