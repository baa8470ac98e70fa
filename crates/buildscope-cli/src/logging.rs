use crate::types::LogLevel;

/// Route library `log` output to stderr.
///
/// `RUST_LOG` takes precedence over `--log-level`.
pub fn init(level: LogLevel) {
    let env = env_logger::Env::default().default_filter_or(level.to_string());
    // A second init (e.g. in tests) keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
