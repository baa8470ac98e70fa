//! Fixtures for record files and isolated CLI environments.

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::builder::EventStreamBuilder;

/// Write a record stream as JSON Lines
pub fn write_jsonl(path: &Path, stream: &EventStreamBuilder) -> Result<()> {
    fs::write(path, stream.to_jsonl())?;
    Ok(())
}

/// Isolated temporary directory for CLI tests.
///
/// Configuration lookups are pinned inside the directory so the user's own
/// config file never leaks into a test.
pub struct TestWorld {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        Self {
            temp_dir,
            config_path,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Write `stream` to `name` inside the world and return its path
    pub fn write_log(&self, name: &str, stream: &EventStreamBuilder) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        write_jsonl(&path, stream)?;
        Ok(path)
    }

    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Point a command at this world's config and working directory.
    ///
    /// The caller provides the base command (e.g. from `cargo_bin_cmd!("buildscope")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.temp_dir.path())
            .env("BUILDSCOPE_CONFIG", &self.config_path)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
    }
}
