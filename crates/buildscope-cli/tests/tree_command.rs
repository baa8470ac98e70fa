//! `buildscope tree` Tests
//!
//! Runs the binary against record files written into an isolated TestWorld.

use anyhow::Result;
use assert_cmd::cargo::cargo_bin_cmd;
use buildscope_testing::{EventStreamBuilder, TestWorld};
use buildscope_types::EventContext;
use predicates::prelude::*;

fn simple_build() -> EventStreamBuilder {
    EventStreamBuilder::new()
        .build_started()
        .project_started(1, "App.csproj")
        .target_started(1, 1, "Build")
        .task_started(1, 1, 1, "Csc")
        .task_command_line(1, 1, 1, "csc.exe /out:App.dll Program.cs")
        .warning(EventContext::task(1, 1, 1), "Unused variable")
        .task_finished(1, 1, 1, "Csc", true)
        .target_finished(1, 1, "Build", true)
        .project_finished(1, true)
        .build_finished(true)
}

const SIMPLE_OUTLINE: &str = "\
Build succeeded [900 ms]
  App.csproj [700 ms]
    Build [500 ms]
      Csc [300 ms]
        warning: Unused variable
";

#[test]
fn test_tree_prints_outline() -> Result<()> {
    // Given: a complete build log
    let world = TestWorld::new();
    let log = world.write_log("build.jsonl", &simple_build())?;

    // When: rendering it as plain text
    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).arg("tree").arg(&log);

    // Then: the outline is printed uncolored
    cmd.assert().success().stdout(SIMPLE_OUTLINE);
    Ok(())
}

#[test]
fn test_tree_reads_stdin() -> Result<()> {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["tree", "-"])
        .write_stdin(simple_build().to_jsonl());

    cmd.assert().success().stdout(SIMPLE_OUTLINE);
    Ok(())
}

#[test]
fn test_tree_json_is_nested() -> Result<()> {
    let world = TestWorld::new();
    let log = world.write_log("build.jsonl", &simple_build())?;

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["--format", "json", "tree"])
        .arg(&log);
    let output = cmd.output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["kind"], "build");
    assert_eq!(json["title"], "Build succeeded");

    let project = &json["children"][0];
    assert_eq!(project["kind"], "project");
    assert_eq!(project["title"], "App.csproj");

    let task = &project["children"][0]["children"][0];
    assert_eq!(task["title"], "Csc");
    assert_eq!(task["children"][0]["kind"], "warning");
    Ok(())
}

#[test]
fn test_unknown_records_are_summarized() -> Result<()> {
    // Given: a log with a record kind this reader does not know
    let world = TestWorld::new();
    let stream = simple_build().unknown_record("future_record");
    let log = world.write_log("future.jsonl", &stream)?;

    // When: using the default policy
    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).arg("tree").arg(&log);

    // Then: the build opens and reports the skipped record once
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("App.csproj"))
        .stdout(predicate::str::contains("Skipped 1 record"));
    Ok(())
}

#[test]
fn test_unknown_records_can_abort() -> Result<()> {
    let world = TestWorld::new();
    let stream = simple_build().unknown_record("future_record");
    let log = world.write_log("future.jsonl", &stream)?;

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["tree", "--unknown-data", "throw-exception"])
        .arg(&log);

    cmd.assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
    Ok(())
}

#[test]
fn test_config_policy_applies_to_tree() -> Result<()> {
    // Given: the settings file asks for silence on unknown data
    let world = TestWorld::new();
    world.write_config("unknown_data_behavior = \"ignore\"\n")?;
    let stream = simple_build().unknown_record("future_record");
    let log = world.write_log("future.jsonl", &stream)?;

    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).arg("tree").arg(&log);

    // Then: no summary node is added
    cmd.assert().success().stdout(SIMPLE_OUTLINE);
    Ok(())
}

#[test]
fn test_missing_file_fails() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["tree", "does-not-exist.jsonl"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.jsonl"));
}
