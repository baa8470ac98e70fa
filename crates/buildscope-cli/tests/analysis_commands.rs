//! `explain`, `diff` and `config` Tests

use anyhow::Result;
use assert_cmd::cargo::cargo_bin_cmd;
use buildscope_testing::TestWorld;
use predicates::prelude::*;

#[test]
fn test_explain_evaluates_condition() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["explain", "'a' == 'b' or true"]);

    cmd.assert()
        .success()
        .stdout("'a' == 'b' or true\n=> true\n");
}

#[test]
fn test_explain_with_evaluated_form() -> Result<()> {
    // Given: a condition and its property-substituted form
    let world = TestWorld::new();

    // When: explaining it as JSON
    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).args([
        "--format",
        "json",
        "explain",
        "'$(Configuration)' == 'Debug'",
        "'Release' == 'Debug'",
    ]);
    let output = cmd.output()?;
    assert!(output.status.success());

    // Then: literals carry both forms and the verdict follows the evaluated side
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["result"], false);
    assert!(
        json["rendered"]
            .as_str()
            .is_some_and(|text| text.contains("'$(Configuration)' ➔ 'Release'"))
    );
    Ok(())
}

#[test]
fn test_explain_rejects_mismatched_forms() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["explain", "'$(A)' == 'x' and '$(B)' == 'y'", "'x' == 'x'"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_diff_lists_differences() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["diff", "cl.exe -O2 /c a.c", "cl.exe -O3 /c a.c"]);

    cmd.assert()
        .success()
        .stdout("program: cl.exe\n- -O2\n+ -O3\n2 matched, 1 only left, 1 only right\n");
}

#[test]
fn test_diff_requires_both_sides() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["diff", "cl.exe /c a.c", "  "]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to compare"));
}

#[test]
fn test_config_init_then_show() -> Result<()> {
    // Given: no settings file yet
    let world = TestWorld::new();
    assert!(!world.config_path().exists());

    // When: initializing it
    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).args(["config", "init"]);
    cmd.assert().success().stdout(predicate::str::starts_with("Wrote"));

    // Then: the file holds the defaults and show reads them back
    assert!(world.config_path().exists());

    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).args(["config", "show"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("unknown_data_behavior = \"warning\""))
        .stdout(predicate::str::contains("intern_strings = true"))
        .stdout(predicate::str::contains("not found").not());
    Ok(())
}

#[test]
fn test_config_init_keeps_existing_file() -> Result<()> {
    let world = TestWorld::new();
    world.write_config("intern_strings = false\n")?;

    let mut cmd = cargo_bin_cmd!("buildscope");
    world.configure_command(&mut cmd).args(["config", "init"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    let content = std::fs::read_to_string(world.config_path())?;
    assert_eq!(content, "intern_strings = false\n");

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["config", "init", "--force"]);
    cmd.assert().success();
    Ok(())
}

#[test]
fn test_explicit_config_flag_wins() -> Result<()> {
    let world = TestWorld::new();
    let other = world.write_file("other.toml", "color = \"never\"\n")?;

    let mut cmd = cargo_bin_cmd!("buildscope");
    world
        .configure_command(&mut cmd)
        .args(["--format", "json", "config", "show", "--config"])
        .arg(&other);
    let output = cmd.output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["exists"], true);
    assert_eq!(json["settings"]["color"], "never");
    Ok(())
}
