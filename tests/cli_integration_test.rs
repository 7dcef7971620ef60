// Integration tests for the gameshell binary
// Runs the built executable against plugin roots in temp directories

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

fn write_manifest(root: &Path, name: &str, enabled: bool, depends: &[&str]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.yaml"),
        format!(
            "name: {}\nmodule: builtin.{}\nenabled: {}\ndepends: [{}]\n",
            name,
            name,
            enabled,
            depends.join(", ")
        ),
    )
    .unwrap();
}

/// A plugin root with the three built-ins plus an empty config file
fn shell_fixture(calendar_enabled: bool) -> TempDir {
    let temp_dir = tempdir().unwrap();
    let plugins = temp_dir.path().join("plugins");
    write_manifest(&plugins, "daytime", true, &[]);
    write_manifest(&plugins, "calendar", calendar_enabled, &["daytime"]);
    write_manifest(&plugins, "fps_display", true, &[]);
    fs::write(temp_dir.path().join("gameshell.toml"), "").unwrap();
    temp_dir
}

fn gameshell(fixture: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gameshell"))
        .arg("--config-file")
        .arg(fixture.path().join("gameshell.toml"))
        .arg("--plugins-dir")
        .arg(fixture.path().join("plugins"))
        .arg("--no-color")
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute gameshell")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_run_prints_final_overlay() {
    let fixture = shell_fixture(true);
    let output = gameshell(&fixture, &["-q", "run", "--frames", "8", "--fps", "4"]);

    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines, vec!["FPS: 4", "Time: Afternoon", "Day: 1", "Weekday: Monday"]);
}

#[test]
fn test_plugins_list_shows_every_plugin() {
    let fixture = shell_fixture(false);
    let output = gameshell(&fixture, &["-q", "plugins", "list"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("NAME"));
    assert!(text.lines().any(|l| l.contains("calendar") && l.trim_end().ends_with("disabled")));
    assert!(text.lines().any(|l| l.contains("builtin.fps_display") && l.trim_end().ends_with("enabled")));
}

#[test]
fn test_plugins_enable_persists_to_manifest() {
    let fixture = shell_fixture(false);
    let output = gameshell(&fixture, &["-q", "plugins", "enable", "calendar"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Enabled plugin 'calendar'"));

    let manifest = fs::read_to_string(fixture.path().join("plugins/calendar/plugin.yaml")).unwrap();
    assert!(manifest.contains("enabled: true"));
}

#[test]
fn test_plugins_disable_cascades() {
    let fixture = shell_fixture(true);
    let output = gameshell(&fixture, &["-q", "plugins", "disable", "daytime"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Disabled plugin 'calendar'"));
    assert!(text.contains("Disabled plugin 'daytime'"));
}

#[test]
fn test_unknown_plugin_fails() {
    let fixture = shell_fixture(true);
    let output = gameshell(&fixture, &["-q", "plugins", "enable", "weather"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Unknown plugin 'weather'"));
}

#[test]
fn test_missing_plugins_dir_still_runs() {
    let fixture = tempdir().unwrap();
    fs::write(fixture.path().join("gameshell.toml"), "").unwrap();
    let output = gameshell(&fixture, &["-q", "run", "--frames", "1"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_conflicting_log_flags_fail() {
    let fixture = shell_fixture(true);
    let output = gameshell(&fixture, &["-v", "-q", "plugins", "list"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Conflicting log level flags"));
}

#[test]
fn test_log_file_receives_records() {
    let fixture = shell_fixture(true);
    let log_path = fixture.path().join("shell.log");
    let output = gameshell(
        &fixture,
        &[
            "-q",
            "--log-file",
            log_path.to_str().unwrap(),
            "--log-file-level",
            "info",
            "run",
            "--frames",
            "1",
        ],
    );

    assert!(output.status.success());
    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.lines().any(|l| l.contains("[INFO]") && l.contains("Running 1 frames at")));
}
