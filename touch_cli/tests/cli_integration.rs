use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

// Default timing spelled out so the cases below do not depend on defaults
fn write_valid_config(dir: &Path) -> PathBuf {
    let toml = r#"
[decoder]
channels = 12

[timing]
min_release_ms = 30
short_press_ms = 300
long_press_ms = 300
max_idle_short_ms = 500
max_idle_long_ms = 1000

[sensor]
i2c_bus = 1
i2c_address = "0x5A"
poll_hz = 100
stall_ms = 1000

[report]
topic_prefix = "wled"
"#;
    let path = dir.join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

// Short press on channel 0, long press on channel 3
fn write_trace(dir: &Path) -> PathBuf {
    let path = dir.join("trace.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "time_ms,mask").unwrap();
    writeln!(f, "0,0x1").unwrap();
    writeln!(f, "100,0").unwrap();
    writeln!(f, "1000,0b1000").unwrap();
    writeln!(f, "1400,0").unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["replay", "@trace", "--settle"], 0, "wled/touch/0 short duration_ms=100", "stdout")]
#[case(&["replay", "@trace", "--settle"], 0, "wled/touch/3 long", "stdout")]
#[case(&["replay", "@trace"], 0, "replay complete: 4 samples, 1 gestures", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["health"], 0, "health: ok", "stdout")]
#[case(&["run", "--max-run-ms", "300"], 0, "run stopped (max_runtime)", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());
    let trace = write_trace(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();

    // Always include a valid config to avoid relying on defaults
    cmd.arg("--config").arg(&cfg);

    for a in args {
        if *a == "@trace" {
            cmd.arg(&trace);
        } else {
            cmd.arg(a);
        }
    }

    let assert = cmd.assert().code(exit_code);

    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn live_run_reports_scripted_short_press() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.env("TOUCH_TEST_SIM_SCRIPT", "0:0x1,100:0")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--max-run-ms")
        .arg("1500");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("wled/touch/0 short duration_ms="))
        .stdout(predicate::str::contains("1 gestures"));
}

#[rstest]
fn cli_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());

    let bad_csv = dir.path().join("trace.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "t,value").unwrap();
    writeln!(f, "0,1").unwrap();

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("replay").arg(&bad_csv);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
#[case("[decoder]\nchannels = 40\n")]
#[case("[sensor]\npoll_hz = 0\n")]
#[case("[report]\ntopic_prefix = \"wled/\"\n")]
#[case("[decoder\n")]
fn invalid_config_exits_with_config_code(#[case] toml: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, toml).unwrap();

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("health");

    cmd.assert()
        .code(5)
        .stderr(predicate::str::contains("What happened: Invalid configuration"));
}

#[rstest]
fn missing_config_file_is_reported() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("health");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Could not read an input file"));
}

#[rstest]
fn each_trace_starts_from_idle() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());
    let trace = write_trace(dir.path());

    // Without a reset, the pending long press on channel 3 would pair with
    // the second trace's hold into a double_long.
    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg(&trace)
        .arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("replay complete: 8 samples, 2 gestures"))
        .stdout(predicate::str::contains("double_long").not());
}

#[rstest]
#[case::flag(false, &["--edges"])]
#[case::config(true, &[])]
fn release_edges_are_reported_when_enabled(#[case] in_config: bool, #[case] flags: &[&str]) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());
    if in_config {
        let mut f = fs::OpenOptions::new().append(true).open(&cfg).unwrap();
        writeln!(f, "edges = true").unwrap();
    }
    let trace = write_trace(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config").arg(&cfg).args(flags);
    cmd.arg("replay").arg(&trace).arg("--settle");

    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        &lines[..4],
        &[
            "wled/touch/0 released",
            "wled/touch/0 short duration_ms=100",
            "wled/touch/3 released",
            "wled/touch/3 long",
        ]
    );
}

#[rstest]
fn release_edges_are_off_by_default() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(dir.path());
    let trace = write_trace(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("replay").arg(&trace).arg("--settle");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("released").not());
}

fn write_debug_logging_config(dir: &Path) -> PathBuf {
    let cfg = write_valid_config(dir);
    let mut f = fs::OpenOptions::new().append(true).open(&cfg).unwrap();
    writeln!(f, "\n[logging]\nlevel = \"debug\"").unwrap();
    cfg
}

#[rstest]
fn explicit_log_level_overrides_config_level() {
    let dir = tempdir().unwrap();
    let cfg = write_debug_logging_config(dir.path());
    let trace = write_trace(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .args(["--log-level", "info", "replay"])
        .arg(&trace)
        .arg("--settle");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("replay start"))
        .stderr(predicate::str::contains("DEBUG").not());
}

#[rstest]
fn config_log_level_applies_without_flag() {
    let dir = tempdir().unwrap();
    let cfg = write_debug_logging_config(dir.path());
    let trace = write_trace(dir.path());

    let mut cmd = Command::cargo_bin("touch_cli").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg(&trace);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"));
}
