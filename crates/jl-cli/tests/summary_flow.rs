//! End-to-end tests for the `jl` binary.
//!
//! Each test builds a throwaway graph with a journal file and a config file
//! pointing at it, then runs the binary against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const CLOCK: &str = "CLOCK: [2024-01-15 Mon 09:00:00]--[2024-01-15 Mon 09:10:00] =>  00:10:00";

fn jl_binary() -> String {
    env!("CARGO_BIN_EXE_jl").to_string()
}

/// Write a journal for 2024-01-15 and a config file; returns the config path.
fn setup(temp: &Path, journal: &str, extra_config: &str) -> PathBuf {
    let graph = temp.join("graph");
    std::fs::create_dir_all(graph.join("journals")).unwrap();
    std::fs::write(graph.join("journals/2024_01_15.md"), journal).unwrap();

    let config_path = temp.join("jl.toml");
    std::fs::write(
        &config_path,
        format!("graph_path = \"{}\"\n{extra_config}", graph.display()),
    )
    .unwrap();
    config_path
}

fn run_jl(temp: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(jl_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env_remove("JL_GRAPH_PATH")
        .env_remove("JL_TARGET_DURATION")
        .env_remove("JL_SWITCHING_COST")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run jl")
}

fn journal() -> String {
    [
        "- LATER ABC-9 General admin [CATCH-ALL]".to_string(),
        format!("\t{CLOCK}"),
        "- LATER ABC-1 First".to_string(),
        format!("\t{CLOCK}"),
        "- LATER ABC-2 Second".to_string(),
        "\ttime:: 10m".to_string(),
    ]
    .join("\n")
}

#[test]
fn test_summary_for_date() {
    let temp = TempDir::new().unwrap();
    let config = setup(
        temp.path(),
        &journal(),
        "target_duration = 60\nswitching_cost = \"5\"\n",
    );

    let output = run_jl(temp.path(), &config, &["summary", "--date", "2024-01-15"]);
    assert!(
        output.status.success(),
        "jl summary should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("JOURNAL: Monday, Jan 15, 2024"), "{stdout}");
    assert!(stdout.contains("Tasks found:      3"), "{stdout}");
    assert!(stdout.contains("Switching cost:   10m"), "{stdout}");
    assert!(
        stdout.contains("Total duration:   40m (including switching cost)"),
        "{stdout}"
    );
    assert!(stdout.contains("Slack time:       20m"), "{stdout}");
    assert!(!stdout.contains("PROBLEMS"), "{stdout}");
}

#[test]
fn test_summary_json() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), &journal(), "switching_cost = \"5\"\n");

    let output = run_jl(
        temp.path(),
        &config,
        &["summary", "--date", "2024-01-15", "--json"],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_duration"], 2400);
    assert_eq!(value["switching_cost"], 600);
    assert_eq!(value["target_duration"], 8 * 3600);
    assert_eq!(value["problems"].as_array().unwrap().len(), 0);
}

#[test]
fn test_worklog_lists_tasks() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), &journal(), "");

    let output = run_jl(temp.path(), &config, &["worklog", "--date", "2024-01-15"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("have problems"), "{stdout}");
    let task_lines: Vec<_> = stdout.lines().filter(|line| line.contains("ABC-")).collect();
    assert_eq!(task_lines.len(), 3);
    assert!(task_lines[1].contains("ABC-1") && task_lines[1].contains("10m"));
    assert!(task_lines[2].contains("ABC-2") && task_lines[2].contains("Second"));
}

#[test]
fn test_catch_all_without_own_time_is_reported() {
    let temp = TempDir::new().unwrap();
    let clock = format!("\t{CLOCK}");
    let lines: [&str; 3] = ["- LATER ABC-9 Admin [CATCH-ALL]", "- LATER ABC-1 First", &clock];
    let config = setup(temp.path(), &lines.join("\n"), "switching_cost = \"5\"\n");

    let output = run_jl(temp.path(), &config, &["summary", "--date", "2024-01-15"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("[ERROR] LATER ABC-9 Admin [CATCH-ALL]: No duration recorded. [duration]"),
        "{stdout}"
    );
    assert!(
        stdout.contains("Total duration:   15m (including switching cost)"),
        "{stdout}"
    );
}

#[test]
fn test_missing_journal_fails() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), &journal(), "");

    let output = run_jl(temp.path(), &config, &["summary", "--date", "2024-01-16"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No journal found for 2024-01-16"), "{stderr}");
}

#[test]
fn test_invalid_switching_cost_fails() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path(), &journal(), "switching_cost = \"10-1\"\n");

    let output = run_jl(temp.path(), &config, &["summary", "--date", "2024-01-15"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "{stderr}");
}
