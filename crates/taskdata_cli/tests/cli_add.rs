use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdata-{nanos}-{name}"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskdata"))
        .args(args)
        .env("TASKDATA_DIR", data_dir)
        .env("TASKDATA_CONFIG_PATH", data_dir.join("no-config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run taskdata")
}

fn next_year_date() -> String {
    format!("{}-03-01", OffsetDateTime::now_utc().year() + 1)
}

#[test]
fn add_category_then_task_in_json() {
    let dir = temp_path("cli-add-json");

    let output = run(&dir, &["--json", "add-category", "Work", "--color", "ff8800"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let category: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(category["id"], 1);
    assert_eq!(category["color"], "#FF8800");

    let due = next_year_date();
    let output = run(
        &dir,
        &[
            "--json", "add-task", "Write report", "--due", &due, "--priority", "high",
            "--category", "1", "--tag", "q1", "--tag", "docs",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task["id"], 1);
    assert_eq!(task["priority"], "HIGH");
    assert_eq!(task["category"], "Work");
    assert_eq!(task["tags"], serde_json::json!(["q1", "docs"]));
    assert_eq!(task["due_date"], format!("{due} 00:00:00"));

    let stored = std::fs::read_to_string(dir.join("tasks.json")).unwrap();
    assert!(stored.contains("\"categoryId\": 1,"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn add_recurring_task_in_csv() {
    let dir = temp_path("cli-add-csv");

    let output = run(
        &dir,
        &[
            "--format", "csv", "add-task", "Standup", "--repeat", "weekly", "--days",
            "MONDAY,THURSDAY",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added task: Standup (1)"));

    let stored = std::fs::read_to_string(dir.join("tasks.csv")).unwrap();
    let row = stored.lines().nth(1).unwrap();
    assert!(row.starts_with("1,Standup,"));
    assert!(row.contains(",WEEKLY,1,MONDAY;THURSDAY,0,"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn add_task_rejects_unknown_category() {
    let dir = temp_path("cli-add-missing-category");

    let output = run(&dir, &["add-task", "Orphan", "--category", "7"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - category 7 not found"), "{stderr}");
    assert!(!dir.join("tasks.json").exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn second_save_leaves_a_backup() {
    let dir = temp_path("cli-add-backup");

    assert!(run(&dir, &["add-task", "first"]).status.success());
    assert!(!dir.join("tasks.json.bak").exists());
    assert!(run(&dir, &["add-task", "second"]).status.success());

    let backup = std::fs::read_to_string(dir.join("tasks.json.bak")).unwrap();
    assert!(backup.contains("\"first\""));
    assert!(!backup.contains("\"second\""));
    assert!(!dir.join("tasks.json.tmp").exists());
    std::fs::remove_dir_all(&dir).ok();
}
