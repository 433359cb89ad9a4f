use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

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

const TWO_TASKS: &str = r#"[
  {
    "id": 1,
    "title": "Water plants",
    "description": "",
    "dueDate": "2030-01-01 08:00:00",
    "createdAt": "2025-01-01 08:00:00",
    "updatedAt": "2025-01-01 08:00:00",
    "completedAt": "",
    "priority": "LOW",
    "status": "PENDING",
    "categoryId": 2,
    "recurrence": {
      "type": "DAILY",
      "interval": 1,
      "daysOfWeek": [],
      "occurrenceCount": 0,
      "endDate": ""
    },
    "tags": ["tag1", "tag2"]
  },
  {
    "id": 2,
    "title": "Call the bank",
    "description": "",
    "dueDate": "2030-01-02 09:00:00",
    "createdAt": "2025-01-01 08:00:00",
    "updatedAt": "2025-01-01 08:00:00",
    "completedAt": "",
    "priority": "HIGH",
    "status": "IN_PROGRESS",
    "categoryId": null,
    "recurrence": null,
    "tags": []
  }
]"#;

const ONE_CATEGORY: &str = r##"[
  {
    "id": 2,
    "name": "Home",
    "description": "",
    "color": "#00AA00",
    "createdAt": "2025-01-01 08:00:00",
    "updatedAt": "2025-01-01 08:00:00"
  }
]"##;

fn seed(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("tasks.json"), TWO_TASKS).unwrap();
    std::fs::write(dir.join("categories.json"), ONE_CATEGORY).unwrap();
}

#[test]
fn list_tasks_json_resolves_categories() {
    let dir = temp_path("cli-list-json");
    seed(&dir);

    let output = run(&dir, &["list", "tasks", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(tasks[0]["id"], 1);
    assert_eq!(tasks[0]["category"], "Home");
    assert_eq!(tasks[0]["recurrence"]["type"], "DAILY");
    assert_eq!(tasks[0]["tags"], serde_json::json!(["tag1", "tag2"]));
    assert_eq!(tasks[1]["status"], "IN_PROGRESS");
    assert!(tasks[1]["category_id"].is_null());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn list_tasks_plain_text_table() {
    let dir = temp_path("cli-list-plain");
    seed(&dir);

    let output = run(&dir, &["list", "tasks"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Water plants"));
    assert!(stdout.contains("Call the bank"));
    assert!(stdout.contains("DAILY x1"));
    assert!(stdout.contains("tag1, tag2"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn list_skips_a_corrupt_record() {
    let dir = temp_path("cli-list-corrupt");
    seed(&dir);
    let broken = TWO_TASKS.replacen("\"id\": 2,", "\"id\": two,", 1);
    std::fs::write(dir.join("tasks.json"), broken).unwrap();

    let output = run(&dir, &["list", "tasks", "--json"]);
    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "Water plants");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn list_categories_and_empty_folder() {
    let dir = temp_path("cli-list-categories");
    seed(&dir);

    let output = run(&dir, &["list", "categories"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Home"));
    assert!(stdout.contains("#00AA00"));

    let empty = temp_path("cli-list-empty");
    let output = run(&empty, &["list", "tasks"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No tasks."));
    assert!(empty.is_dir());

    std::fs::remove_dir_all(&dir).ok();
    std::fs::remove_dir_all(&empty).ok();
}
