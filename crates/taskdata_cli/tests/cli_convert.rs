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

#[test]
fn convert_json_to_csv_and_back() {
    let dir = temp_path("cli-convert");
    assert!(run(&dir, &["add-category", "Errands"]).status.success());
    assert!(
        run(&dir, &["add-task", "Buy \"good\" coffee, beans", "--category", "1", "--tag", "shop"])
            .status
            .success()
    );

    let output = run(&dir, &["convert", "--from", "json", "--to", "csv"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("Converted 1 tasks and 1 categories from JSON to CSV"));

    let csv = std::fs::read_to_string(dir.join("tasks.csv")).unwrap();
    assert!(csv.contains("\"Buy \"\"good\"\" coffee, beans\""));
    assert!(csv.contains(",1,NONE,0,,0,,shop"));

    let back = temp_path("cli-convert-back");
    let output = run(
        &dir,
        &["--json", "convert", "--from", "csv", "--to", "json", "--target-dir", back.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let listed = run(&back, &["list", "tasks", "--json"]);
    let tasks: serde_json::Value = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(tasks[0]["title"], "Buy \"good\" coffee, beans");
    assert_eq!(tasks[0]["category"], "Errands");

    std::fs::remove_dir_all(&dir).ok();
    std::fs::remove_dir_all(&back).ok();
}

#[test]
fn convert_into_the_same_files_is_rejected() {
    let dir = temp_path("cli-convert-same");
    let output = run(&dir, &["convert", "--from", "csv", "--to", "CSV"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
    std::fs::remove_dir_all(&dir).ok();
}
