//! Whole-file replacement with a backup of the previous version.
//!
//! A save copies the current file to `<file>.bak`, writes `<file>.tmp` and
//! renames it over the destination, so a crash mid-write leaves either the
//! old or the new content in place.

use crate::error::AppError;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const BACKUP_SUFFIX: &str = ".bak";
pub const TEMP_SUFFIX: &str = ".tmp";

pub fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn io_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::io(format!("{}: {err}", path.display()))
}

pub fn ensure_folder(folder: &Path) -> Result<(), AppError> {
    fs::create_dir_all(folder).map_err(|err| {
        error!(folder = %folder.display(), error = %err, "failed to create data folder");
        io_error(folder, err)
    })
}

pub fn write_atomically(path: &Path, content: &str) -> Result<(), AppError> {
    if path.exists() {
        let backup = sidecar_path(path, BACKUP_SUFFIX);
        fs::copy(path, &backup).map_err(|err| io_error(&backup, err))?;
        debug!(backup = %backup.display(), "backed up previous version");
    }

    let temp = sidecar_path(path, TEMP_SUFFIX);
    fs::write(&temp, content).map_err(|err| io_error(&temp, err))?;
    fs::rename(&temp, path).map_err(|err| io_error(path, err))
}

/// `Ok(None)` when there is no file yet.
pub fn read_existing(path: &Path) -> Result<Option<String>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|err| io_error(path, err))
}

/// Encodes and writes `items`; failures are logged and reported as `false`.
pub(crate) fn save_records<T>(
    path: &Path,
    kind: &str,
    items: &[T],
    encode: fn(&[T]) -> Result<String, AppError>,
) -> bool {
    match encode(items).and_then(|content| write_atomically(path, &content)) {
        Ok(()) => {
            info!(path = %path.display(), kind, count = items.len(), "saved records");
            true
        }
        Err(err) => {
            error!(path = %path.display(), kind, error = %err, "failed to save records");
            false
        }
    }
}

/// Reads and decodes `path`; a missing or unreadable file yields nothing.
pub(crate) fn load_records<T>(path: &Path, kind: &str, decode: fn(&str) -> Vec<T>) -> Vec<T> {
    match read_existing(path) {
        Ok(Some(content)) => {
            let items = decode(&content);
            info!(path = %path.display(), kind, count = items.len(), "loaded records");
            items
        }
        Ok(None) => {
            info!(path = %path.display(), kind, "no data file found");
            Vec::new()
        }
        Err(err) => {
            error!(path = %path.display(), kind, error = %err, "failed to load records");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_utils::capture_logs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("taskdata-durable-{nanos}-{name}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn first_write_has_no_backup() {
        let dir = temp_dir("first");
        let path = dir.join("tasks.json");

        write_atomically(&path, "one").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
        assert!(!sidecar_path(&path, BACKUP_SUFFIX).exists());
        assert!(!sidecar_path(&path, TEMP_SUFFIX).exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn second_write_backs_up_previous_content() {
        let dir = temp_dir("second");
        let path = dir.join("tasks.json");

        write_atomically(&path, "one").unwrap();
        write_atomically(&path, "two").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        assert_eq!(fs::read_to_string(sidecar_path(&path, BACKUP_SUFFIX)).unwrap(), "one");
        assert!(!sidecar_path(&path, TEMP_SUFFIX).exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn read_existing_distinguishes_missing_files() {
        let dir = temp_dir("read");
        let path = dir.join("categories.json");
        assert_eq!(read_existing(&path).unwrap(), None);

        fs::write(&path, "").unwrap();
        assert_eq!(read_existing(&path).unwrap(), Some(String::new()));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_into_missing_folder_reports_false() {
        let (logs, _guard) = capture_logs();
        let dir = temp_dir("gone");
        let path = dir.join("nested").join("tasks.json");

        let saved = save_records(&path, "task", &["x"], |items| Ok(items.join(",")));

        assert!(!saved);
        assert!(logs.has_event(tracing::Level::ERROR, "failed to save"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn ensure_folder_fails_on_a_file() {
        let dir = temp_dir("file");
        let blocker = dir.join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = ensure_folder(&blocker.join("data")).unwrap_err();
        assert_eq!(err.code(), "io_error");
        fs::remove_dir_all(&dir).ok();
    }
}
