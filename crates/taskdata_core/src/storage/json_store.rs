use super::durable::{ensure_folder, load_records, save_records};
use super::{DataFormat, Repository, json_codec};
use crate::error::AppError;
use crate::model::{Category, Task};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::info;

/// Serializes access to structured-text files.
///
/// Clones share the same mutex. [`StoreLock::shared`] is the process-wide
/// instance every [`JsonRepository`] uses unless given another one.
#[derive(Debug, Clone, Default)]
pub struct StoreLock(Arc<Mutex<()>>);

impl StoreLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Self {
        static SHARED: OnceLock<StoreLock> = OnceLock::new();
        SHARED.get_or_init(StoreLock::new).clone()
    }

    /// The mutex guards no data, so a panic in another holder is ignored.
    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn same_as(&self, other: &StoreLock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug)]
pub struct JsonRepository {
    tasks_path: PathBuf,
    categories_path: PathBuf,
    lock: StoreLock,
}

impl JsonRepository {
    pub fn new(folder: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::with_lock(folder, StoreLock::shared())
    }

    pub fn with_lock(folder: impl AsRef<Path>, lock: StoreLock) -> Result<Self, AppError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        info!(folder = %folder.display(), "json repository ready");
        Ok(Self {
            tasks_path: DataFormat::Json.tasks_path(folder),
            categories_path: DataFormat::Json.categories_path(folder),
            lock,
        })
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn lock(&self) -> &StoreLock {
        &self.lock
    }
}

impl Repository for JsonRepository {
    fn save_tasks(&self, tasks: &[Task]) -> bool {
        let _guard = self.lock.acquire();
        save_records(&self.tasks_path, "task", tasks, json_codec::encode_tasks)
    }

    fn load_tasks(&self) -> Vec<Task> {
        let _guard = self.lock.acquire();
        load_records(&self.tasks_path, "task", json_codec::decode_tasks)
    }

    fn save_categories(&self, categories: &[Category]) -> bool {
        let _guard = self.lock.acquire();
        save_records(&self.categories_path, "category", categories, json_codec::encode_categories)
    }

    fn load_categories(&self) -> Vec<Category> {
        let _guard = self.lock.acquire();
        load_records(&self.categories_path, "category", json_codec::decode_categories)
    }
}
