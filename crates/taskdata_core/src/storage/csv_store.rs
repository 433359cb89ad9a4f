use super::durable::{ensure_folder, load_records, save_records};
use super::{DataFormat, Repository, csv_codec};
use crate::error::AppError;
use crate::model::{Category, Task};
use std::path::{Path, PathBuf};
use tracing::info;

/// CSV files in one folder.
///
/// Unlike [`super::JsonRepository`] this takes no lock: keep a single writer
/// per folder.
#[derive(Debug)]
pub struct CsvRepository {
    tasks_path: PathBuf,
    categories_path: PathBuf,
}

impl CsvRepository {
    pub fn new(folder: impl AsRef<Path>) -> Result<Self, AppError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        info!(folder = %folder.display(), "csv repository ready");
        Ok(Self {
            tasks_path: DataFormat::Csv.tasks_path(folder),
            categories_path: DataFormat::Csv.categories_path(folder),
        })
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }
}

impl Repository for CsvRepository {
    fn save_tasks(&self, tasks: &[Task]) -> bool {
        save_records(&self.tasks_path, "task", tasks, csv_codec::encode_tasks)
    }

    fn load_tasks(&self) -> Vec<Task> {
        load_records(&self.tasks_path, "task", csv_codec::decode_tasks)
    }

    fn save_categories(&self, categories: &[Category]) -> bool {
        save_records(&self.categories_path, "category", categories, csv_codec::encode_categories)
    }

    fn load_categories(&self) -> Vec<Category> {
        load_records(&self.categories_path, "category", csv_codec::decode_categories)
    }
}
