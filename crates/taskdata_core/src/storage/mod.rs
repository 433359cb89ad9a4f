//! Persistence of tasks and categories.
//!
//! [`Repository`] is the one interface callers see. Two file formats sit
//! behind it and [`create_repository`] picks one from a [`DataFormat`].

pub mod csv_codec;
mod csv_store;
pub mod durable;
pub mod json_codec;
mod json_store;
mod record;

pub use csv_store::CsvRepository;
pub use json_store::{JsonRepository, StoreLock};

use crate::error::AppError;
use crate::model::{Category, Task};
use crate::text::canonical_token;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_DATA_FOLDER: &str = "data";
pub const TASKS_FILE: &str = "tasks.json";
pub const CATEGORIES_FILE: &str = "categories.json";

/// Saves and loads whole collections.
///
/// `save_*` replaces the stored collection and reports success; details of a
/// failure go to the log. `load_*` never fails: a missing file is an empty
/// collection and unreadable records are skipped.
pub trait Repository: Send + Sync {
    fn save_tasks(&self, tasks: &[Task]) -> bool;
    fn load_tasks(&self) -> Vec<Task>;
    fn save_categories(&self, categories: &[Category]) -> bool;
    fn load_categories(&self) -> Vec<Category>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Json,
    Csv,
}

impl DataFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn tasks_path(self, folder: &Path) -> PathBuf {
        folder.join(TASKS_FILE).with_extension(self.extension())
    }

    pub fn categories_path(self, folder: &Path) -> PathBuf {
        folder.join(CATEGORIES_FILE).with_extension(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_token(s).as_str() {
            "JSON" => Ok(Self::Json),
            "CSV" => Ok(Self::Csv),
            _ => Err(AppError::invalid_input(format!(
                "unsupported data format '{s}'. Valid options are: JSON, CSV"
            ))),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the repository for `format` on `folder`, creating the folder.
pub fn create_repository(
    format: DataFormat,
    folder: impl AsRef<Path>,
) -> Result<Box<dyn Repository>, AppError> {
    let folder = folder.as_ref();
    Ok(match format {
        DataFormat::Json => Box::new(JsonRepository::new(folder)?),
        DataFormat::Csv => Box::new(CsvRepository::new(folder)?),
    })
}

/// Same as [`create_repository`] with a format token such as `"csv"`.
pub fn create_repository_named(
    format: &str,
    folder: impl AsRef<Path>,
) -> Result<Box<dyn Repository>, AppError> {
    create_repository(format.parse()?, folder)
}

pub fn create_default_repository() -> Result<Box<dyn Repository>, AppError> {
    create_repository(DataFormat::Json, DEFAULT_DATA_FOLDER)
}
