//! Field-level decoding shared by both file formats.
//!
//! Each codec pulls raw strings out of its own syntax into a [`TaskFields`] /
//! [`CategoryFields`]; turning those into entities happens here so the two
//! formats agree on defaults and on what counts as a broken record.

use crate::error::AppError;
use crate::model::{Category, DayOfWeek, RecurrencePattern, Task};
use crate::timefmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Default)]
pub(crate) struct TaskFields {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: String,
    pub priority: String,
    pub status: String,
    pub category_id: Option<u32>,
    pub recurrence: Option<RecurrencePattern>,
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct CategoryFields {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskFields {
    pub fn into_task(self) -> Result<Task, AppError> {
        let created_at = timefmt::parse_optional(&self.created_at)?;
        let updated_at = timefmt::parse_optional(&self.updated_at)?;
        let completed_at = timefmt::parse_optional(&self.completed_at)?;
        // A task without a stored due date is due when it was created.
        let due_date = timefmt::parse_optional(&self.due_date)?
            .or(created_at)
            .unwrap_or_else(timefmt::now);

        let mut task = Task::new(
            self.title,
            self.description,
            due_date,
            enum_or_default(&self.priority)?,
        )?;
        task.set_id(self.id);
        task.set_status(enum_or_default(&self.status)?);
        task.set_category_id(self.category_id);
        task.set_recurrence(self.recurrence);
        task.set_tags(self.tags);

        let created_at = created_at.unwrap_or(task.created_at());
        let updated_at = updated_at.unwrap_or(created_at);
        task.restore_timestamps(created_at, updated_at, completed_at);
        Ok(task)
    }
}

impl CategoryFields {
    pub fn into_category(self) -> Result<Category, AppError> {
        let created_at = timefmt::parse_optional(&self.created_at)?;
        let updated_at = timefmt::parse_optional(&self.updated_at)?;

        let mut category = Category::new(self.name, self.description, self.color)?;
        category.set_id(self.id);

        let created_at = created_at.unwrap_or(category.created_at());
        category.restore_timestamps(created_at, updated_at.unwrap_or(created_at));
        Ok(category)
    }
}

/// Empty means "use the default"; anything else has to be a known token.
pub(crate) fn enum_or_default<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = AppError> + Default,
{
    if raw.trim().is_empty() {
        Ok(T::default())
    } else {
        raw.parse::<T>()
            .map_err(|err| AppError::invalid_data(err.message()))
    }
}

/// Unknown day names are logged and dropped instead of failing the record.
pub(crate) fn parse_days<'a, I>(names: I) -> Vec<DayOfWeek>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<DayOfWeek>() {
            Ok(day) => Some(day),
            Err(_) => {
                warn!(day = name, "ignoring invalid day of week");
                None
            }
        })
        .collect()
}

pub(crate) fn parse_id(raw: &str, column: &str) -> Result<u32, AppError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AppError::invalid_data(format!("invalid {column} '{raw}'")))
}
