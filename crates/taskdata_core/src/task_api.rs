//! Operations the front end runs against a [`Repository`].
//!
//! Every mutating call loads the whole collection, changes it and saves it
//! back, so ids are assigned against what is on disk at that moment.

use crate::error::AppError;
use crate::ids::IdGenerator;
use crate::model::{Category, DayOfWeek, Priority, RecurrencePattern, RecurrenceType, Task};
use crate::report::ProductivityReport;
use crate::storage::Repository;
use crate::timefmt;
use crate::validation;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`; `None` means due now.
    pub due: Option<String>,
    pub priority: Priority,
    pub category_id: Option<u32>,
    pub tags: Vec<String>,
    pub recurrence: Option<NewRecurrence>,
}

#[derive(Debug, Clone)]
pub struct NewRecurrence {
    pub kind: RecurrenceType,
    pub interval: u32,
    pub days_of_week: Vec<DayOfWeek>,
    pub occurrence_count: u32,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub tasks: usize,
    pub categories: usize,
}

pub fn add_category(
    repository: &dyn Repository,
    name: &str,
    description: &str,
    color: &str,
) -> Result<Category, AppError> {
    let name = validation::sanitize_string(name);
    if !validation::validate_category_name(&name) {
        return Err(AppError::invalid_input(format!(
            "category name must be 1 to {} characters",
            validation::MAX_CATEGORY_NAME_LENGTH
        )));
    }
    if !validation::validate_category_description(description) {
        return Err(description_too_long());
    }
    let color = validation::sanitize_color(color);
    if !validation::validate_color(&color) {
        return Err(AppError::invalid_input(format!(
            "invalid color '{color}'. Use # followed by 3, 6 or 8 hex digits"
        )));
    }

    let mut categories = repository.load_categories();
    if categories
        .iter()
        .any(|existing| existing.name().eq_ignore_ascii_case(&name))
    {
        return Err(AppError::invalid_input(format!(
            "category '{name}' already exists"
        )));
    }

    let ids = IdGenerator::seeded_from(&[], &categories)?;
    let mut category = Category::new(name, description, color)?;
    category.set_id(ids.next_category_id()?);
    categories.push(category.clone());

    if !repository.save_categories(&categories) {
        return Err(AppError::io("failed to save categories"));
    }
    info!(id = category.id(), name = category.name(), "category added");
    Ok(category)
}

pub fn add_task(repository: &dyn Repository, new_task: NewTask) -> Result<Task, AppError> {
    let title = validation::sanitize_string(&new_task.title);
    if !validation::validate_task_title(&title) {
        return Err(AppError::invalid_input(format!(
            "title must be 1 to {} characters",
            validation::MAX_TASK_TITLE_LENGTH
        )));
    }
    if !validation::validate_task_description(&new_task.description) {
        return Err(description_too_long());
    }

    let due_date = match new_task.due.as_deref() {
        Some(raw) => {
            let due = parse_user_date(raw)?;
            if !validation::validate_due_date(due) {
                return Err(AppError::invalid_input("due date cannot be in the past"));
            }
            due
        }
        None => timefmt::now(),
    };
    let recurrence = new_task.recurrence.map(build_recurrence).transpose()?;

    let categories = repository.load_categories();
    let category = match new_task.category_id {
        Some(id) => Some(
            categories
                .iter()
                .find(|category| category.id() == id)
                .cloned()
                .ok_or_else(|| AppError::invalid_input(format!("category {id} not found")))?,
        ),
        None => None,
    };

    let mut tasks = repository.load_tasks();
    let ids = IdGenerator::seeded_from(&tasks, &[])?;
    let mut task = Task::new(title, new_task.description, due_date, new_task.priority)?;
    task.set_id(ids.next_task_id()?);
    task.set_category(category.map(Arc::new));
    task.set_recurrence(recurrence);
    task.set_tags(
        new_task
            .tags
            .iter()
            .map(|tag| validation::sanitize_string(tag)),
    );
    tasks.push(task.clone());

    if !repository.save_tasks(&tasks) {
        return Err(AppError::io("failed to save tasks"));
    }
    info!(id = task.id(), title = task.title(), "task added");
    Ok(task)
}

fn build_recurrence(request: NewRecurrence) -> Result<RecurrencePattern, AppError> {
    if !validation::validate_recurrence_interval(request.interval) {
        return Err(AppError::invalid_input(format!(
            "recurrence interval must be between 1 and {}",
            validation::MAX_RECURRENCE_INTERVAL
        )));
    }
    if !request.days_of_week.is_empty() && !validation::validate_days_of_week(&request.days_of_week) {
        return Err(AppError::invalid_input("days of week must not repeat"));
    }

    let mut pattern = RecurrencePattern::new(request.kind, request.interval, request.days_of_week)?;
    pattern.set_occurrence_count(request.occurrence_count);
    if let Some(raw) = request.end_date.as_deref() {
        let end = parse_user_date(raw)?;
        if !validation::validate_date_range(timefmt::now(), end) {
            return Err(AppError::invalid_input("recurrence end date must be in the future"));
        }
        pattern.set_end_date(Some(end));
    }
    Ok(pattern)
}

/// Accepts a bare date (start of that day) or a full timestamp.
pub fn parse_user_date(raw: &str) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if !validation::is_valid_date_string(trimmed) {
        return Err(AppError::invalid_input(format!(
            "invalid date '{trimmed}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS"
        )));
    }
    let full = if trimmed.len() == "YYYY-MM-DD".len() {
        format!("{trimmed} 00:00:00")
    } else {
        trimmed.to_string()
    };
    timefmt::parse_timestamp(&full).map_err(|err| AppError::invalid_input(err.message()))
}

fn description_too_long() -> AppError {
    AppError::invalid_input(format!(
        "description must be at most {} characters",
        validation::MAX_DESCRIPTION_LENGTH
    ))
}

/// Tasks with their category resolved from `categories` by id.
///
/// Ids that match no category stay on the task unresolved.
pub fn link_categories(tasks: Vec<Task>, categories: &[Category]) -> Vec<Task> {
    let by_id: HashMap<u32, Arc<Category>> = categories
        .iter()
        .map(|category| (category.id(), Arc::new(category.clone())))
        .collect();

    tasks
        .into_iter()
        .map(|mut task| {
            if let Some(id) = task.category_id() {
                match by_id.get(&id) {
                    Some(category) => task.set_category(Some(Arc::clone(category))),
                    None => debug!(task = task.id(), category = id, "category not found"),
                }
            }
            task
        })
        .collect()
}

pub fn list_tasks(repository: &dyn Repository) -> Vec<Task> {
    let categories = repository.load_categories();
    link_categories(repository.load_tasks(), &categories)
}

pub fn list_categories(repository: &dyn Repository) -> Vec<Category> {
    repository.load_categories()
}

/// Copies both collections from one repository into another.
pub fn convert(source: &dyn Repository, target: &dyn Repository) -> Result<ConvertSummary, AppError> {
    let categories = source.load_categories();
    let tasks = source.load_tasks();

    if !target.save_categories(&categories) {
        return Err(AppError::io("failed to write categories to the target folder"));
    }
    if !target.save_tasks(&tasks) {
        return Err(AppError::io("failed to write tasks to the target folder"));
    }

    info!(tasks = tasks.len(), categories = categories.len(), "converted data");
    Ok(ConvertSummary {
        tasks: tasks.len(),
        categories: categories.len(),
    })
}

/// Stats for tasks due between `from` and `to`; a bare `to` date covers that whole day.
pub fn productivity_report(
    repository: &dyn Repository,
    from: &str,
    to: &str,
) -> Result<ProductivityReport, AppError> {
    let start = parse_user_date(from)?;
    let mut end = parse_user_date(to)?;
    if to.trim().len() == "YYYY-MM-DD".len() {
        end = timefmt::add_days(end, 1);
    }
    ProductivityReport::build(&repository.load_tasks(), start, end, timefmt::now())
}
