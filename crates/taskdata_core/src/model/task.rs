use super::category::Category;
use super::enums::{Priority, TaskStatus};
use super::recurrence::RecurrencePattern;
use crate::error::AppError;
use crate::timefmt;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: String,
    due_date: OffsetDateTime,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    completed_at: Option<OffsetDateTime>,
    priority: Priority,
    status: TaskStatus,
    category: Option<Arc<Category>>,
    /// Kept even when `category` is not linked (freshly loaded tasks).
    category_id: Option<u32>,
    recurrence: Option<RecurrencePattern>,
    tags: Vec<String>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: OffsetDateTime,
        priority: Priority,
    ) -> Result<Self, AppError> {
        let now = timefmt::now();
        let mut task = Self {
            id: 0,
            title: String::new(),
            description: description.into(),
            due_date,
            created_at: now,
            updated_at: now,
            completed_at: None,
            priority,
            status: TaskStatus::Pending,
            category: None,
            category_id: None,
            recurrence: None,
            tags: Vec::new(),
        };
        task.set_title(title)?;
        Ok(task)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> OffsetDateTime {
        self.due_date
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<OffsetDateTime> {
        self.completed_at
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn category(&self) -> Option<&Arc<Category>> {
        self.category.as_ref()
    }

    pub fn category_id(&self) -> Option<u32> {
        self.category_id
    }

    pub fn recurrence(&self) -> Option<&RecurrencePattern> {
        self.recurrence.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), AppError> {
        let title = title.into();
        if title.is_empty() {
            return Err(AppError::invalid_input("task title cannot be empty"));
        }
        self.title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_due_date(&mut self, due_date: OffsetDateTime) -> Result<(), AppError> {
        if due_date < self.created_at {
            return Err(AppError::invalid_input(
                "due date cannot be before creation date",
            ));
        }
        self.due_date = due_date;
        Ok(())
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// The first transition into `Completed` stamps `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus) {
        if status == TaskStatus::Completed && self.status != TaskStatus::Completed {
            self.completed_at = Some(timefmt::now());
        }
        self.status = status;
    }

    pub fn set_category(&mut self, category: Option<Arc<Category>>) {
        self.category_id = category.as_ref().map(|category| category.id());
        self.category = category;
    }

    /// Sets the id-only reference; a linked category with another id is dropped.
    pub fn set_category_id(&mut self, category_id: Option<u32>) {
        if self.category.as_ref().map(|category| category.id()) != category_id {
            self.category = None;
        }
        self.category_id = category_id;
    }

    pub fn set_recurrence(&mut self, recurrence: Option<RecurrencePattern>) {
        self.recurrence = recurrence;
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            self.add_tag(tag);
        }
    }

    pub fn set_updated_at(&mut self, updated_at: OffsetDateTime) {
        self.updated_at = updated_at;
    }

    pub fn update_timestamp(&mut self) {
        self.updated_at = timefmt::now();
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_ref()
            .is_some_and(RecurrencePattern::is_recurring)
    }

    pub fn has_category(&self) -> bool {
        self.category_id.is_some()
    }

    /// Empty and duplicate tags are ignored; insertion order is kept.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if tag.is_empty() || self.tags.contains(&tag) {
            return;
        }
        self.tags.push(tag);
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|existing| existing != tag);
    }

    /// Used by the codecs to put stored timestamps back without the setter checks.
    pub(crate) fn restore_timestamps(
        &mut self,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
        completed_at: Option<OffsetDateTime>,
    ) {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.completed_at = completed_at;
    }
}
