use crate::error::AppError;
use crate::model::{Category, Task};
use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out task and category ids starting at 1.
///
/// One generator is created per data folder and passed to whoever needs it;
/// there is no process-wide instance.
#[derive(Debug)]
pub struct IdGenerator {
    next_task_id: AtomicU32,
    next_category_id: AtomicU32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            next_task_id: AtomicU32::new(1),
            next_category_id: AtomicU32::new(1),
        }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts each counter one past the highest id already stored.
    pub fn seeded_from(tasks: &[Task], categories: &[Category]) -> Result<Self, AppError> {
        let max_task = tasks.iter().map(Task::id).max().unwrap_or(0);
        let max_category = categories.iter().map(Category::id).max().unwrap_or(0);
        Ok(Self {
            next_task_id: AtomicU32::new(successor(max_task, "task")?),
            next_category_id: AtomicU32::new(successor(max_category, "category")?),
        })
    }

    pub fn next_task_id(&self) -> Result<u32, AppError> {
        take_next(&self.next_task_id, "task")
    }

    pub fn next_category_id(&self) -> Result<u32, AppError> {
        take_next(&self.next_category_id, "category")
    }
}

fn successor(id: u32, kind: &str) -> Result<u32, AppError> {
    id.checked_add(1)
        .ok_or_else(|| AppError::invalid_data(format!("{kind} id space exhausted")))
}

/// `u32::MAX` is never handed out; it only marks the counter as spent.
fn take_next(counter: &AtomicU32, kind: &str) -> Result<u32, AppError> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
        .map_err(|_| AppError::invalid_data(format!("{kind} id space exhausted")))
}
