mod category;
mod enums;
mod recurrence;
mod task;

pub use category::{Category, DEFAULT_COLOR};
pub use enums::{DayOfWeek, Priority, RecurrenceType, TaskStatus};
pub use recurrence::RecurrencePattern;
pub use task::Task;
