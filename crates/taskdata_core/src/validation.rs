//! Input validation for values typed in by a user.
//!
//! Validators answer yes/no; the entity setters enforce only the hard
//! invariants (non-empty title, positive interval) while these checks carry
//! the softer limits used by front ends before a value reaches the model.

use crate::model::{DayOfWeek, Priority, RecurrenceType};
use crate::text::{canonical_token, is_blank};
use std::collections::HashSet;
use time::OffsetDateTime;

pub const MAX_TASK_TITLE_LENGTH: usize = 100;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_RECURRENCE_INTERVAL: u32 = 365;

pub fn validate_task_title(title: &str) -> bool {
    !is_blank(title) && title.trim().chars().count() <= MAX_TASK_TITLE_LENGTH
}

pub fn validate_task_description(description: &str) -> bool {
    description.chars().count() <= MAX_DESCRIPTION_LENGTH
}

pub fn validate_due_date(due_date: OffsetDateTime) -> bool {
    due_date >= OffsetDateTime::now_utc()
}

pub fn validate_priority(priority: &str) -> bool {
    priority.parse::<Priority>().is_ok()
}

pub fn validate_status(status: &str) -> bool {
    matches!(
        canonical_token(status).as_str(),
        "PENDING" | "IN_PROGRESS" | "COMPLETED" | "CANCELLED"
    )
}

pub fn validate_category_name(name: &str) -> bool {
    !is_blank(name) && name.trim().chars().count() <= MAX_CATEGORY_NAME_LENGTH
}

pub fn validate_category_description(description: &str) -> bool {
    validate_task_description(description)
}

pub fn validate_color(color: &str) -> bool {
    !color.is_empty() && is_valid_hex_color(&sanitize_color(color))
}

pub fn validate_recurrence_type(recurrence_type: &str) -> bool {
    recurrence_type.parse::<RecurrenceType>().is_ok()
}

pub fn validate_recurrence_interval(interval: u32) -> bool {
    (1..=MAX_RECURRENCE_INTERVAL).contains(&interval)
}

/// Non-empty and free of duplicates.
pub fn validate_days_of_week(days: &[DayOfWeek]) -> bool {
    let mut seen = HashSet::new();
    !days.is_empty() && days.iter().all(|day| seen.insert(*day))
}

pub fn validate_id(id: u32) -> bool {
    id > 0
}

pub fn validate_date_range(start: OffsetDateTime, end: OffsetDateTime) -> bool {
    end > start
}

/// `H:MM`, `HH:MM` or `HH:MM:SS` on a 24-hour clock.
pub fn validate_time_string(value: &str) -> bool {
    let parts: Vec<&str> = value.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return false;
    }

    let hour = parts[0];
    let hour_ok = (1..=2).contains(&hour.len())
        && hour.bytes().all(|b| b.is_ascii_digit())
        && hour.parse::<u8>().is_ok_and(|h| h <= 23);

    hour_ok && parts[1..].iter().all(|part| is_two_digit_below_sixty(part))
}

/// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`; shape only, not calendar validity.
pub fn is_valid_date_string(value: &str) -> bool {
    matches_shape(value, "dddd-dd-dd") || matches_shape(value, "dddd-dd-dd dd:dd:dd")
}

/// Drops control characters (and DEL), then trims.
pub fn sanitize_string(input: &str) -> String {
    let kept: String = input.chars().filter(|c| !c.is_control()).collect();
    kept.trim().to_string()
}

/// Trimmed, upper-cased, exactly one leading `#`.
pub fn sanitize_color(color: &str) -> String {
    let upper = color.trim().to_ascii_uppercase();
    let bare = upper.strip_prefix('#').unwrap_or(&upper);
    if bare.is_empty() {
        String::new()
    } else {
        format!("#{bare}")
    }
}

pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_two_digit_below_sixty(part: &str) -> bool {
    part.len() == 2
        && part.bytes().all(|b| b.is_ascii_digit())
        && part.parse::<u8>().is_ok_and(|n| n <= 59)
}

/// `d` in `shape` stands for any ASCII digit, every other char must match exactly.
fn matches_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'd' => v.is_ascii_digit(),
            other => v == other,
        })
}
