//! Comma-separated text: one header line, then one record per entity.
//!
//! Quoting follows the usual convention: a field holding `"`, `,`, CR or LF is
//! wrapped in quotes with inner quotes doubled, and the empty string is
//! written as `""`.

use super::record::{CategoryFields, TaskFields, enum_or_default, parse_days, parse_id};
use crate::error::AppError;
use crate::model::{Category, RecurrencePattern, RecurrenceType, Task};
use crate::text::{join_list, split_list};
use crate::timefmt;
use tracing::warn;

pub const TASK_HEADER: &str = "id,title,description,dueDate,createdAt,updatedAt,completedAt,priority,status,categoryId,recurrenceType,recurrenceInterval,daysOfWeek,occurrenceCount,endDate,tags";
pub const CATEGORY_HEADER: &str = "id,name,description,color,createdAt,updatedAt";

const TASK_COLUMNS: usize = 16;
const CATEGORY_COLUMNS: usize = 6;
const LIST_DELIMITER: char = ';';
/// Recurrence columns of a task that does not repeat.
const NO_RECURRENCE: [&str; 5] = ["NONE", "0", "", "0", ""];

pub fn escape_field(field: &str) -> String {
    if field.is_empty() {
        return "\"\"".to_string();
    }
    if !field.contains(['"', ',', '\n', '\r']) {
        return field.to_string();
    }
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Splits file content into records. A line break inside an open quoted field
/// belongs to the record; blank records are skipped and a trailing CR dropped.
pub fn split_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in content.chars() {
        match c {
            '\n' if !in_quotes => {
                push_record(&mut records, std::mem::take(&mut current));
            }
            '"' => {
                // Doubled quotes toggle twice, so the state stays correct.
                in_quotes = !in_quotes;
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    push_record(&mut records, current);
    records
}

fn push_record(records: &mut Vec<String>, mut record: String) {
    if record.ends_with('\r') {
        record.pop();
    }
    if !record.is_empty() {
        records.push(record);
    }
}

pub fn encode_task(task: &Task) -> Result<String, AppError> {
    let mut columns = vec![
        task.id().to_string(),
        escape_field(task.title()),
        escape_field(task.description()),
        escape_field(&timefmt::format_timestamp(task.due_date())?),
        escape_field(&timefmt::format_timestamp(task.created_at())?),
        escape_field(&timefmt::format_timestamp(task.updated_at())?),
        escape_field(&timefmt::format_optional(task.completed_at())?),
        escape_field(task.priority().as_str()),
        escape_field(task.status().as_str()),
        task.category_id().unwrap_or(0).to_string(),
    ];

    match task.recurrence() {
        Some(pattern) => {
            let days: Vec<&str> = pattern.days_of_week().iter().map(|day| day.as_str()).collect();
            columns.push(escape_field(pattern.recurrence_type().as_str()));
            columns.push(pattern.interval().to_string());
            columns.push(escape_field(&join_list(&days, ";")));
            columns.push(pattern.occurrence_count().to_string());
            columns.push(escape_field(&timefmt::format_optional(pattern.end_date())?));
        }
        None => columns.extend(NO_RECURRENCE.iter().map(|column| column.to_string())),
    }

    columns.push(escape_field(&join_list(task.tags(), ";")));
    Ok(columns.join(","))
}

pub fn encode_category(category: &Category) -> Result<String, AppError> {
    let columns = [
        category.id().to_string(),
        escape_field(category.name()),
        escape_field(category.description()),
        escape_field(category.color()),
        escape_field(&timefmt::format_timestamp(category.created_at())?),
        escape_field(&timefmt::format_timestamp(category.updated_at())?),
    ];
    Ok(columns.join(","))
}

pub fn decode_task(record: &str) -> Result<Task, AppError> {
    let mut fields = parse_line(record);
    if fields.len() < TASK_COLUMNS {
        return Err(AppError::invalid_data(format!(
            "expected {TASK_COLUMNS} task fields, found {}",
            fields.len()
        )));
    }

    let id = parse_id(&fields[0], "id")?;
    let category_id = match parse_id(&fields[9], "categoryId")? {
        0 => None,
        id => Some(id),
    };
    let recurrence = match decode_recurrence(&fields[10..15]) {
        Ok(recurrence) => recurrence,
        Err(err) => {
            warn!(task = id, error = %err, "dropping unreadable recurrence pattern");
            None
        }
    };
    let tags = split_list(&fields[15], LIST_DELIMITER);
    let mut take = |index: usize| std::mem::take(&mut fields[index]);
    TaskFields {
        id,
        title: take(1),
        description: take(2),
        due_date: take(3),
        created_at: take(4),
        updated_at: take(5),
        completed_at: take(6),
        priority: take(7),
        status: take(8),
        category_id,
        recurrence,
        tags,
    }
    .into_task()
}

/// `columns` are type, interval, days, occurrence count and end date.
fn decode_recurrence(columns: &[String]) -> Result<Option<RecurrencePattern>, AppError> {
    let kind: RecurrenceType = enum_or_default(&columns[0])?;
    if kind == RecurrenceType::None {
        return Ok(None);
    }

    let interval = parse_id(&columns[1], "recurrenceInterval")?;
    let days = split_list(&columns[2], LIST_DELIMITER);
    let mut pattern = RecurrencePattern::new(kind, interval, parse_days(days.iter().map(String::as_str)))?;
    if !columns[3].is_empty() {
        pattern.set_occurrence_count(parse_id(&columns[3], "occurrenceCount")?);
    }
    pattern.set_end_date(timefmt::parse_optional(&columns[4])?);
    Ok(Some(pattern))
}

pub fn decode_category(record: &str) -> Result<Category, AppError> {
    let mut fields = parse_line(record);
    if fields.len() < CATEGORY_COLUMNS {
        return Err(AppError::invalid_data(format!(
            "expected {CATEGORY_COLUMNS} category fields, found {}",
            fields.len()
        )));
    }

    let mut take = |index: usize| std::mem::take(&mut fields[index]);
    CategoryFields {
        id: parse_id(&take(0), "id")?,
        name: take(1),
        description: take(2),
        color: take(3),
        created_at: take(4),
        updated_at: take(5),
    }
    .into_category()
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    encode_all(TASK_HEADER, tasks, encode_task)
}

pub fn encode_categories(categories: &[Category]) -> Result<String, AppError> {
    encode_all(CATEGORY_HEADER, categories, encode_category)
}

fn encode_all<T>(
    header: &str,
    items: &[T],
    encode: fn(&T) -> Result<String, AppError>,
) -> Result<String, AppError> {
    let mut out = String::with_capacity(header.len() + 1);
    out.push_str(header);
    out.push('\n');
    for item in items {
        out.push_str(&encode(item)?);
        out.push('\n');
    }
    Ok(out)
}

/// The first record is the header and is never decoded.
pub fn decode_tasks(content: &str) -> Vec<Task> {
    decode_all(content, "task", decode_task)
}

pub fn decode_categories(content: &str) -> Vec<Category> {
    decode_all(content, "category", decode_category)
}

fn decode_all<T>(content: &str, kind: &str, decode: fn(&str) -> Result<T, AppError>) -> Vec<T> {
    split_records(content)
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, record)| match decode(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(record = index, kind, error = %err, "skipping unreadable csv record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_utils::capture_logs;
    use crate::model::{DEFAULT_COLOR, DayOfWeek, Priority, TaskStatus};
    use time::OffsetDateTime;

    fn at(raw: &str) -> OffsetDateTime {
        timefmt::parse_timestamp(raw).unwrap()
    }

    fn sample_task() -> Task {
        let mut task = Task::new("Write report", "Quarterly", at("2025-06-01 17:00:00"), Priority::High).unwrap();
        task.set_id(1);
        task
    }

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field(""), "\"\"");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn parse_line_handles_quotes() {
        assert_eq!(parse_line("1,\"a,b\",c"), vec!["1", "a,b", "c"]);
        assert_eq!(parse_line("\"say \"\"hi\"\"\","), vec!["say \"hi\"", ""]);
        assert_eq!(parse_line(""), vec![""]);
        assert_eq!(parse_line("\"\""), vec![""]);
    }

    #[test]
    fn split_records_keeps_quoted_line_breaks() {
        let content = "header\r\n1,\"two\nlines\"\r\n\n2,x\n";
        assert_eq!(split_records(content), vec!["header", "1,\"two\nlines\"", "2,x"]);
    }

    #[test]
    fn non_recurring_task_row() {
        let row = encode_task(&sample_task()).unwrap();
        assert!(row.starts_with("1,Write report,Quarterly,2025-06-01 17:00:00,"));
        assert!(row.contains(",\"\",HIGH,PENDING,0,NONE,0,,0,,\"\""), "{row}");
        assert_eq!(parse_line(&row).len(), TASK_COLUMNS);
    }

    #[test]
    fn task_round_trip() {
        let mut task = sample_task();
        task.set_title("Plan, \"carefully\"\nthen act").unwrap();
        task.set_status(TaskStatus::Completed);
        task.set_category_id(Some(4));
        task.set_tags(["work", "q2"]);
        let mut pattern =
            RecurrencePattern::new(RecurrenceType::Weekly, 2, vec![DayOfWeek::Monday, DayOfWeek::Friday]).unwrap();
        pattern.set_occurrence_count(5);
        pattern.set_end_date(Some(at("2025-12-31 00:00:00")));
        task.set_recurrence(Some(pattern.clone()));

        let content = encode_tasks(std::slice::from_ref(&task)).unwrap();
        let loaded = decode_tasks(&content);

        assert_eq!(loaded.len(), 1);
        let back = &loaded[0];
        assert_eq!(back.title(), task.title());
        assert_eq!(back.status(), TaskStatus::Completed);
        assert_eq!(back.category_id(), Some(4));
        assert_eq!(back.tags(), task.tags());
        assert_eq!(back.recurrence(), Some(&pattern));
        assert_eq!(
            back.completed_at().map(|t| t.unix_timestamp()),
            task.completed_at().map(|t| t.unix_timestamp())
        );
        assert_eq!(back.created_at().unix_timestamp(), task.created_at().unix_timestamp());
    }

    #[test]
    fn zero_category_reads_as_none() {
        let content = encode_tasks(&[sample_task()]).unwrap();
        let loaded = decode_tasks(&content);
        assert_eq!(loaded[0].category_id(), None);
        assert!(!loaded[0].has_category());
        assert!(loaded[0].recurrence().is_none());
    }

    #[test]
    fn category_round_trip() {
        let mut category = Category::new("Home, sweet home", "", DEFAULT_COLOR).unwrap();
        category.set_id(3);

        let content = encode_categories(std::slice::from_ref(&category)).unwrap();
        assert!(content.starts_with(CATEGORY_HEADER));

        let loaded = decode_categories(&content);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), 3);
        assert_eq!(loaded[0].name(), "Home, sweet home");
        assert_eq!(loaded[0].description(), "");
        assert_eq!(loaded[0].color(), DEFAULT_COLOR);
    }

    #[test]
    fn bad_rows_are_skipped_with_one_warning_each() {
        let (logs, _guard) = capture_logs();
        let mut second = sample_task();
        second.set_id(2);
        let good = encode_tasks(&[sample_task(), second]).unwrap();
        let content = format!("{good}x,short row\n");

        let loaded = decode_tasks(&content);
        assert_eq!(loaded.len(), 2);
        assert_eq!(logs.count_at_level(tracing::Level::WARN), 1);
    }

    #[test]
    fn broken_recurrence_keeps_task() {
        let (logs, _guard) = capture_logs();
        let row = encode_task(&sample_task())
            .unwrap()
            .replace("NONE,0,,0,,", "WEEKLY,1,,0,,");
        let loaded = decode_tasks(&format!("{TASK_HEADER}\n{row}\n"));

        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].recurrence().is_none());
        assert!(logs.has_event(tracing::Level::WARN, "recurrence"));
    }

    #[test]
    fn header_only_or_empty_content_is_empty() {
        assert!(decode_tasks("").is_empty());
        assert!(decode_tasks(&format!("{TASK_HEADER}\n")).is_empty());
    }
}
