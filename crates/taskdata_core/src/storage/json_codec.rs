//! JSON-shaped text written and read by hand.
//!
//! The writer emits a fixed layout (2-space objects, 4-space fields, fixed key
//! order). The reader does not parse JSON in general: it splits the top-level
//! array by counting braces and looks fields up by key. A `{` or `}` inside a
//! string value throws the brace count off; such files are not produced by
//! the writer.

use super::record::{CategoryFields, TaskFields, enum_or_default, parse_days};
use crate::error::AppError;
use crate::model::{Category, RecurrencePattern, RecurrenceType, Task};
use crate::timefmt;
use std::fmt::Write as _;
use tracing::warn;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`]. `\uXXXX` becomes a single `?`; an unknown escape keeps
/// its backslash.
pub fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut rest = value.char_indices().peekable();

    while let Some((i, c)) = rest.next() {
        if c != '\\' || i + 1 >= bytes.len() {
            out.push(c);
            continue;
        }
        let replacement = match bytes[i + 1] {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' if i + 5 < bytes.len() => {
                out.push('?');
                for _ in 0..5 {
                    rest.next();
                }
                continue;
            }
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push(replacement);
        rest.next();
    }
    out
}

/// Top-level objects of an array, each trimmed, in file order.
pub fn split_objects(content: &str) -> Vec<&str> {
    let mut body = content.trim();
    if let Some(inner) = body.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        body = inner;
    }

    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(body[start..=i].trim());
                }
            }
            _ => {}
        }
    }
    objects
}

/// Byte offset of the first non-whitespace char after `"key":`.
fn value_start(object: &str, key: &str) -> Option<usize> {
    let needle = format!("\"{key}\":");
    let after = object.find(&needle)? + needle.len();
    let skipped = object[after..].len() - object[after..].trim_start().len();
    let start = after + skipped;
    (start < object.len()).then_some(start)
}

/// Index of the next `"` in `text` not preceded by an escaping backslash.
fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

/// String value of `key`; missing keys, `null` and non-strings read as empty.
fn extract_string(object: &str, key: &str) -> String {
    let Some(start) = value_start(object, key) else {
        return String::new();
    };
    let Some(body) = object[start..].strip_prefix('"') else {
        return String::new();
    };
    match closing_quote(body) {
        Some(end) => unescape(&body[..end]),
        None => String::new(),
    }
}

/// Integer value of `key`. Missing or `null` reads as `None`; anything else
/// that is not a number fails the record.
fn extract_int(object: &str, key: &str) -> Result<Option<i64>, AppError> {
    let Some(start) = value_start(object, key) else {
        return Ok(None);
    };
    let rest = &object[start..];
    if rest.starts_with("null") {
        return Ok(None);
    }
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '-'))
        .unwrap_or(rest.len());
    rest[..end]
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::invalid_data(format!("invalid number for '{key}'")))
}

fn extract_u32(object: &str, key: &str) -> Result<u32, AppError> {
    match extract_int(object, key)? {
        None => Ok(0),
        Some(value) => u32::try_from(value)
            .map_err(|_| AppError::invalid_data(format!("'{key}' out of range: {value}"))),
    }
}

fn extract_string_array(object: &str, key: &str) -> Vec<String> {
    let mut values = Vec::new();
    let Some(start) = value_start(object, key) else {
        return values;
    };
    let Some(mut rest) = object[start..].strip_prefix('[') else {
        return values;
    };

    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(']') {
            break;
        }
        if let Some(body) = rest.strip_prefix('"') {
            let Some(end) = closing_quote(body) else {
                break;
            };
            values.push(unescape(&body[..end]));
            rest = &body[end + 1..];
        }
        match rest.find([',', ']']) {
            Some(pos) if rest[pos..].starts_with(',') => rest = &rest[pos + 1..],
            _ => break,
        }
    }
    values
}

/// The nested `recurrence` object, or `None` when absent, `null` or unbalanced.
fn extract_object<'a>(object: &'a str, key: &str) -> Option<&'a str> {
    let start = value_start(object, key)?;
    if !object[start..].starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in object[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&object[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn string_array(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("\"{}\"", escape(value))).collect();
    format!("[{}]", quoted.join(", "))
}

fn encode_recurrence(pattern: &RecurrencePattern) -> Result<String, AppError> {
    let days: Vec<&str> = pattern.days_of_week().iter().map(|day| day.as_str()).collect();
    let mut out = String::from("{\n");
    let _ = writeln!(out, "      \"type\": \"{}\",", pattern.recurrence_type());
    let _ = writeln!(out, "      \"interval\": {},", pattern.interval());
    let _ = writeln!(out, "      \"daysOfWeek\": {},", string_array(&days));
    let _ = writeln!(out, "      \"occurrenceCount\": {},", pattern.occurrence_count());
    let _ = writeln!(
        out,
        "      \"endDate\": \"{}\"",
        timefmt::format_optional(pattern.end_date())?
    );
    out.push_str("    }");
    Ok(out)
}

pub fn encode_task(task: &Task) -> Result<String, AppError> {
    let category_id = task
        .category_id()
        .map_or_else(|| "null".to_string(), |id| id.to_string());
    let recurrence = match task.recurrence() {
        Some(pattern) => encode_recurrence(pattern)?,
        None => "null".to_string(),
    };
    let tags: Vec<&str> = task.tags().iter().map(String::as_str).collect();

    let mut out = String::from("  {\n");
    let _ = writeln!(out, "    \"id\": {},", task.id());
    let _ = writeln!(out, "    \"title\": \"{}\",", escape(task.title()));
    let _ = writeln!(out, "    \"description\": \"{}\",", escape(task.description()));
    let _ = writeln!(out, "    \"dueDate\": \"{}\",", timefmt::format_timestamp(task.due_date())?);
    let _ = writeln!(out, "    \"createdAt\": \"{}\",", timefmt::format_timestamp(task.created_at())?);
    let _ = writeln!(out, "    \"updatedAt\": \"{}\",", timefmt::format_timestamp(task.updated_at())?);
    let _ = writeln!(out, "    \"completedAt\": \"{}\",", timefmt::format_optional(task.completed_at())?);
    let _ = writeln!(out, "    \"priority\": \"{}\",", task.priority());
    let _ = writeln!(out, "    \"status\": \"{}\",", task.status());
    let _ = writeln!(out, "    \"categoryId\": {category_id},");
    let _ = writeln!(out, "    \"recurrence\": {recurrence},");
    let _ = writeln!(out, "    \"tags\": {}", string_array(&tags));
    out.push_str("  }");
    Ok(out)
}

pub fn encode_category(category: &Category) -> Result<String, AppError> {
    let mut out = String::from("  {\n");
    let _ = writeln!(out, "    \"id\": {},", category.id());
    let _ = writeln!(out, "    \"name\": \"{}\",", escape(category.name()));
    let _ = writeln!(out, "    \"description\": \"{}\",", escape(category.description()));
    let _ = writeln!(out, "    \"color\": \"{}\",", escape(category.color()));
    let _ = writeln!(out, "    \"createdAt\": \"{}\",", timefmt::format_timestamp(category.created_at())?);
    let _ = writeln!(out, "    \"updatedAt\": \"{}\"", timefmt::format_timestamp(category.updated_at())?);
    out.push_str("  }");
    Ok(out)
}

fn decode_recurrence(object: &str) -> Result<RecurrencePattern, AppError> {
    let kind: RecurrenceType = enum_or_default(&extract_string(object, "type"))?;
    let days = extract_string_array(object, "daysOfWeek");
    let mut pattern = RecurrencePattern::new(
        kind,
        extract_u32(object, "interval")?,
        parse_days(days.iter().map(String::as_str)),
    )?;
    pattern.set_occurrence_count(extract_u32(object, "occurrenceCount")?);
    pattern.set_end_date(timefmt::parse_optional(&extract_string(object, "endDate"))?);
    Ok(pattern)
}

pub fn decode_task(object: &str) -> Result<Task, AppError> {
    let id = extract_u32(object, "id")?;
    let category_id = match extract_u32(object, "categoryId")? {
        0 => None,
        id => Some(id),
    };
    let recurrence = extract_object(object, "recurrence").and_then(|nested| {
        decode_recurrence(nested)
            .map_err(|err| warn!(task = id, error = %err, "dropping unreadable recurrence pattern"))
            .ok()
    });

    TaskFields {
        id,
        title: extract_string(object, "title"),
        description: extract_string(object, "description"),
        due_date: extract_string(object, "dueDate"),
        created_at: extract_string(object, "createdAt"),
        updated_at: extract_string(object, "updatedAt"),
        completed_at: extract_string(object, "completedAt"),
        priority: extract_string(object, "priority"),
        status: extract_string(object, "status"),
        category_id,
        recurrence,
        tags: extract_string_array(object, "tags"),
    }
    .into_task()
}

pub fn decode_category(object: &str) -> Result<Category, AppError> {
    CategoryFields {
        id: extract_u32(object, "id")?,
        name: extract_string(object, "name"),
        description: extract_string(object, "description"),
        color: extract_string(object, "color"),
        created_at: extract_string(object, "createdAt"),
        updated_at: extract_string(object, "updatedAt"),
    }
    .into_category()
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    encode_array(tasks, encode_task)
}

pub fn encode_categories(categories: &[Category]) -> Result<String, AppError> {
    encode_array(categories, encode_category)
}

fn encode_array<T>(items: &[T], encode: fn(&T) -> Result<String, AppError>) -> Result<String, AppError> {
    let objects = items.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[\n{}\n]", objects.join(",\n")))
}

pub fn decode_tasks(content: &str) -> Vec<Task> {
    decode_array(content, "task", decode_task)
}

pub fn decode_categories(content: &str) -> Vec<Category> {
    decode_array(content, "category", decode_category)
}

fn decode_array<T>(content: &str, kind: &str, decode: fn(&str) -> Result<T, AppError>) -> Vec<T> {
    split_objects(content)
        .into_iter()
        .enumerate()
        .filter_map(|(index, object)| match decode(object) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(object = index, kind, error = %err, "skipping unreadable object");
                None
            }
        })
        .collect()
}
