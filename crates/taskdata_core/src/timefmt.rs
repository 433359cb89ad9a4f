//! Fixed-format timestamps: `YYYY-MM-DD HH:MM:SS`, local offset, second precision.
//!
//! Both codecs go through [`format_timestamp`] / [`parse_timestamp`], so a
//! round trip through either file format drops sub-second precision.

use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset, Weekday};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The offset in force right now, applied to every stored timestamp.
///
/// Stored values carry no offset, so a file written before a DST change reads
/// back an hour off after it. On Unix `current_local_offset` refuses to run
/// once the process has several threads, and this falls back to UTC; a
/// threaded caller can then read the same file differently from the CLI.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .to_offset(local_offset())
        .format(TIMESTAMP_FORMAT)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    let parsed = PrimitiveDateTime::parse(trimmed, TIMESTAMP_FORMAT)
        .map_err(|_| AppError::invalid_data(format!("invalid timestamp '{trimmed}'")))?;
    Ok(parsed.assume_offset(local_offset()))
}

/// Unset timestamps ("not completed", "no end date") are the empty string on disk.
pub fn format_optional(value: Option<OffsetDateTime>) -> Result<String, AppError> {
    match value {
        Some(value) => format_timestamp(value),
        None => Ok(String::new()),
    }
}

pub fn parse_optional(raw: &str) -> Result<Option<OffsetDateTime>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    parse_timestamp(trimmed).map(Some)
}

pub fn add_days(value: OffsetDateTime, days: i64) -> OffsetDateTime {
    value + Duration::days(days)
}

/// Whole days from `from` to `to`, truncated toward zero.
pub fn days_between(from: OffsetDateTime, to: OffsetDateTime) -> i64 {
    (to - from).whole_days()
}

pub fn is_same_day(lhs: OffsetDateTime, rhs: OffsetDateTime) -> bool {
    let offset = local_offset();
    lhs.to_offset(offset).date() == rhs.to_offset(offset).date()
}

pub fn is_weekend(value: OffsetDateTime) -> bool {
    matches!(
        value.to_offset(local_offset()).weekday(),
        Weekday::Saturday | Weekday::Sunday
    )
}

#[cfg(test)]
mod tests {
    use super::{
        add_days, days_between, format_optional, format_timestamp, is_same_day, is_weekend,
        local_offset, parse_optional, parse_timestamp,
    };
    use time::macros::datetime;

    #[test]
    fn format_then_parse_keeps_whole_seconds() {
        let original = datetime!(2025-03-14 09:26:53.589 UTC);
        let formatted = format_timestamp(original).unwrap();
        let parsed = parse_timestamp(&formatted).unwrap();

        assert_eq!(formatted.len(), "2025-03-14 09:26:53".len());
        assert_eq!(parsed.unix_timestamp(), original.unix_timestamp());
        assert_eq!(parsed.nanosecond(), 0);
    }

    #[test]
    fn stored_values_take_the_current_offset() {
        let summer = parse_timestamp("2025-07-01 12:00:00").unwrap();
        let winter = parse_timestamp("2025-01-01 12:00:00").unwrap();

        assert_eq!(summer.offset(), local_offset());
        assert_eq!(winter.offset(), summer.offset());
        assert_eq!(format_timestamp(summer).unwrap(), "2025-07-01 12:00:00");
    }

    #[test]
    fn parse_rejects_other_layouts() {
        let err = parse_timestamp("2025-03-14T09:26:53Z").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn optional_values_use_empty_string() {
        assert_eq!(format_optional(None).unwrap(), "");
        assert_eq!(parse_optional("").unwrap(), None);
        assert_eq!(parse_optional("null").unwrap(), None);

        let value = datetime!(2025-01-01 00:00:00 UTC);
        let round = parse_optional(&format_optional(Some(value)).unwrap()).unwrap();
        assert_eq!(round, Some(value));
    }

    #[test]
    fn day_arithmetic() {
        let start = datetime!(2025-01-01 12:00:00 UTC);
        let later = add_days(start, 3);

        assert_eq!(days_between(start, later), 3);
        assert_eq!(days_between(later, start), -3);
        assert!(is_same_day(start, start + time::Duration::minutes(1)));
        assert!(!is_same_day(start, later));
    }

    #[test]
    fn weekend_detection() {
        // Midday keeps the weekday stable under any local offset.
        assert!(is_weekend(datetime!(2024-01-06 12:00:00 UTC)));
        assert!(is_weekend(datetime!(2024-01-07 12:00:00 UTC)));
        assert!(!is_weekend(datetime!(2024-01-08 12:00:00 UTC)));
    }
}
