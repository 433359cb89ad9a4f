use super::enums::{DayOfWeek, RecurrenceType};
use crate::error::AppError;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    kind: RecurrenceType,
    /// Every `interval` days/weeks/months/years.
    interval: u32,
    days_of_week: Vec<DayOfWeek>,
    /// 0 means no limit.
    occurrence_count: u32,
    end_date: Option<OffsetDateTime>,
}

impl Default for RecurrencePattern {
    fn default() -> Self {
        Self {
            kind: RecurrenceType::None,
            interval: 1,
            days_of_week: Vec::new(),
            occurrence_count: 0,
            end_date: None,
        }
    }
}

impl RecurrencePattern {
    pub fn new(
        kind: RecurrenceType,
        interval: u32,
        days_of_week: Vec<DayOfWeek>,
    ) -> Result<Self, AppError> {
        check_interval(interval)?;
        check_days(kind, &days_of_week)?;
        Ok(Self {
            kind,
            interval,
            days_of_week,
            ..Self::default()
        })
    }

    pub fn recurrence_type(&self) -> RecurrenceType {
        self.kind
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn days_of_week(&self) -> &[DayOfWeek] {
        &self.days_of_week
    }

    pub fn occurrence_count(&self) -> u32 {
        self.occurrence_count
    }

    pub fn end_date(&self) -> Option<OffsetDateTime> {
        self.end_date
    }

    pub fn set_type(&mut self, kind: RecurrenceType) {
        self.kind = kind;
    }

    pub fn set_interval(&mut self, interval: u32) -> Result<(), AppError> {
        check_interval(interval)?;
        self.interval = interval;
        Ok(())
    }

    pub fn set_days_of_week(&mut self, days_of_week: Vec<DayOfWeek>) -> Result<(), AppError> {
        check_days(self.kind, &days_of_week)?;
        self.days_of_week = days_of_week;
        Ok(())
    }

    pub fn set_occurrence_count(&mut self, count: u32) {
        self.occurrence_count = count;
    }

    pub fn set_end_date(&mut self, end_date: Option<OffsetDateTime>) {
        self.end_date = end_date;
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceType::None
    }
}

fn check_interval(interval: u32) -> Result<(), AppError> {
    if interval == 0 {
        return Err(AppError::invalid_input("recurrence interval must be positive"));
    }
    Ok(())
}

fn check_days(kind: RecurrenceType, days: &[DayOfWeek]) -> Result<(), AppError> {
    if kind == RecurrenceType::Weekly && days.is_empty() {
        return Err(AppError::invalid_input(
            "weekly recurrence requires at least one day of week",
        ));
    }
    Ok(())
}
