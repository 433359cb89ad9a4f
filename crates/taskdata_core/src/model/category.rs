use crate::error::AppError;
use crate::timefmt;
use time::OffsetDateTime;

pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: u32,
    name: String,
    description: String,
    /// Hex color code, e.g. `#FF8800`.
    color: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, AppError> {
        let now = timefmt::now();
        let mut category = Self {
            id: 0,
            name: String::new(),
            description: description.into(),
            color: DEFAULT_COLOR.to_string(),
            created_at: now,
            updated_at: now,
        };
        category.set_name(name)?;
        category.set_color(color)?;
        Ok(category)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::invalid_input("category name cannot be empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_color(&mut self, color: impl Into<String>) -> Result<(), AppError> {
        let color = color.into();
        if color.is_empty() {
            return Err(AppError::invalid_input("category color cannot be empty"));
        }
        self.color = color;
        Ok(())
    }

    pub fn set_updated_at(&mut self, updated_at: OffsetDateTime) {
        self.updated_at = updated_at;
    }

    pub fn update_timestamp(&mut self) {
        self.updated_at = timefmt::now();
    }

    /// Used by the codecs; creation time is otherwise fixed at construction.
    pub(crate) fn restore_timestamps(&mut self, created_at: OffsetDateTime, updated_at: OffsetDateTime) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}
