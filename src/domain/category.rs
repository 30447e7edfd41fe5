//! Expense categories: a fixed, type-checked set plus free-text entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::common::Displayable;
use crate::errors::{LedgerError, Result};

/// Built-in categories offered by the expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedCategory {
    Food,
    Transport,
    Other,
}

impl FixedCategory {
    pub const ALL: [FixedCategory; 3] = [
        FixedCategory::Food,
        FixedCategory::Transport,
        FixedCategory::Other,
    ];

    /// Label persisted in storage and shown to users.
    pub fn label(self) -> &'static str {
        match self {
            FixedCategory::Food => "Makanan",
            FixedCategory::Transport => "Transportasi",
            FixedCategory::Other => "Lainnya",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            FixedCategory::Food => "food",
            FixedCategory::Transport => "transport",
            FixedCategory::Other => "other",
        }
    }

    fn lookup(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| {
            value.eq_ignore_ascii_case(candidate.label())
                || value.eq_ignore_ascii_case(candidate.english_name())
        })
    }
}

/// Category attached to an expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Fixed(FixedCategory),
    Custom(String),
}

impl Category {
    /// Parses a user-supplied category; blank input is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::validation("category", "is required"));
        }
        Ok(Self::from_stored(trimmed))
    }

    /// Resolves the form's dropdown selection plus the free-text box shown for "Other".
    pub fn from_selection(selected: &str, custom: Option<&str>) -> Result<Self> {
        let category = Self::parse(selected)?;
        if category != Category::Fixed(FixedCategory::Other) {
            return Ok(category);
        }
        match custom.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => Ok(Self::from_stored(text)),
            None => Ok(category),
        }
    }

    /// Interprets a label read back from storage; unknown labels are custom categories.
    pub fn from_stored(label: &str) -> Self {
        match FixedCategory::lookup(label) {
            Some(fixed) => Category::Fixed(fixed),
            None => Category::Custom(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Fixed(fixed) => fixed.label(),
            Category::Custom(text) => text,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        if self.is_custom() {
            format!("{} (custom)", self.label())
        } else {
            self.label().to_string()
        }
    }
}

impl TryFrom<String> for Category {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

impl From<FixedCategory> for Category {
    fn from(value: FixedCategory) -> Self {
        Category::Fixed(value)
    }
}
