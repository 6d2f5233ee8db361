//! Category model.
//!
//! Categories are optional labels on tasks, each with a display color.

use super::ModelValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

/// Categories seeded on first run when the table is empty.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Work", "#4dabf5"),
    ("Home", "#66bb6a"),
    ("Study", "#ab47bc"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `#RRGGBB`, as entered.
    pub color: String,
    pub is_system: bool,
}

impl Category {
    /// Creates a user category with a generated ID.
    ///
    /// # Errors
    /// - `BlankCategoryName` when `name` is empty after trimming.
    /// - `InvalidColor` when `color` is not `#RRGGBB`.
    pub fn new(name: &str, color: &str) -> Result<Self, ModelValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelValidationError::BlankCategoryName);
        }
        let color = color.trim();
        if !is_hex_color(color) {
            return Err(ModelValidationError::InvalidColor(color.to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
            is_system: false,
        })
    }

    /// Builds the default category set.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| Self {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                color: (*color).to_string(),
                is_system: false,
            })
            .collect()
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}
