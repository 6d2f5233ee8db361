//! Domain model for the inbox, matrix and calendar projections.
//!
//! # Responsibility
//! - Define canonical records shared by storage, the task store and views.
//! - Validate user input at construction time.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A time block is addressed by its `Slot` (`date`, `start_time`).

pub mod category;
pub mod task;
pub mod time_block;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input validation failure for model constructors and parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    BlankTitle,
    BlankCategoryName,
    InvalidColor(String),
    InvalidDate(String),
    InvalidTime(String),
    /// Slots start on the hour.
    NotOnTheHour(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title cannot be blank"),
            Self::BlankCategoryName => write!(f, "category name cannot be blank"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color `{value}`; expected #RRGGBB")
            }
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected YYYY-MM-DD"),
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected HH:MM"),
            Self::NotOnTheHour(value) => {
                write!(f, "slot time `{value}` must start on the hour (HH:00)")
            }
        }
    }
}

impl Error for ModelValidationError {}
