//! Time block model and slot addressing.
//!
//! A time block assigns one task to one hourly slot on one date. Blocks are
//! fixed one-hour cells in every view; `end_time` is stored but carries no
//! duration and equals `start_time` for blocks created by assignment.

use super::task::TaskId;
use super::ModelValidationError;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TimeBlockId = Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Composite schedule key: one date, one start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self { date, start_time }
    }

    /// Builds a calendar slot; `start_time` must be a whole hour.
    pub fn hourly(date: NaiveDate, start_time: NaiveTime) -> Result<Self, ModelValidationError> {
        if start_time.minute() != 0 || start_time.second() != 0 {
            return Err(ModelValidationError::NotOnTheHour(format_time(start_time)));
        }
        Ok(Self::new(date, start_time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: TimeBlockId,
    pub task_id: TaskId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

impl TimeBlock {
    /// Creates a block occupying `slot` for `task_id`.
    pub fn for_slot(task_id: TaskId, slot: Slot) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.start_time,
            notes: None,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.date, self.start_time)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ModelValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ModelValidationError::InvalidDate(trimmed.to_string()))
}

/// Parses `HH:MM` (a single-digit hour such as `9:00` is accepted).
pub fn parse_time(value: &str) -> Result<NaiveTime, ModelValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| ModelValidationError::InvalidTime(trimmed.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
