//! Task model and Eisenhower quadrant classification.
//!
//! # Invariants
//! - A freshly created task has a trimmed, non-blank title and all flags `false`.
//! - `Quadrant::of` is total over `(is_urgent, is_important)`.

use super::category::CategoryId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_completed: bool,
    pub is_archived: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_urgent: bool,
    pub is_important: bool,
}

impl Task {
    /// Creates a task from user input.
    ///
    /// # Errors
    /// - `BlankTitle` when `title` is empty or whitespace-only.
    pub fn new(title: &str, category_id: Option<CategoryId>) -> Result<Self, ModelValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ModelValidationError::BlankTitle);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            category_id,
            is_completed: false,
            is_archived: false,
            created_at: chrono::Utc::now().timestamp_millis(),
            is_urgent: false,
            is_important: false,
        })
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::of(self.is_urgent, self.is_important)
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed
    }
}

/// Partial task update.
///
/// `None` leaves a field untouched. For nullable columns, `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<CategoryId>>,
    pub is_completed: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_urgent: Option<bool>,
    pub is_important: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the patch to an in-memory task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category_id) = self.category_id {
            task.category_id = category_id;
        }
        if let Some(value) = self.is_completed {
            task.is_completed = value;
        }
        if let Some(value) = self.is_archived {
            task.is_archived = value;
        }
        if let Some(value) = self.is_urgent {
            task.is_urgent = value;
        }
        if let Some(value) = self.is_important {
            task.is_important = value;
        }
    }
}

/// Eisenhower matrix quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Urgent and important.
    DoFirst,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither.
    Eliminate,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoFirst,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    pub fn of(is_urgent: bool, is_important: bool) -> Self {
        match (is_urgent, is_important) {
            (true, true) => Self::DoFirst,
            (false, true) => Self::Schedule,
            (true, false) => Self::Delegate,
            (false, false) => Self::Eliminate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DoFirst => "Do first",
            Self::Schedule => "Schedule",
            Self::Delegate => "Delegate",
            Self::Eliminate => "Eliminate",
        }
    }
}
