//! Calendar projection and the slot assignment flow.
//!
//! # Responsibility
//! - Expand a calendar mode and anchor date into displayed dates.
//! - Resolve each `(date, hour)` cell to its block, task and category.
//! - Model the tap → pick → assign interaction.
//!
//! # Invariants
//! - A cell shows at most one block: the first match of a linear scan.
//! - Cells are one hour wide regardless of a block's stored `end_time`.
//! - The picker only offers active tasks.

use crate::model::category::Category;
use crate::model::task::{Task, TaskId};
use crate::model::time_block::{Slot, TimeBlock};
use crate::service::task_store::AppState;
use chrono::{Datelike, Days, NaiveDate, NaiveTime};

pub const DEFAULT_FIRST_HOUR: u32 = 8;
pub const DEFAULT_LAST_HOUR: u32 = 21;

/// Number of dates shown side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarMode {
    #[default]
    Day,
    ThreeDay,
    Week,
}

impl CalendarMode {
    /// Day: the anchor. Three-day: the anchor and the next two dates.
    /// Week: Monday through Sunday of the anchor's week.
    pub fn dates(self, anchor: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Self::Day => vec![anchor],
            Self::ThreeDay => anchor.iter_days().take(3).collect(),
            Self::Week => {
                let offset = u64::from(anchor.weekday().num_days_from_monday());
                let monday = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);
                monday.iter_days().take(7).collect()
            }
        }
    }

    pub fn day_count(self) -> usize {
        match self {
            Self::Day => 1,
            Self::ThreeDay => 3,
            Self::Week => 7,
        }
    }
}

/// Hourly rows from `first_hour:00` through `last_hour:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleGrid {
    first_hour: u32,
    last_hour: u32,
}

impl Default for ScheduleGrid {
    fn default() -> Self {
        Self {
            first_hour: DEFAULT_FIRST_HOUR,
            last_hour: DEFAULT_LAST_HOUR,
        }
    }
}

impl ScheduleGrid {
    /// Returns `None` unless `first_hour <= last_hour <= 23`.
    pub fn new(first_hour: u32, last_hour: u32) -> Option<Self> {
        if first_hour > last_hour || last_hour > 23 {
            return None;
        }
        Some(Self {
            first_hour,
            last_hour,
        })
    }

    pub fn first_hour(&self) -> u32 {
        self.first_hour
    }

    pub fn last_hour(&self) -> u32 {
        self.last_hour
    }

    pub fn hours(&self) -> Vec<NaiveTime> {
        (self.first_hour..=self.last_hour)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect()
    }
}

/// One `(date, hour)` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCell<'a> {
    pub slot: Slot,
    pub block: Option<&'a TimeBlock>,
    pub task: Option<&'a Task>,
    pub category: Option<&'a Category>,
}

impl ScheduleCell<'_> {
    /// A cell whose block points at a task missing from the cache renders
    /// empty and can be assigned over.
    pub fn is_empty(&self) -> bool {
        self.task.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow<'a> {
    pub time: NaiveTime,
    /// One cell per displayed date, in date order.
    pub cells: Vec<ScheduleCell<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleView<'a> {
    pub mode: CalendarMode,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<ScheduleRow<'a>>,
    /// Every block stored on a displayed date in slot order, including
    /// blocks whose hour falls outside the grid.
    pub blocks: Vec<ScheduleCell<'a>>,
}

impl<'a> ScheduleView<'a> {
    pub fn build(
        state: &'a AppState,
        mode: CalendarMode,
        anchor: NaiveDate,
        grid: ScheduleGrid,
    ) -> Self {
        let dates = mode.dates(anchor);
        let rows = grid
            .hours()
            .into_iter()
            .map(|time| ScheduleRow {
                time,
                cells: dates
                    .iter()
                    .map(|date| resolve_cell(state, Slot::new(*date, time)))
                    .collect(),
            })
            .collect();
        let mut blocks: Vec<ScheduleCell<'a>> = state
            .time_blocks
            .iter()
            .filter(|block| dates.contains(&block.date))
            .map(|block| resolve_block(state, block))
            .collect();
        blocks.sort_by_key(|cell| cell.slot);
        Self {
            mode,
            dates,
            rows,
            blocks,
        }
    }

    /// Blocks on displayed dates that have no grid cell.
    pub fn off_grid(&self) -> impl Iterator<Item = &ScheduleCell<'a>> {
        self.blocks
            .iter()
            .filter(move |cell| self.cell(cell.slot).is_none())
    }

    pub fn cell(&self, slot: Slot) -> Option<&ScheduleCell<'a>> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .find(|cell| cell.slot == slot)
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| !cell.is_empty())
            .count()
    }
}

/// First block in `blocks` whose slot equals `slot`.
pub fn find_block(blocks: &[TimeBlock], slot: Slot) -> Option<&TimeBlock> {
    blocks.iter().find(|block| block.slot() == slot)
}

/// Tasks offered by the picker: everything not completed.
pub fn pickable_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_active()).collect()
}

fn resolve_cell(state: &AppState, slot: Slot) -> ScheduleCell<'_> {
    match find_block(&state.time_blocks, slot) {
        Some(block) => resolve_block(state, block),
        None => ScheduleCell {
            slot,
            block: None,
            task: None,
            category: None,
        },
    }
}

fn resolve_block<'a>(state: &'a AppState, block: &'a TimeBlock) -> ScheduleCell<'a> {
    let task = state.task(block.task_id);
    let category = task
        .and_then(|task| task.category_id)
        .and_then(|category_id| state.category(category_id));
    ScheduleCell {
        slot: block.slot(),
        block: Some(block),
        task,
        category,
    }
}

/// Write requested by a completed pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub task_id: TaskId,
    pub slot: Slot,
}

/// Picker interaction: `Idle -> Picking(slot) -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignFlow {
    #[default]
    Idle,
    Picking(Slot),
}

impl AssignFlow {
    /// Opens the picker for `slot`. Ignored while a picker is already open.
    pub fn tap(&mut self, slot: Slot) {
        if *self == Self::Idle {
            *self = Self::Picking(slot);
        }
    }

    /// Closes the picker and returns the assignment to write, if one was open.
    pub fn select(&mut self, task_id: TaskId) -> Option<Assignment> {
        match std::mem::take(self) {
            Self::Picking(slot) => Some(Assignment { task_id, slot }),
            Self::Idle => None,
        }
    }

    /// Closes the picker without writing.
    pub fn dismiss(&mut self) {
        *self = Self::Idle;
    }

    pub fn picking(&self) -> Option<Slot> {
        match self {
            Self::Picking(slot) => Some(*slot),
            Self::Idle => None,
        }
    }
}
