//! Plain-text rendering of the views.

use std::fmt::Write;
use taskbox_core::model::time_block::format_time;
use taskbox_core::view::schedule::ScheduleCell;
use taskbox_core::{AppState, Category, InboxView, MatrixView, Quadrant, ScheduleView, Task};

const CELL_WIDTH: usize = 14;

pub fn inbox(view: &InboxView<'_>, state: &AppState) -> String {
    let mut out = String::new();
    if view.active.is_empty() {
        out.push_str("No active tasks.\n");
    }
    for task in &view.active {
        push_task_line(&mut out, task, state);
    }

    if view.completed_count > 0 {
        let _ = writeln!(
            out,
            "\nCompleted ({}){}",
            view.completed_count,
            if view.show_completed {
                ""
            } else {
                " [--show-completed to expand]"
            }
        );
        for task in &view.completed {
            push_task_line(&mut out, task, state);
        }
    }
    out
}

pub fn matrix(view: &MatrixView<'_>, state: &AppState) -> String {
    let mut out = String::new();
    for quadrant in Quadrant::ALL {
        let tasks = view.quadrant(quadrant);
        let _ = writeln!(out, "== {} ({}) ==", quadrant.label(), tasks.len());
        for task in tasks {
            push_task_line(&mut out, task, state);
        }
    }
    out
}

pub fn schedule(view: &ScheduleView<'_>) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<6}", "");
    for date in &view.dates {
        let _ = write!(out, "| {:<width$}", date.format("%a %m-%d").to_string(), width = CELL_WIDTH);
    }
    out.push('\n');

    for row in &view.rows {
        let _ = write!(out, "{:<6}", format_time(row.time));
        for cell in &row.cells {
            let _ = write!(out, "| {:<width$}", cell_label(cell), width = CELL_WIDTH);
        }
        out.push('\n');
    }

    if !view.blocks.is_empty() {
        out.push_str("\nBlocks:\n");
        for cell in &view.blocks {
            let Some(block) = cell.block else {
                continue;
            };
            let title = cell.task.map_or("(missing task)", |task| task.title.as_str());
            let marker = if view.cell(cell.slot).is_none() {
                "  [off grid]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {} {} {}  {title}{marker}",
                cell.slot.date,
                format_time(cell.slot.start_time),
                block.id,
            );
        }
    }
    out
}

pub fn categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(
            out,
            "{}  {:<12} {}{}",
            category.id,
            category.name,
            category.color,
            if category.is_system { " (system)" } else { "" }
        );
    }
    out
}

fn push_task_line(out: &mut String, task: &Task, state: &AppState) {
    let mark = if task.is_completed { "x" } else { " " };
    let category = task
        .category_id
        .and_then(|id| state.category(id))
        .map(|category| format!(" #{}", category.name))
        .unwrap_or_default();
    let _ = writeln!(out, "[{mark}] {}{category}  ({})", task.title, task.id);
}

fn cell_label(cell: &ScheduleCell<'_>) -> String {
    match cell.task {
        Some(task) => truncate(&task.title, CELL_WIDTH),
        None => "+".to_string(),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut short: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('~');
    short
}

#[cfg(test)]
mod tests {
    use super::{inbox, matrix, schedule, truncate};
    use chrono::NaiveTime;
    use taskbox_core::{
        parse_date, AppState, CalendarMode, InboxView, MatrixView, ScheduleGrid, ScheduleView,
        Slot, Task, TimeBlock,
    };

    fn state_with(tasks: Vec<Task>) -> AppState {
        AppState {
            tasks,
            ..AppState::default()
        }
    }

    #[test]
    fn inbox_collapses_completed_tasks() {
        let open = Task::new("write report", None).unwrap();
        let mut done = Task::new("buy milk", None).unwrap();
        done.is_completed = true;
        let state = state_with(vec![open, done]);

        let text = inbox(&InboxView::build(&state.tasks, false), &state);
        assert!(text.contains("[ ] write report"));
        assert!(text.contains("Completed (1)"));
        assert!(!text.contains("buy milk"));

        let text = inbox(&InboxView::build(&state.tasks, true), &state);
        assert!(text.contains("[x] buy milk"));
    }

    #[test]
    fn matrix_prints_every_quadrant() {
        let mut task = Task::new("ship", None).unwrap();
        task.is_urgent = true;
        task.is_important = true;
        let state = state_with(vec![task]);
        let text = matrix(&MatrixView::build(&state.tasks), &state);
        assert_eq!(text.matches("==").count(), 8);
        assert!(text.contains("ship"));
    }

    #[test]
    fn schedule_lists_occupied_blocks() {
        let task = Task::new("gym", None).unwrap();
        let date = parse_date("2024-01-01").unwrap();
        let slot = Slot::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        let block = TimeBlock::for_slot(task.id, slot);
        let state = AppState {
            tasks: vec![task],
            categories: Vec::new(),
            time_blocks: vec![block.clone()],
        };

        let view = ScheduleView::build(&state, CalendarMode::Day, date, ScheduleGrid::default());
        let text = schedule(&view);
        assert!(text.contains("09:00 | gym"));
        assert!(text.contains(&block.id.to_string()));
    }

    #[test]
    fn schedule_lists_blocks_outside_the_grid() {
        let task = Task::new("night shift", None).unwrap();
        let date = parse_date("2024-01-01").unwrap();
        let late = TimeBlock::for_slot(
            task.id,
            Slot::new(date, NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
        );
        let other_day = TimeBlock::for_slot(
            task.id,
            Slot::new(
                parse_date("2024-01-05").unwrap(),
                NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            ),
        );
        let state = AppState {
            tasks: vec![task],
            categories: Vec::new(),
            time_blocks: vec![late.clone(), other_day.clone()],
        };

        let view = ScheduleView::build(&state, CalendarMode::Day, date, ScheduleGrid::default());
        let text = schedule(&view);
        assert!(text.contains(&format!("2024-01-01 23:00 {}  night shift  [off grid]", late.id)));
        assert!(!text.contains(&other_day.id.to_string()));
    }

    #[test]
    fn truncate_marks_cut_titles() {
        assert_eq!(truncate("short", 14), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }
}
