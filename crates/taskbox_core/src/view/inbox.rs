//! Inbox projection: active tasks, plus a collapsible completed section.

use crate::model::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxView<'a> {
    pub active: Vec<&'a Task>,
    /// Empty unless the completed section is expanded.
    pub completed: Vec<&'a Task>,
    pub completed_count: usize,
    pub show_completed: bool,
}

impl<'a> InboxView<'a> {
    /// Partitions `tasks` by `is_completed`, keeping input order in each group.
    pub fn build(tasks: &'a [Task], show_completed: bool) -> Self {
        let (completed, active): (Vec<&Task>, Vec<&Task>) =
            tasks.iter().partition(|task| task.is_completed);
        let completed_count = completed.len();
        Self {
            active,
            completed: if show_completed { completed } else { Vec::new() },
            completed_count,
            show_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InboxView;
    use crate::model::task::Task;

    fn task(title: &str, is_completed: bool) -> Task {
        let mut task = Task::new(title, None).unwrap();
        task.is_completed = is_completed;
        task
    }

    #[test]
    fn completed_section_is_hidden_by_default() {
        let tasks = vec![task("a", false), task("b", true), task("c", false)];
        let view = InboxView::build(&tasks, false);
        assert_eq!(
            view.active.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert!(view.completed.is_empty());
        assert_eq!(view.completed_count, 1);
    }

    #[test]
    fn expanded_view_lists_completed_tasks() {
        let tasks = vec![task("a", true), task("b", true)];
        let view = InboxView::build(&tasks, true);
        assert!(view.active.is_empty());
        assert_eq!(view.completed.len(), 2);
    }
}
