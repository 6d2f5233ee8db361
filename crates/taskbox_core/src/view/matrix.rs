//! Eisenhower matrix projection over active tasks.

use crate::model::task::{Quadrant, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixView<'a> {
    pub do_first: Vec<&'a Task>,
    pub schedule: Vec<&'a Task>,
    pub delegate: Vec<&'a Task>,
    pub eliminate: Vec<&'a Task>,
}

impl<'a> MatrixView<'a> {
    /// Places every active task in exactly one quadrant. Completed tasks are
    /// left out.
    pub fn build(tasks: &'a [Task]) -> Self {
        let mut view = Self::default();
        for task in tasks.iter().filter(|task| task.is_active()) {
            view.bucket_mut(task.quadrant()).push(task);
        }
        view
    }

    pub fn quadrant(&self, quadrant: Quadrant) -> &[&'a Task] {
        match quadrant {
            Quadrant::DoFirst => &self.do_first,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Eliminate => &self.eliminate,
        }
    }

    pub fn len(&self) -> usize {
        Quadrant::ALL.iter().map(|q| self.quadrant(*q).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, quadrant: Quadrant) -> &mut Vec<&'a Task> {
        match quadrant {
            Quadrant::DoFirst => &mut self.do_first,
            Quadrant::Schedule => &mut self.schedule,
            Quadrant::Delegate => &mut self.delegate,
            Quadrant::Eliminate => &mut self.eliminate,
        }
    }
}
