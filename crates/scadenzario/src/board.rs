use chrono::NaiveDate;
use serde::Serialize;

use crate::types::Assignment;
use crate::urgency::{self, Urgency};

/// An assignment paired with its urgency for display
#[derive(Debug, Clone, Serialize)]
pub struct BoardItem<'a> {
    pub assignment: &'a Assignment,
    pub urgency: Urgency,
}

/// Derived view of the collection for one render.
///
/// Pending items are ordered by due date (stable, so ties keep insertion
/// order). Completed items keep insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct Board<'a> {
    pub pending: Vec<BoardItem<'a>>,
    pub completed: Vec<BoardItem<'a>>,
    pub summary: String,
}

impl<'a> Board<'a> {
    pub fn build(assignments: &'a [Assignment], today: NaiveDate) -> Self {
        let item = |assignment: &'a Assignment| BoardItem {
            assignment,
            urgency: urgency::classify(assignment, today),
        };

        let mut pending: Vec<BoardItem<'a>> = assignments
            .iter()
            .filter(|a| a.is_pending())
            .map(item)
            .collect();
        pending.sort_by_key(|i| i.assignment.due_date);

        let completed = assignments
            .iter()
            .filter(|a| a.completed)
            .map(item)
            .collect();

        Self {
            pending,
            completed,
            summary: urgency::summarize(assignments, today),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.completed.len()
    }
}
