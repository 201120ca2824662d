//! Assignment store
//!
//! Owns the live collection and writes the whole of it back to the key-value
//! backend after every mutation. The collection is loaded once on `open`.
//! A mutation whose write fails is undone, so memory never runs ahead of
//! what was last stored.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::kv::{KeyValueStore, KvError};
use crate::types::{Assignment, AssignmentDraft};

/// Key under which the collection is stored
pub const STORAGE_KEY: &str = "assignments";

/// Reasons a draft is rejected by `add`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("due date is required")]
    MissingDueDate,

    #[error("invalid due date {0:?}, expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to encode assignments: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to persist assignments: {0}")]
    Persistence(#[from] KvError),
}

/// Stored data that could not be turned back into a collection
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {id} has an empty title")]
    InvalidRecord { id: String },

    #[error("duplicate id {0}")]
    DuplicateId(String),
}

pub struct AssignmentStore<S> {
    assignments: Vec<Assignment>,
    kv: S,
}

impl<S: KeyValueStore> AssignmentStore<S> {
    /// Load the collection from `kv`.
    ///
    /// Absent or corrupt data yields an empty store. Only a failing read
    /// from the backend itself is reported.
    pub fn open(kv: S) -> Result<Self, KvError> {
        let assignments = match kv.get(STORAGE_KEY)? {
            None => {
                debug!("No stored assignments, starting empty");
                Vec::new()
            }
            Some(raw) => match decode(&raw) {
                Ok(list) => {
                    debug!(count = list.len(), "Loaded assignments");
                    list
                }
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored assignments");
                    Vec::new()
                }
            },
        };

        Ok(Self { assignments, kv })
    }

    /// All assignments in insertion order
    pub fn list(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Validate a draft and append it as a new pending assignment
    pub fn add(&mut self, draft: AssignmentDraft) -> Result<Assignment, StoreError> {
        let (title, due_date) = validate(&draft)?;

        let mut assignment = Assignment::new(
            title,
            draft.subject.trim().to_string(),
            due_date,
            draft.priority,
        );
        let notes = draft.notes.trim();
        if !notes.is_empty() {
            assignment.notes = Some(notes.to_string());
        }

        self.assignments.push(assignment.clone());
        if let Err(e) = self.persist() {
            self.assignments.pop();
            return Err(e);
        }
        info!(id = %assignment.id, due = %assignment.due_date, "Assignment added");

        Ok(assignment)
    }

    /// Delete an assignment. Returns false, without writing, if `id` is unknown.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            debug!(id = id, "Remove ignored, unknown id");
            return Ok(false);
        };

        let removed = self.assignments.remove(idx);
        if let Err(e) = self.persist() {
            self.assignments.insert(idx, removed);
            return Err(e);
        }
        info!(id = id, "Assignment removed");
        Ok(true)
    }

    /// Flip the completed flag. Returns false, without writing, if `id` is unknown.
    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            debug!(id = id, "Toggle ignored, unknown id");
            return Ok(false);
        };

        self.assignments[idx].completed ^= true;
        if let Err(e) = self.persist() {
            self.assignments[idx].completed ^= true;
            return Err(e);
        }
        info!(id = id, completed = self.assignments[idx].completed, "Assignment toggled");
        Ok(true)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.assignments.iter().position(|a| a.id == id)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.assignments)?;
        self.kv.set(STORAGE_KEY, &json)?;
        Ok(())
    }
}

fn validate(draft: &AssignmentDraft) -> Result<(String, NaiveDate), ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    let due = draft.due_date.trim();
    if due.is_empty() {
        return Err(ValidationError::MissingDueDate);
    }

    let due_date = NaiveDate::parse_from_str(due, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(due.to_string()))?;

    Ok((title.to_string(), due_date))
}

fn decode(raw: &str) -> Result<Vec<Assignment>, DecodeError> {
    let list: Vec<Assignment> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for a in &list {
        if a.title.trim().is_empty() {
            return Err(DecodeError::InvalidRecord { id: a.id.clone() });
        }
        if !seen.insert(a.id.as_str()) {
            return Err(DecodeError::DuplicateId(a.id.clone()));
        }
    }

    Ok(list)
}
