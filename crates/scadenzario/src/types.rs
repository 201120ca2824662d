use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Priority of an assignment. Only affects styling, never urgency or ordering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A single homework assignment
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Opaque unique ID (UUID v4), assigned at creation
    pub id: String,

    pub title: String,

    /// Subject name, may be empty
    #[serde(default)]
    pub subject: String,

    /// Due date, serialized as YYYY-MM-DD
    pub due_date: NaiveDate,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Assignment {
    /// Create a pending assignment with a freshly generated ID
    pub fn new(title: String, subject: String, due_date: NaiveDate, priority: Priority) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            subject,
            due_date,
            priority,
            completed: false,
            notes: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// User input for a new assignment, as submitted by a form or the JSON API.
///
/// Fields stay raw strings so that missing or empty values can be reported
/// as validation errors instead of deserialization failures. A blank or
/// unrecognised priority falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentDraft {
    pub title: String,
    pub subject: String,
    pub due_date: String,
    #[serde(deserialize_with = "lenient_priority")]
    pub priority: Priority,
    pub notes: String,
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(Priority::default());
    }
    Ok(raw.parse().unwrap_or_else(|e: String| {
        warn!(error = %e, "Using default priority");
        Priority::default()
    }))
}

impl AssignmentDraft {
    pub fn new(title: &str, due_date: &str) -> Self {
        Self {
            title: title.to_string(),
            due_date: due_date.to_string(),
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }
}
