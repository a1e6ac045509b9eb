// Data models for the task list

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a task; unique within a list for the task's lifetime
pub type TaskId = u64;

/// Default creation timestamp format, e.g. `10/18/2026, 3:04:05 PM`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// A single to-do item
///
/// Field names on the wire follow the stored layout (`createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: String,
}

impl Task {
    /// Create a pending task
    pub fn new(id: TaskId, text: impl Into<String>, priority: Priority, created_at: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            completed: false,
            created_at: created_at.into(),
        }
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Priority::High
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    High,
}

impl Priority {
    /// Low becomes High and High becomes Low
    pub fn toggled(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "high" => Ok(Priority::High),
            other => Err(eyre!("Unknown priority: {} (expected Low or High)", other)),
        }
    }
}

/// Check that every specifier in `format` is one chrono understands
pub fn validate_timestamp_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(eyre!("Invalid timestamp format: {}", format));
    }
    Ok(())
}

/// Current local time rendered with the given chrono format string
///
/// An unusable format renders with [`DEFAULT_TIMESTAMP_FORMAT`] instead.
pub fn timestamp_now(format: &str) -> String {
    use std::fmt::Write;

    let now = Local::now();
    let mut rendered = String::new();
    if write!(rendered, "{}", now.format(format)).is_err() {
        rendered = now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
    }
    rendered
}
