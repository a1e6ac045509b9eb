// Filter modes and the derived task view

use crate::models::Task;
use eyre::{Result, eyre};
use std::str::FromStr;

/// View criterion selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Pending,
    Priority,
}

impl FilterMode {
    pub const ALL_MODES: [FilterMode; 4] = [
        FilterMode::All,
        FilterMode::Completed,
        FilterMode::Pending,
        FilterMode::Priority,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Completed => "Completed",
            FilterMode::Pending => "Pending",
            FilterMode::Priority => "Priority",
        }
    }

    /// Decode a stored mode string; anything unrecognized means `All`
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL_MODES
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| eyre!("Unknown filter mode: {} (expected All, Completed, Pending or Priority)", wanted))
    }
}

/// Derive the displayed sequence from `tasks` under `mode`
///
/// The input is never reordered. `Priority` is a stable partition: High
/// tasks first, then the rest, each group in original order.
pub fn view(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    match mode {
        FilterMode::All => tasks.iter().collect(),
        FilterMode::Completed => tasks.iter().filter(|t| t.completed).collect(),
        FilterMode::Pending => tasks.iter().filter(|t| !t.completed).collect(),
        FilterMode::Priority => tasks
            .iter()
            .filter(|t| t.is_high_priority())
            .chain(tasks.iter().filter(|t| !t.is_high_priority()))
            .collect(),
    }
}
