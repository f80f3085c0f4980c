//! Task outcome states as reported by the host build tool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final state of one task execution.
///
/// Serialized as SCREAMING_SNAKE_CASE (`FROM_CACHE`, `UP_TO_DATE`, ...). The same text
/// is used as the `state` tag of task points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// The task action actually ran.
    Executed,
    /// Outputs were restored from the build cache.
    FromCache,
    /// Inputs and outputs were unchanged since the previous run.
    UpToDate,
    /// The task was skipped (disabled or excluded).
    Skipped,
    /// The task had no inputs to work on.
    NoSource,
    /// The task action ran and failed.
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Executed => "EXECUTED",
            TaskState::FromCache => "FROM_CACHE",
            TaskState::UpToDate => "UP_TO_DATE",
            TaskState::Skipped => "SKIPPED",
            TaskState::NoSource => "NO_SOURCE",
            TaskState::Failed => "FAILED",
        }
    }

    /// Was the result satisfied from a cached output?
    pub fn is_cached(self) -> bool {
        matches!(self, TaskState::FromCache)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::executed(TaskState::Executed)]
    #[case::from_cache(TaskState::FromCache)]
    #[case::up_to_date(TaskState::UpToDate)]
    #[case::skipped(TaskState::Skipped)]
    #[case::no_source(TaskState::NoSource)]
    #[case::failed(TaskState::Failed)]
    fn serde_name_matches_display(#[case] state: TaskState) {
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, format!("\"{state}\""));
    }

    #[test]
    fn only_from_cache_counts_as_cached() {
        assert!(TaskState::FromCache.is_cached());
        assert!(!TaskState::UpToDate.is_cached());
        assert!(!TaskState::Executed.is_cached());
    }
}
