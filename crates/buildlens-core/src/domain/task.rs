//! Task record: one executed unit of work inside a build.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use super::TaskState;

/// Hierarchical task identifier, e.g. `:app:compileKotlin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPath(String);

impl TaskPath {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for TaskPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Timing and state of one task execution.
///
/// Design:
/// - Produced by the build-system integration; the core never invents records.
/// - `dependencies` may reference paths that are not part of the build. Those are
///   treated as "not found" by every consumer, never as an error.
/// - `on_critical_path` is owned by the critical path estimator. The report builder
///   clears it before the estimator runs.
/// - Deserialized records are normalised like the builders do: repeated dependencies
///   are dropped (first occurrence kept) and `stop_ms` is clamped to `start_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTaskRecord")]
pub struct TaskRecord {
    pub path: TaskPath,
    pub module: String,
    pub state: TaskState,
    pub duration_ms: u64,
    pub start_ms: u64,
    pub stop_ms: u64,

    /// Worker/thread that ran the task.
    #[serde(default)]
    pub worker_id: String,

    /// Paths this task depends on, in declaration order, without duplicates.
    #[serde(default)]
    pub dependencies: Vec<TaskPath>,

    /// True when no other task of the build depends on this one.
    #[serde(default)]
    pub is_root_node: bool,

    #[serde(default)]
    pub on_critical_path: bool,
}

/// Wire shape of `TaskRecord` before normalisation.
#[derive(Deserialize)]
struct RawTaskRecord {
    path: TaskPath,
    module: String,
    state: TaskState,
    duration_ms: u64,
    start_ms: u64,
    stop_ms: u64,
    #[serde(default)]
    worker_id: String,
    #[serde(default)]
    dependencies: Vec<TaskPath>,
    #[serde(default)]
    is_root_node: bool,
    #[serde(default)]
    on_critical_path: bool,
}

impl From<RawTaskRecord> for TaskRecord {
    fn from(raw: RawTaskRecord) -> Self {
        let mut dependencies: Vec<TaskPath> = Vec::with_capacity(raw.dependencies.len());
        for path in raw.dependencies {
            if !dependencies.contains(&path) {
                dependencies.push(path);
            }
        }
        Self {
            path: raw.path,
            module: raw.module,
            state: raw.state,
            duration_ms: raw.duration_ms,
            start_ms: raw.start_ms,
            stop_ms: raw.stop_ms.max(raw.start_ms),
            worker_id: raw.worker_id,
            dependencies,
            is_root_node: raw.is_root_node,
            on_critical_path: raw.on_critical_path,
        }
    }
}

impl TaskRecord {
    pub fn new(path: impl Into<TaskPath>, module: impl Into<String>, state: TaskState) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
            state,
            duration_ms: 0,
            start_ms: 0,
            stop_ms: 0,
            worker_id: String::new(),
            dependencies: Vec::new(),
            is_root_node: false,
            on_critical_path: false,
        }
    }

    /// Set start/stop; `duration_ms` follows from them.
    pub fn with_timing(mut self, start_ms: u64, stop_ms: u64) -> Self {
        self.start_ms = start_ms;
        self.stop_ms = stop_ms.max(start_ms);
        self.duration_ms = self.stop_ms - self.start_ms;
        self
    }

    pub fn with_worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = worker_id.into();
        self
    }

    /// Add a dependency. Repeated paths are ignored.
    pub fn depends_on(mut self, path: impl Into<TaskPath>) -> Self {
        let path = path.into();
        if !self.dependencies.contains(&path) {
            self.dependencies.push(path);
        }
        self
    }

    pub fn as_root(mut self) -> Self {
        self.is_root_node = true;
        self
    }
}
