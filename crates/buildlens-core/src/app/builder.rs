//! ReportBuilder: assembles the immutable `ExecutionReport` of one build.
//!
//! Stages:
//! 1. `collect` runs the metric registry against the raw build facts and yields a
//!    `ReportDraft` (environment, identity, custom properties, a fresh build id).
//! 2. `build` derives timings, applies the task filter, re-estimates the critical path
//!    over the published tasks and freezes the result. The flags are mirrored into the
//!    unfiltered list so graph and report views agree.
//!
//! Neither stage has side effects beyond constructing values.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::analysis::{TaskFilter, estimate_critical_path};
use crate::domain::{
    BuildId, CustomProperties, Environment, ExecutionReport, TaskPath, TaskRecord,
};
use crate::metrics::{BuildContext, MetricRegistry};
use crate::ports::IdGenerator;

/// Timing and tasks of a finished build, as reported by the build tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildOutcome {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    pub begin_ms: u64,
    /// End of the configuration phase, when it was captured.
    #[serde(default)]
    pub configuration_ms: Option<u64>,
    pub end_ms: u64,
    #[serde(default)]
    pub success: bool,
}

/// Report fields gathered before the build outcome is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDraft {
    pub environment: Environment,
    pub custom_properties: CustomProperties,
    pub root_project: Option<String>,
    pub requested_tasks: Option<String>,
    pub scan_link: Option<String>,
    pub build_invocation_id: Option<String>,
    pub build_id: Option<BuildId>,
}

/// Turns raw build facts into an `ExecutionReport`.
///
/// Owns the metric catalogue, the build id source, configured custom properties and
/// the task filter. Construct with `new` and chain `with_*`.
pub struct ReportBuilder {
    metrics: MetricRegistry,
    id_generator: Arc<dyn IdGenerator>,
    custom_properties: CustomProperties,
    task_filter: TaskFilter,
}

impl ReportBuilder {
    /// Builder with no metrics, no custom properties and a filter that keeps every task.
    pub fn new(id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            metrics: MetricRegistry::new(),
            id_generator,
            custom_properties: CustomProperties::default(),
            task_filter: TaskFilter::allow_all(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricRegistry) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_custom_properties(mut self, custom_properties: CustomProperties) -> Self {
        self.custom_properties = custom_properties;
        self
    }

    pub fn with_task_filter(mut self, task_filter: TaskFilter) -> Self {
        self.task_filter = task_filter;
        self
    }

    /// Runs every registered metric against `context` and stamps a fresh build id.
    pub fn collect(&self, context: &BuildContext) -> ReportDraft {
        let mut draft = ReportDraft::default();
        self.metrics.collect_into(context, &mut draft);
        draft.build_id = Some(self.id_generator.generate_build_id());
        draft.custom_properties = self.custom_properties.clone();
        draft
    }

    /// Freezes the report. Critical-path flags are recomputed over the tasks that pass
    /// the filter; a filtered-out root leaves every task unmarked.
    pub fn build(&self, outcome: BuildOutcome, draft: ReportDraft) -> ExecutionReport {
        let BuildOutcome {
            mut tasks,
            begin_ms,
            configuration_ms,
            end_ms,
            success,
        } = outcome;

        for task in &mut tasks {
            task.on_critical_path = false;
        }
        let mut filtered = self.task_filter.filter(&tasks);
        let critical = estimate_critical_path(&mut filtered);
        tracing::debug!(
            tasks = tasks.len(),
            published = filtered.len(),
            critical = critical.len(),
            "critical path estimated"
        );

        let on_path: HashSet<TaskPath> = critical.into_iter().collect();
        for task in &mut tasks {
            task.on_critical_path = on_path.contains(&task.path);
        }

        ExecutionReport {
            environment: draft.environment,
            custom_properties: draft.custom_properties,
            begin_ms,
            end_ms,
            duration_ms: end_ms.saturating_sub(begin_ms),
            configuration_duration_ms: configuration_ms.map(|ms| ms.saturating_sub(begin_ms)),
            tasks: filtered,
            unfiltered_tasks: tasks,
            requested_tasks: draft.requested_tasks,
            build_id: draft.build_id,
            root_project: draft.root_project,
            success,
            scan_link: draft.scan_link,
            build_invocation_id: draft.build_invocation_id,
        }
    }
}
