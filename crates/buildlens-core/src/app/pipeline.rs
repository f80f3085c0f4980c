//! ReportPipeline: the top-level publish operation.
//!
//! collect → build (critical path, task filter) → build filter → dispatch.

use std::sync::Arc;

use crate::analysis::{BuildFilter, TaskFilter};
use crate::config::BuildlensConfig;
use crate::domain::{ConfigError, ExecutionReport};
use crate::metrics::{BuildContext, default_registry};
use crate::ports::{Clock, UlidGenerator};
use crate::sinks;

use super::builder::{BuildOutcome, ReportBuilder};
use super::dispatcher::{DispatchHandle, SinkDispatcher};

/// End-to-end publication of one build: collect, build, build filter, dispatch.
///
/// `from_config` wires the metric catalogue, both filters and the enabled sinks and
/// fails fast on invalid patterns, before any report exists.
pub struct ReportPipeline {
    builder: ReportBuilder,
    build_filter: BuildFilter,
    dispatcher: SinkDispatcher,
}

impl ReportPipeline {
    pub fn new(builder: ReportBuilder, dispatcher: SinkDispatcher) -> Self {
        Self {
            builder,
            build_filter: BuildFilter::default(),
            dispatcher,
        }
    }

    pub fn with_build_filter(mut self, build_filter: BuildFilter) -> Self {
        self.build_filter = build_filter;
        self
    }

    /// Wire the default metric catalogue, the configured filters and sinks.
    ///
    /// Fails fast on invalid filter patterns.
    pub fn from_config(config: &BuildlensConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let builder = ReportBuilder::new(Arc::new(UlidGenerator::new(Arc::clone(&clock))))
            .with_metrics(default_registry()?)
            .with_custom_properties(config.custom_properties())
            .with_task_filter(TaskFilter::new(&config.filter)?);
        let dispatcher = SinkDispatcher::new(sinks::from_config(config, clock));
        let build_filter = BuildFilter::new(&config.filter.build)?;

        tracing::debug!(sinks = ?dispatcher.sink_names(), "pipeline configured");
        Ok(Self::new(builder, dispatcher).with_build_filter(build_filter))
    }

    pub fn assemble(&self, outcome: BuildOutcome, context: &BuildContext) -> ExecutionReport {
        let draft = self.builder.collect(context);
        self.builder.build(outcome, draft)
    }

    /// Assemble the report and hand it to every sink.
    ///
    /// Returns `None` when the build filter rejects the report.
    pub fn publish(&self, outcome: BuildOutcome, context: &BuildContext) -> Option<DispatchHandle> {
        let report = self.assemble(outcome, context);
        if !self.build_filter.should_publish(&report) {
            tracing::info!(
                success = report.success,
                requested_tasks = report.requested_tasks.as_deref().unwrap_or_default(),
                "report skipped by build filter"
            );
            return None;
        }
        tracing::info!(
            build_id = ?report.build_id.map(|id| id.to_string()),
            tasks = report.tasks.len(),
            "publishing report"
        );
        Some(self.dispatcher.dispatch(Arc::new(report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BuildFilterConfig;
    use crate::app::dispatcher::test_sinks::CountingSink;
    use crate::domain::{TaskRecord, TaskState};
    use crate::ports::SystemClock;

    fn outcome(success: bool) -> BuildOutcome {
        BuildOutcome {
            tasks: vec![TaskRecord::new(":app:compile", "app", TaskState::Executed).with_timing(0, 10)],
            begin_ms: 1_000,
            configuration_ms: Some(1_200),
            end_ms: 5_000,
            success,
        }
    }

    fn pipeline(counting: Arc<CountingSink>) -> ReportPipeline {
        let builder = ReportBuilder::new(Arc::new(UlidGenerator::new(SystemClock)));
        ReportPipeline::new(builder, SinkDispatcher::default().with_sink(counting))
    }

    #[tokio::test]
    async fn publishes_to_every_sink() {
        let counting = Arc::new(CountingSink::default());
        let handle = pipeline(counting.clone())
            .publish(outcome(true), &BuildContext::default())
            .unwrap();

        let summary = handle.join().await;
        assert_eq!(summary.published, 1);
        assert_eq!(counting.calls(), 1);
    }

    #[tokio::test]
    async fn build_filter_skips_publication() {
        let counting = Arc::new(CountingSink::default());
        let filter = BuildFilter::new(&BuildFilterConfig {
            success: Some(true),
            ..BuildFilterConfig::default()
        })
        .unwrap();

        let handle = pipeline(counting.clone())
            .with_build_filter(filter)
            .publish(outcome(false), &BuildContext::default());

        assert!(handle.is_none());
        assert_eq!(counting.calls(), 0);
    }

    #[test]
    fn from_config_rejects_invalid_patterns() {
        let config = BuildlensConfig::from_toml_str("[filter.modules]\nincludes = [\"(\"]").unwrap();
        let result = ReportPipeline::from_config(&config, Arc::new(SystemClock));
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn assemble_uses_configured_properties() {
        let config = BuildlensConfig::from_toml_str(
            "[metrics.build_properties]\nteam = \"mobile\"",
        )
        .unwrap();
        let pipeline = ReportPipeline::from_config(&config, Arc::new(SystemClock)).unwrap();

        let context = BuildContext {
            root_project_name: Some("shop".to_string()),
            ..BuildContext::default()
        };
        let report = pipeline.assemble(outcome(true), &context);

        assert_eq!(report.configuration_duration_ms, Some(200));
        assert_eq!(report.root_project.as_deref(), Some("shop"));
        let env = report.flatten_build_env();
        assert_eq!(env.get("team").map(String::as_str), Some("mobile"));
        assert_eq!(env.get("cacheMode").map(String::as_str), Some("local"));
        assert!(env.contains_key("buildId"));
    }
}
