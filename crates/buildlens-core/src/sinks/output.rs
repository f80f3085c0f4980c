//! Console summary of a report, written through `tracing`.

use async_trait::async_trait;

use crate::domain::{ExecutionReport, PublishError, TaskRecord};
use crate::ports::Sink;

const SHRUG: &str = "¯\\_(ツ)_/¯";

/// Human readable summary of the published tasks, logged through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputSink;

impl OutputSink {
    pub fn new() -> Self {
        Self
    }

    /// Tasks longest first, or a shrug when there is nothing to show.
    pub fn render_lines(report: &ExecutionReport) -> Vec<String> {
        if report.tasks.is_empty() {
            return vec![SHRUG.to_string()];
        }

        let mut tasks: Vec<&TaskRecord> = report.tasks.iter().collect();
        // stable sort keeps list order among equal durations
        tasks.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));

        let mut lines: Vec<String> = tasks
            .iter()
            .map(|t| {
                let marker = if t.on_critical_path { " *" } else { "" };
                format!("{:>8} ms  {} [{}]{marker}", t.duration_ms, t.path, t.state)
            })
            .collect();

        let ratio = report
            .cache_ratio()
            .map(|r| format!("{:.0}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!(
            "{} tasks in {} ms, configuration {} ms, cache hits {ratio}",
            report.tasks.len(),
            report.duration_ms,
            report.configuration_duration_text(),
        ));
        lines
    }
}

#[async_trait]
impl Sink for OutputSink {
    fn name(&self) -> &str {
        "output"
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        for line in Self::render_lines(report) {
            tracing::info!(target: "buildlens::output", "{line}");
        }
        Ok(())
    }
}
