//! Whole report as pretty-printed JSON.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::{ExecutionReport, PublishError};
use crate::ports::Sink;

pub const FILE_NAME: &str = "data.json";

/// Writes the whole report as pretty JSON to `<output_dir>/data.json`.
pub struct JsonSink {
    output_dir: PathBuf,
}

impl JsonSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(FILE_NAME)
    }
}

#[async_trait]
impl Sink for JsonSink {
    fn name(&self) -> &str {
        "json"
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        let content = serde_json::to_string_pretty(report)?;
        super::write_output(&self.output_dir, &self.path(), content).await?;
        tracing::info!(path = %self.path().display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::fixtures::report_with_tasks;
    use crate::domain::{TaskRecord, TaskState};

    #[tokio::test]
    async fn writes_report_that_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with_tasks(vec![
            TaskRecord::new(":app:compile", "app", TaskState::Executed).with_timing(0, 10),
        ]);

        let sink = JsonSink::new(dir.path());
        sink.publish(&report).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data.json")).unwrap();
        let back: ExecutionReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, report);
    }

    #[tokio::test]
    async fn unwritable_directory_is_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // a regular file cannot be used as a directory
        let sink = JsonSink::new(file.path());
        let err = sink.publish(&report_with_tasks(vec![])).await.unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }
}
