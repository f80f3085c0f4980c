//! Sink port: one destination for a finished report.

use async_trait::async_trait;

use crate::domain::{ExecutionReport, PublishError};

/// A destination that consumes a finished report.
///
/// Design:
/// - The report is read-only; a sink never mutates it.
/// - A sink owns its own failure. An `Err` is logged by the dispatcher with `name()` and
///   never reaches other sinks.
/// - Sinks are shared as `Arc<dyn Sink>` and may be called concurrently.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs, e.g. `influxdb`.
    fn name(&self) -> &str;

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError>;
}
