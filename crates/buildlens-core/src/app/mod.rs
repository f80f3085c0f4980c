//! Application layer: report assembly and fan-out.
//!
//! - **ReportBuilder**: metrics → draft → frozen report
//! - **SinkDispatcher**: one task per sink, failures isolated
//! - **ReportPipeline**: the publish operation wiring both

pub mod builder;
pub mod dispatcher;
pub mod pipeline;

pub use self::builder::{BuildOutcome, ReportBuilder, ReportDraft};
pub use self::dispatcher::{DispatchHandle, DispatchSummary, SinkDispatcher};
pub use self::pipeline::ReportPipeline;
