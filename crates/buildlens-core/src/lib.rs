//! buildlens-core
//!
//! Build-metrics report aggregation and multi-sink publishing.
//!
//! # Modules
//! - **domain**: task records, environment, the execution report, errors
//! - **ports**: `Clock`, `IdGenerator`, `Sink`
//! - **metrics**: pluggable collectors from raw build facts to report fields
//! - **analysis**: critical path estimation, task and build filters
//! - **app**: report builder, sink dispatcher, publish pipeline
//! - **sinks**: InfluxDB, GEXF/DOT graphs, JSON, console output
//! - **config**: `buildlens.toml`

pub mod analysis;
pub mod app;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod sinks;

pub use app::{BuildOutcome, DispatchSummary, ReportPipeline};
pub use config::BuildlensConfig;
pub use domain::{ExecutionReport, PublishError, TaskRecord, TaskState};
pub use metrics::BuildContext;
