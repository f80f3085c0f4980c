//! Analysis passes over the task records of one build.

pub mod critical_path;
pub mod filter;

pub use self::critical_path::estimate_critical_path;
pub use self::filter::{
    BuildFilter, BuildFilterConfig, FilterConfig, PatternFilter, StateFilter, TaskFilter,
    ThresholdConfig,
};
