//! Metrics: pluggable collectors that turn raw build facts into report fields.
//!
//! A metric is a provider/assigner pair. The provider reads a `BuildContext` and may
//! come back empty; the assigner writes the value into a `ReportDraft`. A metric that
//! finds nothing leaves the draft untouched, so one missing fact never blocks a report.
//!
//! Design:
//! - `Metric` is generic over its value type. `DynMetric` erases it so metrics of
//!   different types live in one ordered `MetricRegistry`.
//! - Registration order is evaluation order. Later metrics may overwrite fields written
//!   by earlier ones.

pub mod catalogue;
pub mod context;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::app::ReportDraft;

pub use self::catalogue::{default_registry, parse_memory_size};
pub use self::context::{BuildContext, CacheStats, HostFacts, RemoteCache, StartParameters, VcsFacts};

/// One named fact of the report.
///
/// `collect` reads a value from the build context; `assign` stores it in the draft.
/// A `None` from `collect` skips `assign`.
pub trait Metric: Send + Sync {
    type Value;

    /// Unique name within a registry.
    fn name(&self) -> &str;

    fn collect(&self, context: &BuildContext) -> Option<Self::Value>;

    fn assign(&self, value: Self::Value, draft: &mut ReportDraft);
}

/// Object-safe view of a `Metric`.
pub trait DynMetric: Send + Sync {
    fn name(&self) -> &str;

    /// Collect and assign in one step. Returns `false` when nothing was collected.
    fn apply(&self, context: &BuildContext, draft: &mut ReportDraft) -> bool;
}

impl<M: Metric> DynMetric for M {
    fn name(&self) -> &str {
        Metric::name(self)
    }

    fn apply(&self, context: &BuildContext, draft: &mut ReportDraft) -> bool {
        match self.collect(context) {
            Some(value) => {
                self.assign(value, draft);
                true
            }
            None => false,
        }
    }
}

/// A metric built from two closures.
pub struct FnMetric<V, P, A> {
    name: String,
    provider: P,
    assigner: A,
    _value: PhantomData<fn() -> V>,
}

impl<V, P, A> FnMetric<V, P, A>
where
    P: Fn(&BuildContext) -> Option<V> + Send + Sync,
    A: Fn(V, &mut ReportDraft) + Send + Sync,
{
    pub fn new(name: impl Into<String>, provider: P, assigner: A) -> Self {
        Self {
            name: name.into(),
            provider,
            assigner,
            _value: PhantomData,
        }
    }
}

impl<V, P, A> Metric for FnMetric<V, P, A>
where
    P: Fn(&BuildContext) -> Option<V> + Send + Sync,
    A: Fn(V, &mut ReportDraft) + Send + Sync,
{
    type Value = V;

    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self, context: &BuildContext) -> Option<V> {
        (self.provider)(context)
    }

    fn assign(&self, value: V, draft: &mut ReportDraft) {
        (self.assigner)(value, draft)
    }
}

/// Registration failure of a `MetricRegistry`.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Metric '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Ordered set of metrics, unique by name.
#[derive(Default)]
pub struct MetricRegistry {
    metrics: Vec<Arc<dyn DynMetric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Metric + 'static>(&mut self, metric: M) -> Result<(), RegistryError> {
        let name = Metric::name(&metric).to_string();
        if self.metrics.iter().any(|m| m.name() == name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.metrics.push(Arc::new(metric));
        Ok(())
    }

    /// Shorthand for registering an `FnMetric`.
    pub fn register_fn<V, P, A>(
        &mut self,
        name: &str,
        provider: P,
        assigner: A,
    ) -> Result<(), RegistryError>
    where
        V: 'static,
        P: Fn(&BuildContext) -> Option<V> + Send + Sync + 'static,
        A: Fn(V, &mut ReportDraft) + Send + Sync + 'static,
    {
        self.register(FnMetric::new(name, provider, assigner))
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Run every metric in registration order against `context`.
    pub fn collect_into(&self, context: &BuildContext, draft: &mut ReportDraft) {
        for metric in &self.metrics {
            if !metric.apply(context, draft) {
                tracing::debug!(metric = metric.name(), "metric not available");
            }
        }
    }
}
