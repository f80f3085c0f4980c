//! SinkDispatcher: fans one finished report out to every sink.
//!
//! Design:
//! - One Tokio task per sink. There is no ordering between sinks.
//! - A sink's `Err` or panic is logged with the sink's name and stays inside its task,
//!   also when the handle is dropped.
//! - `dispatch` returns at once. Hosts that must wait (the CLI, tests) call
//!   `DispatchHandle::join`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::domain::ExecutionReport;
use crate::ports::Sink;

/// Publishes each report to every configured sink concurrently.
///
/// Cloning is cheap; the sinks are shared.
#[derive(Clone, Default)]
pub struct SinkDispatcher {
    sinks: Vec<Arc<dyn Sink>>,
}

impl SinkDispatcher {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Spawn one publication per sink. Must be called inside a Tokio runtime.
    pub fn dispatch(&self, report: Arc<ExecutionReport>) -> DispatchHandle {
        let mut joins = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let report = Arc::clone(&report);
            let name = sink.name().to_string();

            let join = tokio::spawn(async move {
                let outcome = AssertUnwindSafe(sink.publish(&report)).catch_unwind().await;
                match outcome {
                    Err(payload) => {
                        tracing::error!(
                            sink = sink.name(),
                            panic = panic_message(payload.as_ref()),
                            "sink panicked"
                        );
                        false
                    }
                    Ok(Ok(())) => {
                        tracing::info!(sink = sink.name(), "report published");
                        true
                    }
                    Ok(Err(err)) => {
                        tracing::error!(
                            sink = sink.name(),
                            kind = err.kind().as_str(),
                            error = %err,
                            "publication failed"
                        );
                        false
                    }
                }
            });
            joins.push((name, join));
        }
        DispatchHandle { joins }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Outcome counts of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub published: usize,
    pub failed: usize,
}

/// Handle to the publications started by one `dispatch`.
///
/// Dropping it detaches the publications; they keep running.
pub struct DispatchHandle {
    joins: Vec<(String, JoinHandle<bool>)>,
}

impl DispatchHandle {
    /// Wait for every sink. A panicking or aborted sink counts as failed.
    pub async fn join(self) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for (name, join) in self.joins {
            match join.await {
                Ok(true) => summary.published += 1,
                Ok(false) => summary.failed += 1,
                Err(err) => {
                    tracing::error!(sink = %name, error = %err, "sink task aborted");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}


#[cfg(test)]
mod tests {
    use super::test_sinks::{CountingSink, FailingSink, PanickingSink};
    use super::*;
    use crate::domain::report::fixtures::empty_report;

    #[tokio::test]
    async fn failing_sink_does_not_affect_others() {
        let first = Arc::new(CountingSink::default());
        let second = Arc::new(CountingSink::default());
        let dispatcher = SinkDispatcher::default()
            .with_sink(first.clone())
            .with_sink(Arc::new(FailingSink))
            .with_sink(second.clone());

        let summary = dispatcher.dispatch(Arc::new(empty_report())).join().await;

        assert_eq!(summary, DispatchSummary { published: 2, failed: 1 });
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn panicking_sink_is_contained() {
        let counting = Arc::new(CountingSink::default());
        let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(PanickingSink), counting.clone()];
        let dispatcher = SinkDispatcher::new(sinks);

        let summary = dispatcher.dispatch(Arc::new(empty_report())).join().await;

        assert_eq!(summary, DispatchSummary { published: 1, failed: 1 });
        assert_eq!(counting.calls(), 1);
    }

    #[tokio::test]
    async fn panic_is_caught_inside_the_sink_task() {
        let dispatcher = SinkDispatcher::default().with_sink(Arc::new(PanickingSink));
        let handle = dispatcher.dispatch(Arc::new(empty_report()));

        for (name, join) in handle.joins {
            assert_eq!(name, "panicking");
            let published = join.await.expect("panic must not escape the task");
            assert!(!published);
        }
    }

    #[test]
    fn panic_message_reads_string_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(static_str.as_ref()), "boom");
        assert_eq!(panic_message(owned.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[tokio::test]
    async fn no_sinks_is_a_no_op() {
        let summary = SinkDispatcher::default()
            .dispatch(Arc::new(empty_report()))
            .join()
            .await;
        assert_eq!(summary, DispatchSummary::default());
    }

    #[test]
    fn lists_sink_names_in_order() {
        let dispatcher = SinkDispatcher::default()
            .with_sink(Arc::new(FailingSink))
            .with_sink(Arc::new(CountingSink::default()));
        assert_eq!(dispatcher.sink_names(), vec!["failing", "counting"]);
    }
}
