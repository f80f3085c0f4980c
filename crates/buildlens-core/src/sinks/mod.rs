//! Sinks: the destinations a finished report is published to.

pub mod graph;
pub mod influx;
pub mod json;
pub mod output;

use std::path::Path;
use std::sync::Arc;

use crate::config::BuildlensConfig;
use crate::domain::PublishError;
use crate::ports::{Clock, Sink};

pub use self::graph::{Dot, Gexf, GraphFormat, GraphSink, TaskGraph};
pub use self::influx::InfluxDbSink;
pub use self::json::JsonSink;
pub use self::output::OutputSink;

/// Sinks enabled in `[publishers]`, in a fixed order.
pub fn from_config(config: &BuildlensConfig, clock: Arc<dyn Clock>) -> Vec<Arc<dyn Sink>> {
    let publishers = &config.publishers;
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();

    if publishers.output {
        sinks.push(Arc::new(OutputSink::new()));
    }
    if publishers.json {
        sinks.push(Arc::new(JsonSink::new(&config.output_dir)));
    }
    if publishers.task_dependency_graph.gexf {
        sinks.push(Arc::new(GraphSink::new(Gexf, &config.output_dir)));
    }
    if publishers.task_dependency_graph.dot {
        sinks.push(Arc::new(GraphSink::new(Dot, &config.output_dir)));
    }
    if let Some(influx) = &publishers.influx_db {
        sinks.push(Arc::new(InfluxDbSink::new(influx.clone(), clock)));
    }
    sinks
}

/// Create `dir` if needed and replace `path` with `content`.
async fn write_output(dir: &Path, path: &Path, content: String) -> Result<(), PublishError> {
    let io_error = |source: std::io::Error| PublishError::Io {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
    tokio::fs::write(path, content).await.map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InfluxDbConfig;
    use crate::ports::SystemClock;

    #[test]
    fn default_config_enables_only_output() {
        let sinks = from_config(&BuildlensConfig::default(), Arc::new(SystemClock));
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["output"]);
    }

    #[test]
    fn every_publisher_can_be_enabled() {
        let mut config = BuildlensConfig::default();
        config.publishers.json = true;
        config.publishers.task_dependency_graph.gexf = true;
        config.publishers.task_dependency_graph.dot = true;
        config.publishers.influx_db = Some(InfluxDbConfig::default());

        let sinks = from_config(&config, Arc::new(SystemClock));
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["output", "json", "gexf", "dot", "influxdb"]);
    }
}
