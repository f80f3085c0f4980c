//! InfluxDB sink.
//!
//! Publishes one point per published task and one point per build, all in a single
//! line-protocol write. The database and its retention policy are created on first
//! use, at most once per (url, database) per process.

pub mod client;
pub mod point;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::OnceCell;

use crate::config::InfluxDbConfig;
use crate::domain::{ExecutionReport, PublishError};
use crate::ports::{Clock, Sink};

pub use self::client::InfluxClient;
pub use self::point::{FieldValue, Point, to_line_protocol};

type ProvisionKey = (String, String);

/// Provisioning state of one (url, database) pair in this process.
///
/// The map lock is only held to look up the cell. Provisioning itself runs inside the
/// cell, so a slow endpoint never blocks another one. A failed attempt leaves the cell
/// empty and the next publish retries.
fn provisioning_cell(key: ProvisionKey) -> Arc<OnceCell<()>> {
    static CELLS: OnceLock<Mutex<HashMap<ProvisionKey, Arc<OnceCell<()>>>>> = OnceLock::new();
    let mut cells = CELLS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(cells.entry(key).or_default())
}

/// Writes task and build points to an InfluxDB 1.x server.
///
/// Design:
/// - Configuration is validated on every publish; a missing url, database or
///   measurement name is a `PublishError::Misconfigured` and nothing is sent.
/// - Task points use the clock's current time, the build point uses `end_ms`.
/// - The database and its retention policy are created once per (url, database).
pub struct InfluxDbSink {
    config: InfluxDbConfig,
    clock: Arc<dyn Clock>,
}

impl InfluxDbSink {
    pub fn new(config: InfluxDbConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn validate(&self) -> Result<(), PublishError> {
        let required = [
            ("url", &self.config.url),
            ("db_name", &self.config.db_name),
            ("task_metric_name", &self.config.task_metric_name),
            ("build_metric_name", &self.config.build_metric_name),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PublishError::Misconfigured(format!(
                "influx_db requires {}",
                missing.join(", ")
            )))
        }
    }

    /// Task points, timestamped with the current time.
    pub fn task_points(&self, report: &ExecutionReport) -> Vec<Point> {
        let now = self.clock.now_ms();
        report
            .tasks
            .iter()
            .map(|task| {
                Point::new(&self.config.task_metric_name, now)
                    .tag("state", task.state.as_str())
                    .tag("module", task.module.as_str())
                    .tag("rootNode", task.is_root_node.to_string())
                    .tag("task", task.path.as_str())
                    .tag("workerId", task.worker_id.as_str())
                    .tag("critical", task.on_critical_path.to_string())
                    .tags(&report.custom_properties.task)
                    .field("value", task.duration_ms)
            })
            .collect()
    }

    /// The build point, timestamped with the end of the build.
    pub fn build_point(&self, report: &ExecutionReport) -> Point {
        let env = &report.environment;
        Point::new(&self.config.build_metric_name, report.end_ms)
            .tags(report.flatten_build_env())
            .field("duration", report.duration_ms)
            .field_opt("configuration", report.configuration_duration_ms)
            .field("success", report.success)
            .field_opt("cacheRatio", report.cache_ratio())
            .field("start", report.begin_ms)
            .field_opt("osVersion", env.os_version.clone())
            .field_opt("maxWorkers", env.max_workers)
            .field_opt("javaRuntime", env.java_runtime.clone())
            .field_opt("javaVmName", env.java_vm_name.clone())
            .field_opt("javaXmsBytes", env.java_xms_bytes)
            .field_opt("javaXmxBytes", env.java_xmx_bytes)
            .field_opt("javaMaxPermSize", env.java_max_perm_size)
            .field_opt("totalRamAvailableBytes", env.total_ram_available_bytes)
            .field_opt("cpuCount", env.cpu_count)
            .field_opt("locale", env.locale.clone())
            .field_opt("username", env.username.clone())
            .field_opt("publicIp", env.public_ip.clone())
            .field_opt("defaultCharset", env.default_charset.clone())
            .field_opt("ideVersion", env.ide_version.clone())
            .field_opt("toolVersion", env.tool_version.clone())
            .field_opt("gitBranch", env.git_branch.clone())
            .field_opt("gitUser", env.git_user.clone())
            .field_opt("rootProject", report.root_project.clone())
            .field_opt("requestedTasks", report.requested_tasks.clone())
            .field_opt("scanLink", report.scan_link.clone())
    }

    fn points(&self, report: &ExecutionReport) -> Vec<Point> {
        let mut points = Vec::new();
        if self.config.publish_task_metrics {
            points.extend(self.task_points(report));
        }
        if self.config.publish_build_metrics {
            points.push(self.build_point(report));
        }
        let before = points.len();
        points.retain(Point::has_fields);
        if points.len() < before {
            tracing::debug!(dropped = before - points.len(), "skipping points without fields");
        }
        points
    }

    async fn ensure_provisioned(&self, client: &InfluxClient) -> Result<(), PublishError> {
        let cell = provisioning_cell((self.config.url.clone(), self.config.db_name.clone()));
        cell.get_or_try_init(|| async {
            let db = &self.config.db_name;
            if !client.database_exists(db).await? {
                tracing::info!(db = %db, "creating influxdb database");
                client.create_database(db).await?;
                client
                    .create_retention_policy(db, &self.config.retention_policy)
                    .await?;
            }
            Ok::<(), PublishError>(())
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Sink for InfluxDbSink {
    fn name(&self) -> &str {
        "influxdb"
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        self.validate()?;

        let points = self.points(report);
        if points.is_empty() {
            tracing::debug!("task and build metrics disabled, nothing to write");
            return Ok(());
        }

        let client = InfluxClient::new(
            &self.config.url,
            &self.config.username,
            &self.config.password,
        )?;
        self.ensure_provisioned(&client).await?;

        tracing::debug!(points = points.len(), db = %self.config.db_name, "writing points");
        client
            .write(
                &self.config.db_name,
                Some(&self.config.retention_policy.name),
                to_line_protocol(&points),
            )
            .await
    }
}
