//! Configuration (`buildlens.toml`).
//!
//! Every field has a default, so an empty file is a valid configuration that only
//! enables the console output sink. A few settings can be overridden from the
//! environment, which keeps credentials out of checked-in files:
//!
//! - `BUILDLENS_INFLUXDB_URL`
//! - `BUILDLENS_INFLUXDB_USERNAME`
//! - `BUILDLENS_INFLUXDB_PASSWORD`
//! - `BUILDLENS_OUTPUT_DIR`

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analysis::FilterConfig;
use crate::domain::{ConfigError, CustomProperties};

/// Root of `buildlens.toml`.
///
/// Every section is optional; missing values fall back to their defaults. Selected
/// `BUILDLENS_*` environment variables override the file (see `apply_env_overrides`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildlensConfig {
    /// Directory for file outputs (graphs, JSON).
    pub output_dir: PathBuf,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub filter: FilterConfig,
    pub publishers: PublishersConfig,
}

impl Default for BuildlensConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("build/reports/buildlens"),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            filter: FilterConfig::default(),
            publishers: PublishersConfig::default(),
        }
    }
}

impl BuildlensConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `BUILDLENS_*` overrides. Blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("BUILDLENS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(influx) = self.publishers.influx_db.as_mut() {
            if let Some(url) = var("BUILDLENS_INFLUXDB_URL") {
                influx.url = url;
            }
            if let Some(username) = var("BUILDLENS_INFLUXDB_USERNAME") {
                influx.username = username;
            }
            if let Some(password) = var("BUILDLENS_INFLUXDB_PASSWORD") {
                influx.password = password;
            }
        }
    }

    pub fn custom_properties(&self) -> CustomProperties {
        CustomProperties {
            build: self.metrics.build_properties.clone(),
            task: self.metrics.task_properties.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `buildlens_core=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Extra tags of the build point; override computed environment keys.
    pub build_properties: BTreeMap<String, String>,
    /// Extra tags of every task point.
    pub task_properties: BTreeMap<String, String>,
}

/// Which sinks are enabled. Only the console output is on by default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishersConfig {
    /// Console summary.
    pub output: bool,
    /// Whole report as `data.json`.
    pub json: bool,
    pub task_dependency_graph: GraphConfig,
    pub influx_db: Option<InfluxDbConfig>,
}

impl Default for PublishersConfig {
    fn default() -> Self {
        Self {
            output: true,
            json: false,
            task_dependency_graph: GraphConfig::default(),
            influx_db: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub gexf: bool,
    pub dot: bool,
}

/// InfluxDB 1.x endpoint and measurement names.
///
/// `url`, `db_name` and both measurement names must be non-empty; the sink reports a
/// misconfiguration otherwise. Credentials are only sent when both are set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfluxDbConfig {
    pub url: String,
    pub db_name: String,
    pub username: String,
    pub password: String,
    pub task_metric_name: String,
    pub build_metric_name: String,
    pub publish_task_metrics: bool,
    pub publish_build_metrics: bool,
    pub retention_policy: RetentionPolicyConfig,
}

impl Default for InfluxDbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            db_name: String::new(),
            username: String::new(),
            password: String::new(),
            task_metric_name: "task".to_string(),
            build_metric_name: "build".to_string(),
            publish_task_metrics: true,
            publish_build_metrics: true,
            retention_policy: RetentionPolicyConfig::default(),
        }
    }
}

/// Retention policy created together with the database.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionPolicyConfig {
    pub name: String,
    pub duration: String,
    pub shard_duration: String,
    pub replication_factor: u32,
    pub is_default: bool,
}

impl Default for RetentionPolicyConfig {
    fn default() -> Self {
        Self {
            name: "rpBuildlens".to_string(),
            duration: "30d".to_string(),
            shard_duration: "30m".to_string(),
            replication_factor: 2,
            is_default: false,
        }
    }
}
