//! Execution report: the finished record of one build.
//!
//! This module is sink-agnostic: it does not know about databases, files or consoles.
//! It only defines the shape every sink reads and the values derived from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::environment::{CustomProperties, Environment};
use super::ids::BuildId;
use super::task::TaskRecord;

/// Text used wherever a value was not measured.
///
/// Entries of the flattened environment carrying this value are dropped, which lets a
/// custom property remove a computed key by overriding it with `undefined`.
pub const UNDEFINED: &str = "undefined";

/// One completed build.
///
/// Design:
/// - Produced once per build by `ReportBuilder`, fully populated before any sink sees
///   it, then shared as `Arc<ExecutionReport>`.
/// - `tasks` is the filtered view used for publication. `unfiltered_tasks` keeps every
///   record so that dependency topology stays intact for graph output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub environment: Environment,
    pub custom_properties: CustomProperties,

    pub begin_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,

    /// `None` when the end of the configuration phase was not captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_duration_ms: Option<u64>,

    pub tasks: Vec<TaskRecord>,
    pub unfiltered_tasks: Vec<TaskRecord>,

    /// What the user asked to build, e.g. `assemble test`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_tasks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<BuildId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_project: Option<String>,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_link: Option<String>,

    /// Stable across the stages of one logical invocation (e.g. wrapper + real build).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_invocation_id: Option<String>,
}

impl ExecutionReport {
    /// Fraction of published tasks restored from the build cache.
    ///
    /// `None` when there are no tasks: an empty build has no ratio, not a ratio of zero.
    pub fn cache_ratio(&self) -> Option<f64> {
        if self.tasks.is_empty() {
            return None;
        }
        let cached = self.tasks.iter().filter(|t| t.state.is_cached()).count();
        Some(cached as f64 / self.tasks.len() as f64)
    }

    /// Configuration duration as text, `undefined` when not measured.
    pub fn configuration_duration_text(&self) -> String {
        self.configuration_duration_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| UNDEFINED.to_string())
    }

    /// Tasks marked by the critical path estimator, in list order.
    pub fn critical_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.unfiltered_tasks.iter().filter(|t| t.on_critical_path)
    }

    /// Flat key/value view of the environment and the build identity.
    ///
    /// Build custom properties are merged last so they can override any computed key.
    /// Entries whose value is `undefined` are dropped afterwards.
    pub fn flatten_build_env(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let env = &self.environment;

        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };

        put("cacheMode", env.cache_mode.clone());
        put("cachePushEnabled", env.cache_push_enabled.map(|b| b.to_string()));
        put("cacheUrl", env.cache_url.clone());
        put("cacheHit", env.cache_hit.clone());
        put("cacheMiss", env.cache_miss.clone());
        put("cacheStore", env.cache_store.clone());

        for (key, value) in env.switches.entries() {
            put(key, Some(value.to_string()));
        }

        put("osVersion", env.os_version.clone());
        put("javaVmName", env.java_vm_name.clone());
        put("cpuCount", env.cpu_count.map(|c| c.to_string()));
        put("username", env.username.clone());
        put("toolVersion", env.tool_version.clone());

        put("buildId", self.build_id.map(|id| id.to_string()));
        put("rootProject", self.root_project.clone());
        put("requestedTasks", self.requested_tasks.clone());

        map.extend(
            self.custom_properties
                .build
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        map.retain(|_, v| v != UNDEFINED);
        map
    }
}
