//! Raw facts handed over by the build-tool integration.
//!
//! Everything here is as observed: strings are unparsed, lists are unfiltered. Metrics
//! turn these facts into report fields.

use serde::Deserialize;

use crate::domain::Plugin;

/// Raw facts handed over by the build tool integration.
///
/// Metrics read from it; nothing here is interpreted until a metric collects it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildContext {
    pub root_project_name: Option<String>,
    pub tool_version: Option<String>,
    /// Task names as typed on the command line.
    pub requested_tasks: Vec<String>,
    pub start_parameters: StartParameters,
    /// `Some` only when the build ran in a daemon.
    pub daemon_single_use: Option<bool>,
    /// JVM arguments of the build process, e.g. `-Xmx4g`.
    pub jvm_args: Vec<String>,
    /// `None` when only the local build cache is configured.
    pub remote_cache: Option<RemoteCache>,
    pub cache_stats: CacheStats,
    pub host: HostFacts,
    pub vcs: VcsFacts,
    pub plugins: Vec<Plugin>,
    pub scan_link: Option<String>,
    pub build_invocation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct StartParameters {
    pub max_workers: Option<u32>,
    pub build_cache: Option<bool>,
    pub build_scan: Option<bool>,
    pub configure_on_demand: Option<bool>,
    pub continue_on_failure: Option<bool>,
    pub dry_run: Option<bool>,
    pub offline: Option<bool>,
    pub parallel: Option<bool>,
    pub refresh_dependencies: Option<bool>,
    pub rerun_tasks: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteCache {
    pub url: Option<String>,
    pub push: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    pub hit: Option<String>,
    pub miss: Option<String>,
    pub store: Option<String>,
}

/// Host and JVM facts gathered by the integration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostFacts {
    pub cpu_count: Option<u32>,
    pub os_version: Option<String>,
    pub os_manufacturer: Option<String>,
    pub hostname: Option<String>,
    pub java_runtime: Option<String>,
    pub java_vm_name: Option<String>,
    pub total_ram_available_bytes: Option<u64>,
    pub locale: Option<String>,
    pub username: Option<String>,
    pub public_ip: Option<String>,
    pub default_charset: Option<String>,
    pub ide_version: Option<String>,
}

/// Version control facts. Missing when the build does not run in a repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VcsFacts {
    pub branch: Option<String>,
    pub user: Option<String>,
}
