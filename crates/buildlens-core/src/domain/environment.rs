//! Build-wide environment facts.
//!
//! Every fact is optional: what can be collected depends on the host, the build tool
//! and the metrics that are registered. A missing fact never blocks a report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facts about the machine, the tool and the invocation.
///
/// Every field is optional: a fact the integration could not read stays `None` and
/// is left out of every sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub cpu_count: Option<u32>,
    pub os_version: Option<String>,
    pub os_manufacturer: Option<String>,
    pub hostname: Option<String>,
    pub max_workers: Option<u32>,
    pub java_runtime: Option<String>,
    pub java_vm_name: Option<String>,
    pub java_xms_bytes: Option<u64>,
    pub java_xmx_bytes: Option<u64>,
    pub java_max_perm_size: Option<u64>,
    pub total_ram_available_bytes: Option<u64>,
    pub locale: Option<String>,
    pub username: Option<String>,
    pub public_ip: Option<String>,
    pub default_charset: Option<String>,
    pub ide_version: Option<String>,
    /// Version of the build tool that ran the build.
    pub tool_version: Option<String>,
    /// `local` or `remote`.
    pub cache_mode: Option<String>,
    pub cache_push_enabled: Option<bool>,
    pub cache_url: Option<String>,
    pub cache_hit: Option<String>,
    pub cache_miss: Option<String>,
    pub cache_store: Option<String>,
    pub plugins: Vec<Plugin>,
    pub git_branch: Option<String>,
    pub git_user: Option<String>,
    pub switches: Switches,
}

/// Command line switches the build was started with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Switches {
    pub build_cache: Option<bool>,
    pub build_scan: Option<bool>,
    pub configuration_on_demand: Option<bool>,
    pub continue_on_failure: Option<bool>,
    pub daemon: Option<bool>,
    pub dry_run: Option<bool>,
    pub offline: Option<bool>,
    pub parallel: Option<bool>,
    pub refresh_dependencies: Option<bool>,
    pub rerun_tasks: Option<bool>,
}

impl Switches {
    /// `(flattened key, value)` pairs for every switch that is known.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, bool)> {
        [
            ("switch.cache", self.build_cache),
            ("switch.scan", self.build_scan),
            ("switch.configurationOnDemand", self.configuration_on_demand),
            ("switch.continueOnFailure", self.continue_on_failure),
            ("switch.daemon", self.daemon),
            ("switch.dryRun", self.dry_run),
            ("switch.offline", self.offline),
            ("switch.parallel", self.parallel),
            ("switch.refreshDependencies", self.refresh_dependencies),
            ("switch.rerunTasks", self.rerun_tasks),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// A plugin applied to the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub main_class: String,
    pub version: String,
}

/// User supplied properties attached to published data.
///
/// Build properties become tags of the build point and override computed entries of
/// the flattened environment. Task properties become tags of every task point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomProperties {
    pub build: BTreeMap<String, String>,
    pub task: BTreeMap<String, String>,
}
