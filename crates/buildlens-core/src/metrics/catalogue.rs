//! Default metric catalogue.

use super::{BuildContext, MetricRegistry, RegistryError};
use crate::app::ReportDraft;

/// Requested-task suffix that IDE project syncs run.
const SYNC_TASK_SUFFIX: &str = "generateDebugSources";

/// Registry with every built-in metric.
pub fn default_registry() -> Result<MetricRegistry, RegistryError> {
    let mut r = MetricRegistry::new();

    r.register_fn(
        "rootProject",
        |c: &BuildContext| c.root_project_name.clone(),
        |v, d: &mut ReportDraft| d.root_project = Some(v),
    )?;
    r.register_fn(
        "toolVersion",
        |c: &BuildContext| c.tool_version.clone(),
        |v, d: &mut ReportDraft| d.environment.tool_version = Some(v),
    )?;
    r.register_fn(
        "requestedTasks",
        |c: &BuildContext| requested_tasks(&c.requested_tasks),
        |v, d: &mut ReportDraft| d.requested_tasks = Some(v),
    )?;
    r.register_fn(
        "maxWorkers",
        |c: &BuildContext| c.start_parameters.max_workers,
        |v, d: &mut ReportDraft| d.environment.max_workers = Some(v),
    )?;

    register_switches(&mut r)?;

    r.register_fn(
        "switch.daemon",
        |c: &BuildContext| c.daemon_single_use,
        |v, d: &mut ReportDraft| d.environment.switches.daemon = Some(v),
    )?;
    r.register_fn(
        "jvm.xmx",
        |c: &BuildContext| jvm_arg_after(&c.jvm_args, "Xmx").and_then(parse_memory_size),
        |v, d: &mut ReportDraft| d.environment.java_xmx_bytes = Some(v),
    )?;
    r.register_fn(
        "jvm.xms",
        |c: &BuildContext| jvm_arg_after(&c.jvm_args, "Xms").and_then(parse_memory_size),
        |v, d: &mut ReportDraft| d.environment.java_xms_bytes = Some(v),
    )?;
    r.register_fn(
        "jvm.maxPermSize",
        |c: &BuildContext| {
            c.jvm_args
                .iter()
                .find(|arg| arg.contains("MaxPermSize"))
                .and_then(|arg| arg.split('=').nth(1))
                .and_then(parse_memory_size)
        },
        |v, d: &mut ReportDraft| d.environment.java_max_perm_size = Some(v),
    )?;

    register_cache(&mut r)?;
    register_host(&mut r)?;

    r.register_fn(
        "gitBranch",
        |c: &BuildContext| c.vcs.branch.clone(),
        |v, d: &mut ReportDraft| d.environment.git_branch = Some(v),
    )?;
    r.register_fn(
        "gitUser",
        |c: &BuildContext| c.vcs.user.clone(),
        |v, d: &mut ReportDraft| d.environment.git_user = Some(v),
    )?;
    r.register_fn(
        "plugins",
        |c: &BuildContext| (!c.plugins.is_empty()).then(|| c.plugins.clone()),
        |v, d: &mut ReportDraft| d.environment.plugins = v,
    )?;
    r.register_fn(
        "scanLink",
        |c: &BuildContext| c.scan_link.clone(),
        |v, d: &mut ReportDraft| d.scan_link = Some(v),
    )?;
    r.register_fn(
        "buildInvocationId",
        |c: &BuildContext| c.build_invocation_id.clone(),
        |v, d: &mut ReportDraft| d.build_invocation_id = Some(v),
    )?;

    Ok(r)
}

fn register_switches(r: &mut MetricRegistry) -> Result<(), RegistryError> {
    r.register_fn(
        "switch.cache",
        |c: &BuildContext| c.start_parameters.build_cache,
        |v, d: &mut ReportDraft| d.environment.switches.build_cache = Some(v),
    )?;
    r.register_fn(
        "switch.scan",
        |c: &BuildContext| c.start_parameters.build_scan,
        |v, d: &mut ReportDraft| d.environment.switches.build_scan = Some(v),
    )?;
    r.register_fn(
        "switch.configurationOnDemand",
        |c: &BuildContext| c.start_parameters.configure_on_demand,
        |v, d: &mut ReportDraft| d.environment.switches.configuration_on_demand = Some(v),
    )?;
    r.register_fn(
        "switch.continueOnFailure",
        |c: &BuildContext| c.start_parameters.continue_on_failure,
        |v, d: &mut ReportDraft| d.environment.switches.continue_on_failure = Some(v),
    )?;
    r.register_fn(
        "switch.dryRun",
        |c: &BuildContext| c.start_parameters.dry_run,
        |v, d: &mut ReportDraft| d.environment.switches.dry_run = Some(v),
    )?;
    r.register_fn(
        "switch.offline",
        |c: &BuildContext| c.start_parameters.offline,
        |v, d: &mut ReportDraft| d.environment.switches.offline = Some(v),
    )?;
    r.register_fn(
        "switch.parallel",
        |c: &BuildContext| c.start_parameters.parallel,
        |v, d: &mut ReportDraft| d.environment.switches.parallel = Some(v),
    )?;
    r.register_fn(
        "switch.refreshDependencies",
        |c: &BuildContext| c.start_parameters.refresh_dependencies,
        |v, d: &mut ReportDraft| d.environment.switches.refresh_dependencies = Some(v),
    )?;
    r.register_fn(
        "switch.rerunTasks",
        |c: &BuildContext| c.start_parameters.rerun_tasks,
        |v, d: &mut ReportDraft| d.environment.switches.rerun_tasks = Some(v),
    )
}

fn register_cache(r: &mut MetricRegistry) -> Result<(), RegistryError> {
    r.register_fn(
        "cacheMode",
        |c: &BuildContext| {
            Some(if c.remote_cache.is_some() { "remote" } else { "local" }.to_string())
        },
        |v, d: &mut ReportDraft| d.environment.cache_mode = Some(v),
    )?;
    r.register_fn(
        "cachePushEnabled",
        |c: &BuildContext| c.remote_cache.as_ref().and_then(|rc| rc.push),
        |v, d: &mut ReportDraft| d.environment.cache_push_enabled = Some(v),
    )?;
    r.register_fn(
        "cacheUrl",
        |c: &BuildContext| c.remote_cache.as_ref().and_then(|rc| rc.url.clone()),
        |v, d: &mut ReportDraft| d.environment.cache_url = Some(v),
    )?;
    r.register_fn(
        "cacheHit",
        |c: &BuildContext| c.cache_stats.hit.clone(),
        |v, d: &mut ReportDraft| d.environment.cache_hit = Some(v),
    )?;
    r.register_fn(
        "cacheMiss",
        |c: &BuildContext| c.cache_stats.miss.clone(),
        |v, d: &mut ReportDraft| d.environment.cache_miss = Some(v),
    )?;
    r.register_fn(
        "cacheStore",
        |c: &BuildContext| c.cache_stats.store.clone(),
        |v, d: &mut ReportDraft| d.environment.cache_store = Some(v),
    )
}

fn register_host(r: &mut MetricRegistry) -> Result<(), RegistryError> {
    r.register_fn(
        "cpuCount",
        |c: &BuildContext| c.host.cpu_count,
        |v, d: &mut ReportDraft| d.environment.cpu_count = Some(v),
    )?;
    r.register_fn(
        "osVersion",
        |c: &BuildContext| c.host.os_version.clone(),
        |v, d: &mut ReportDraft| d.environment.os_version = Some(v),
    )?;
    r.register_fn(
        "osManufacturer",
        |c: &BuildContext| c.host.os_manufacturer.clone(),
        |v, d: &mut ReportDraft| d.environment.os_manufacturer = Some(v),
    )?;
    r.register_fn(
        "hostname",
        |c: &BuildContext| c.host.hostname.clone(),
        |v, d: &mut ReportDraft| d.environment.hostname = Some(v),
    )?;
    r.register_fn(
        "javaRuntime",
        |c: &BuildContext| c.host.java_runtime.clone(),
        |v, d: &mut ReportDraft| d.environment.java_runtime = Some(v),
    )?;
    r.register_fn(
        "javaVmName",
        |c: &BuildContext| c.host.java_vm_name.clone(),
        |v, d: &mut ReportDraft| d.environment.java_vm_name = Some(v),
    )?;
    r.register_fn(
        "totalRamAvailableBytes",
        |c: &BuildContext| c.host.total_ram_available_bytes,
        |v, d: &mut ReportDraft| d.environment.total_ram_available_bytes = Some(v),
    )?;
    r.register_fn(
        "locale",
        |c: &BuildContext| c.host.locale.clone(),
        |v, d: &mut ReportDraft| d.environment.locale = Some(v),
    )?;
    r.register_fn(
        "username",
        |c: &BuildContext| c.host.username.clone(),
        |v, d: &mut ReportDraft| d.environment.username = Some(v),
    )?;
    r.register_fn(
        "publicIp",
        |c: &BuildContext| c.host.public_ip.clone(),
        |v, d: &mut ReportDraft| d.environment.public_ip = Some(v),
    )?;
    r.register_fn(
        "defaultCharset",
        |c: &BuildContext| c.host.default_charset.clone(),
        |v, d: &mut ReportDraft| d.environment.default_charset = Some(v),
    )?;
    r.register_fn(
        "ideVersion",
        |c: &BuildContext| c.host.ide_version.clone(),
        |v, d: &mut ReportDraft| d.environment.ide_version = Some(v),
    )
}

/// IDE syncs only request `generateDebugSources` tasks; they are reported as `gradleSync`.
fn requested_tasks(names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    if names.iter().all(|n| n.ends_with(SYNC_TASK_SUFFIX)) {
        return Some("gradleSync".to_string());
    }
    Some(names.join(" "))
}

/// Text after `flag` in the first argument containing it, e.g. `4g` for `-Xmx4g`.
fn jvm_arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .find(|arg| arg.contains(flag))
        .and_then(|arg| arg.split(flag).nth(1))
}

/// Parse a JVM memory size (`512m`, `4G`, `1024k`, `2048`) into bytes.
pub fn parse_memory_size(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&raw[..i], Some(c.to_ascii_lowercase())),
        Some(_) => (raw, None),
        None => return None,
    };
    let number: u64 = digits.parse().ok()?;
    let multiplier: u64 = match unit {
        None => 1,
        Some('k') => 1 << 10,
        Some('m') => 1 << 20,
        Some('g') => 1 << 30,
        Some('t') => 1 << 40,
        Some(_) => return None,
    };
    number.checked_mul(multiplier)
}
