//! Task and build filters applied before publication.
//!
//! Patterns are regular expressions matched against the whole value, so `:app:.*`
//! matches `:app:compile` but `app` does not. An exclude always wins over an include;
//! an empty include list admits everything.

use regex::Regex;
use serde::Deserialize;

use crate::domain::{ConfigError, ExecutionReport, TaskRecord, TaskState};

/// Include/exclude pattern lists as they appear in the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatternFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Inclusive duration bounds in milliseconds. Unset bounds do not filter.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub min_execution_ms: Option<u64>,
    pub max_execution_ms: Option<u64>,
}

/// Include/exclude lists of task states.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StateFilter {
    pub includes: Vec<TaskState>,
    pub excludes: Vec<TaskState>,
}

/// `[filter]` configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub tasks: PatternFilter,
    pub modules: PatternFilter,
    pub threshold: ThresholdConfig,
    pub states: StateFilter,
    pub build: BuildFilterConfig,
}

/// `[filter.build]` configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildFilterConfig {
    /// Publish only builds with this outcome.
    pub success: Option<bool>,
    pub requested_tasks: PatternFilter,
}

#[derive(Debug, Clone, Default)]
struct CompiledPatterns {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl CompiledPatterns {
    fn compile(config: &PatternFilter) -> Result<Self, ConfigError> {
        Ok(Self {
            includes: compile_all(&config.includes)?,
            excludes: compile_all(&config.excludes)?,
        })
    }

    fn allows(&self, value: &str) -> bool {
        if self.excludes.iter().any(|re| re.is_match(value)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(value))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Selects the tasks that are published.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    tasks: CompiledPatterns,
    modules: CompiledPatterns,
    threshold: ThresholdConfig,
    states: StateFilter,
}

impl TaskFilter {
    pub fn new(config: &FilterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tasks: CompiledPatterns::compile(&config.tasks)?,
            modules: CompiledPatterns::compile(&config.modules)?,
            threshold: config.threshold,
            states: config.states.clone(),
        })
    }

    /// Filter that admits every task.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, task: &TaskRecord) -> bool {
        let duration = task.duration_ms;
        if self.threshold.min_execution_ms.is_some_and(|min| duration < min) {
            return false;
        }
        if self.threshold.max_execution_ms.is_some_and(|max| duration > max) {
            return false;
        }
        if self.states.excludes.contains(&task.state) {
            return false;
        }
        if !self.states.includes.is_empty() && !self.states.includes.contains(&task.state) {
            return false;
        }
        self.tasks.allows(task.path.as_str()) && self.modules.allows(&task.module)
    }

    /// Order-preserving subset of `tasks`.
    pub fn filter(&self, tasks: &[TaskRecord]) -> Vec<TaskRecord> {
        tasks.iter().filter(|t| self.accepts(t)).cloned().collect()
    }
}

/// Decides whether a report is published at all.
#[derive(Debug, Clone, Default)]
pub struct BuildFilter {
    success: Option<bool>,
    requested_tasks: CompiledPatterns,
}

impl BuildFilter {
    pub fn new(config: &BuildFilterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            success: config.success,
            requested_tasks: CompiledPatterns::compile(&config.requested_tasks)?,
        })
    }

    /// The requested tasks are matched as one string (e.g. `clean assemble`); a report
    /// without requested tasks is matched as the empty string.
    pub fn should_publish(&self, report: &ExecutionReport) -> bool {
        if self.success.is_some_and(|wanted| wanted != report.success) {
            return false;
        }
        self.requested_tasks
            .allows(report.requested_tasks.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::fixtures::empty_report;
    use rstest::rstest;

    fn patterns(includes: &[&str], excludes: &[&str]) -> PatternFilter {
        PatternFilter {
            includes: includes.iter().map(|s| s.to_string()).collect(),
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn task(path: &str, module: &str, state: TaskState, duration_ms: u64) -> TaskRecord {
        TaskRecord::new(path, module, state).with_timing(0, duration_ms)
    }

    #[rstest]
    #[case::no_patterns(&[], &[], ":app:compile", true)]
    #[case::include_matches(&[":app:.*"], &[], ":app:compile", true)]
    #[case::include_misses(&[":lib:.*"], &[], ":app:compile", false)]
    #[case::partial_is_not_full_match(&["app"], &[], ":app:compile", false)]
    #[case::exclude_wins(&[":app:.*"], &[".*compile"], ":app:compile", false)]
    #[case::exclude_only(&[], &[":app:clean"], ":app:compile", true)]
    fn task_path_patterns(
        #[case] includes: &[&str],
        #[case] excludes: &[&str],
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        let filter = TaskFilter::new(&FilterConfig {
            tasks: patterns(includes, excludes),
            ..FilterConfig::default()
        })
        .unwrap();
        assert_eq!(filter.accepts(&task(path, "app", TaskState::Executed, 10)), expected);
    }

    #[rstest]
    #[case::below_min(Some(100), None, 99, false)]
    #[case::at_min(Some(100), None, 100, true)]
    #[case::at_max(None, Some(200), 200, true)]
    #[case::above_max(None, Some(200), 201, false)]
    #[case::inside(Some(100), Some(200), 150, true)]
    fn duration_threshold(
        #[case] min: Option<u64>,
        #[case] max: Option<u64>,
        #[case] duration: u64,
        #[case] expected: bool,
    ) {
        let filter = TaskFilter::new(&FilterConfig {
            threshold: ThresholdConfig {
                min_execution_ms: min,
                max_execution_ms: max,
            },
            ..FilterConfig::default()
        })
        .unwrap();
        assert_eq!(
            filter.accepts(&task(":a", "app", TaskState::Executed, duration)),
            expected
        );
    }

    #[test]
    fn state_and_module_filters_apply() {
        let filter = TaskFilter::new(&FilterConfig {
            modules: patterns(&["app|core"], &[]),
            states: StateFilter {
                includes: vec![],
                excludes: vec![TaskState::UpToDate],
            },
            ..FilterConfig::default()
        })
        .unwrap();

        assert!(filter.accepts(&task(":core:jar", "core", TaskState::FromCache, 5)));
        assert!(!filter.accepts(&task(":app:jar", "app", TaskState::UpToDate, 5)));
        assert!(!filter.accepts(&task(":lib:jar", "lib", TaskState::Executed, 5)));
    }

    #[test]
    fn filter_preserves_order_and_is_subset() {
        let tasks = vec![
            task(":app:a", "app", TaskState::Executed, 5),
            task(":lib:b", "lib", TaskState::Executed, 5),
            task(":app:c", "app", TaskState::Executed, 5),
        ];
        let filter = TaskFilter::new(&FilterConfig {
            modules: patterns(&["app"], &[]),
            ..FilterConfig::default()
        })
        .unwrap();

        let kept = filter.filter(&tasks);
        let paths: Vec<&str> = kept.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec![":app:a", ":app:c"]);
        assert!(kept.iter().all(|t| tasks.contains(t)));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let result = TaskFilter::new(&FilterConfig {
            tasks: patterns(&["(unclosed"], &[]),
            ..FilterConfig::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "(unclosed"
        ));
    }

    #[rstest]
    #[case::any_outcome(None, false, true)]
    #[case::success_wanted_and_got(Some(true), true, true)]
    #[case::success_wanted_failed(Some(true), false, false)]
    #[case::failure_wanted(Some(false), false, true)]
    fn build_outcome_filter(
        #[case] wanted: Option<bool>,
        #[case] success: bool,
        #[case] expected: bool,
    ) {
        let filter = BuildFilter::new(&BuildFilterConfig {
            success: wanted,
            ..BuildFilterConfig::default()
        })
        .unwrap();
        let report = ExecutionReport {
            success,
            ..empty_report()
        };
        assert_eq!(filter.should_publish(&report), expected);
    }

    #[test]
    fn build_filter_matches_requested_tasks() {
        let filter = BuildFilter::new(&BuildFilterConfig {
            success: None,
            requested_tasks: patterns(&[".*assemble.*"], &["gradleSync"]),
        })
        .unwrap();

        let mut report = empty_report();
        report.requested_tasks = Some("clean assemble".to_string());
        assert!(filter.should_publish(&report));

        report.requested_tasks = Some("gradleSync".to_string());
        assert!(!filter.should_publish(&report));

        report.requested_tasks = None;
        assert!(!filter.should_publish(&report));
    }
}
