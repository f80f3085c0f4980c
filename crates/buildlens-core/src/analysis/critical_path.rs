//! Critical path estimation.
//!
//! Greedy walk from the root task: at every step follow the dependency that finished
//! last. This approximates the longest chain; it is not an exact longest-path search.
//!
//! Design:
//! - Dependencies that are not part of the build are dropped silently.
//! - Ties on `stop_ms` go to the dependency declared first.
//! - A task reached twice ends the walk, so cyclic input terminates.

use std::collections::{HashMap, HashSet};

use crate::domain::{TaskPath, TaskRecord};

/// Mark the critical path in place and return it in walk order (root first).
///
/// Nothing is marked when no task is a root.
pub fn estimate_critical_path(tasks: &mut [TaskRecord]) -> Vec<TaskPath> {
    let Some(root) = tasks.iter().position(|t| t.is_root_node) else {
        tracing::debug!("no root task, critical path not estimated");
        return Vec::new();
    };

    // first occurrence wins for duplicated paths
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        index.entry(task.path.as_str()).or_insert(i);
    }

    let mut walk = Vec::new();
    let mut visited = HashSet::new();
    let mut current = root;

    loop {
        if !visited.insert(current) {
            tracing::debug!(path = %tasks[current].path, "cycle in task dependencies");
            break;
        }
        walk.push(current);

        let mut next: Option<usize> = None;
        for dep in &tasks[current].dependencies {
            let Some(&candidate) = index.get(dep.as_str()) else {
                continue;
            };
            match next {
                Some(best) if tasks[best].stop_ms >= tasks[candidate].stop_ms => {}
                _ => next = Some(candidate),
            }
        }

        match next {
            Some(n) => current = n,
            None => break,
        }
    }

    walk.iter()
        .map(|&i| {
            tasks[i].on_critical_path = true;
            tasks[i].path.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskState;

    fn task(path: &str, stop_ms: u64) -> TaskRecord {
        TaskRecord::new(path, "app", TaskState::Executed).with_timing(0, stop_ms)
    }

    fn marked(tasks: &[TaskRecord]) -> Vec<&str> {
        tasks
            .iter()
            .filter(|t| t.on_critical_path)
            .map(|t| t.path.as_str())
            .collect()
    }

    #[test]
    fn no_root_marks_nothing() {
        let mut tasks = vec![task(":a", 10).depends_on(":b"), task(":b", 5)];
        assert!(estimate_critical_path(&mut tasks).is_empty());
        assert!(marked(&tasks).is_empty());
    }

    #[test]
    fn follows_chain_from_root() {
        let mut tasks = vec![
            task(":a", 10),
            task(":b", 20).depends_on(":a"),
            task(":c", 30).depends_on(":b").as_root(),
        ];
        let walk = estimate_critical_path(&mut tasks);
        assert_eq!(
            walk,
            vec![TaskPath::new(":c"), TaskPath::new(":b"), TaskPath::new(":a")]
        );
        assert_eq!(marked(&tasks), vec![":a", ":b", ":c"]);
    }

    #[test]
    fn picks_latest_finishing_dependency() {
        let mut tasks = vec![
            task(":early", 10),
            task(":late", 50),
            task(":root", 60)
                .depends_on(":early")
                .depends_on(":late")
                .as_root(),
        ];
        estimate_critical_path(&mut tasks);
        assert_eq!(marked(&tasks), vec![":late", ":root"]);
    }

    #[test]
    fn tie_goes_to_first_declared_dependency() {
        let mut tasks = vec![
            task(":second", 40),
            task(":first", 40),
            task(":root", 60)
                .depends_on(":first")
                .depends_on(":second")
                .as_root(),
        ];
        let walk = estimate_critical_path(&mut tasks);
        assert_eq!(walk, vec![TaskPath::new(":root"), TaskPath::new(":first")]);
    }

    #[test]
    fn dangling_dependencies_are_ignored() {
        let mut tasks = vec![
            task(":a", 10),
            task(":root", 60)
                .depends_on(":missing")
                .depends_on(":a")
                .as_root(),
        ];
        let walk = estimate_critical_path(&mut tasks);
        assert_eq!(walk, vec![TaskPath::new(":root"), TaskPath::new(":a")]);
    }

    #[test]
    fn cycle_terminates() {
        let mut tasks = vec![
            task(":a", 10).depends_on(":b"),
            task(":b", 20).depends_on(":a").as_root(),
        ];
        let walk = estimate_critical_path(&mut tasks);
        assert_eq!(walk, vec![TaskPath::new(":b"), TaskPath::new(":a")]);
    }

    #[test]
    fn first_root_is_used() {
        let mut tasks = vec![task(":x", 5).as_root(), task(":y", 50).as_root()];
        estimate_critical_path(&mut tasks);
        assert_eq!(marked(&tasks), vec![":x"]);
    }
}
