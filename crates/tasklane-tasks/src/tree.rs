//! Target listing
//!
//! Renders every target grouped by category as an indented dependency tree. A child
//! is a dependency that is itself a target of the same category and task type.

use std::collections::HashSet;
use std::sync::Arc;

use crate::registry::TaskRegistry;
use crate::task::Task;

const ROOT_INDENT: usize = 4;
const LEVEL_INDENT: usize = 2;

/// Lines of the target listing, ready to be emitted one by one
pub fn target_listing(registry: &TaskRegistry) -> Vec<String> {
    let categories = registry.categories();
    let targets = registry.target_tasks();

    let mut lines = vec![
        String::new(),
        format!("{} Target Categories Available:", categories.len()),
    ];

    for category in &categories {
        let mut in_category: Vec<Arc<Task>> = targets
            .iter()
            .filter(|task| task.category() == *category)
            .cloned()
            .collect();
        in_category.sort_by(|a, b| a.name().cmp(b.name()));

        lines.push(String::new());
        lines.push(format!("  Category: {}", category));
        lines.push(format!("  {} Targets Available:", in_category.len()));
        for task in &in_category {
            lines.extend(dependency_tree(task, &in_category));
        }
    }

    lines.push(String::new());
    lines
}

/// Render `root` and its same-type target dependencies, depth first.
///
/// Each task is rendered at most once per root, so cycles end and a task reachable
/// through many paths shows only under the first of them.
pub fn dependency_tree(root: &Arc<Task>, candidates: &[Arc<Task>]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<(Arc<Task>, usize)> = vec![(Arc::clone(root), 0)];

    while let Some((task, depth)) = stack.pop() {
        if !visited.insert(task.name().to_string()) {
            continue;
        }
        lines.push(format!(
            "{}- {}",
            " ".repeat(ROOT_INDENT + depth * LEVEL_INDENT),
            task.name()
        ));

        let task_type = task.task_type();
        let mut children: Vec<&Arc<Task>> = candidates
            .iter()
            .filter(|c| task.depends_on(c.name()))
            .filter(|c| c.task_type() == task_type)
            .filter(|c| !visited.contains(c.name()))
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));

        for child in children.into_iter().rev() {
            stack.push((Arc::clone(child), depth + 1));
        }
    }

    lines
}
