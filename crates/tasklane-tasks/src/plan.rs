//! Execution plan for a target

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{info, instrument};

use crate::registry::TaskRegistry;

/// A task in an execution plan
#[derive(Debug, Clone)]
pub struct PlanNode {
    /// Task name
    pub name: String,
    /// Tasks that must complete before this one
    pub dependencies: BTreeSet<String>,
    /// Tasks waiting on this one
    pub dependents: BTreeSet<String>,
    /// Execution wave (tasks in the same wave do not depend on each other)
    pub wave: usize,
}

/// A target and everything it depends on, in a valid execution order
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    target: String,
    nodes: BTreeMap<String, PlanNode>,
    waves: Vec<Vec<String>>,
    sorted_order: Vec<String>,
}

impl ExecutionPlan {
    /// Collect the dependency closure of `target` from the registry and order it
    #[instrument(skip(registry), fields(registered = registry.len()))]
    pub fn for_target(registry: &TaskRegistry, target: &str) -> Result<Self, PlanError> {
        let mut nodes: BTreeMap<String, PlanNode> = BTreeMap::new();
        let mut pending = vec![target.to_string()];
        let mut required_by: BTreeMap<String, String> = BTreeMap::new();

        while let Some(name) = pending.pop() {
            if nodes.contains_key(&name) {
                continue;
            }
            let task = registry.lookup(&name).ok_or_else(|| match required_by.get(&name) {
                Some(parent) => PlanError::MissingDependency {
                    task: parent.clone(),
                    dependency: name.clone(),
                },
                None => PlanError::UnknownTask(name.clone()),
            })?;

            let dependencies: BTreeSet<String> = task.dependencies().into_iter().collect();
            for dependency in &dependencies {
                if !nodes.contains_key(dependency) {
                    required_by
                        .entry(dependency.clone())
                        .or_insert_with(|| name.clone());
                    pending.push(dependency.clone());
                }
            }

            nodes.insert(
                name.clone(),
                PlanNode {
                    name,
                    dependencies,
                    dependents: BTreeSet::new(),
                    wave: 0,
                },
            );
        }

        // Build reverse dependency map (dependents)
        let all_deps: Vec<(String, BTreeSet<String>)> = nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.dependencies.clone()))
            .collect();
        for (name, deps) in &all_deps {
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.insert(name.clone());
                }
            }
        }

        let sorted_order = Self::topological_sort(&nodes)?;
        let waves = Self::compute_waves(&nodes, &sorted_order);

        for (wave_idx, wave_tasks) in waves.iter().enumerate() {
            for name in wave_tasks {
                if let Some(node) = nodes.get_mut(name) {
                    node.wave = wave_idx;
                }
            }
        }

        info!(
            target_name = target,
            task_count = nodes.len(),
            wave_count = waves.len(),
            "execution plan built"
        );

        Ok(Self {
            target: target.to_string(),
            nodes,
            waves,
            sorted_order,
        })
    }

    /// Topological sort using Kahn's algorithm; ties resolve by name
    fn topological_sort(nodes: &BTreeMap<String, PlanNode>) -> Result<Vec<String>, PlanError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut sorted: Vec<String> = Vec::new();

        for (name, node) in nodes {
            let degree = node.dependencies.len();
            in_degree.insert(name, degree);
            if degree == 0 {
                queue.push_back(name);
            }
        }

        while let Some(name) = queue.pop_front() {
            sorted.push(name.to_string());

            if let Some(node) = nodes.get(name) {
                for dependent in &node.dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        if sorted.len() != nodes.len() {
            let cyclic: Vec<&str> = nodes
                .keys()
                .map(String::as_str)
                .filter(|name| !sorted.iter().any(|s| s == name))
                .collect();
            return Err(PlanError::CyclicDependency(cyclic.join(", ")));
        }

        Ok(sorted)
    }

    fn compute_waves(nodes: &BTreeMap<String, PlanNode>, sorted: &[String]) -> Vec<Vec<String>> {
        let mut wave_map: BTreeMap<&str, usize> = BTreeMap::new();

        for name in sorted {
            if let Some(node) = nodes.get(name) {
                let wave = node
                    .dependencies
                    .iter()
                    .filter_map(|dep| wave_map.get(dep.as_str()))
                    .max()
                    .map(|w| w + 1)
                    .unwrap_or(0);
                wave_map.insert(name, wave);
            }
        }

        let max_wave = wave_map.values().max().copied().unwrap_or(0);
        let mut waves: Vec<Vec<String>> = vec![Vec::new(); max_wave + 1];
        for name in sorted {
            if let Some(&wave) = wave_map.get(name.as_str()) {
                waves[wave].push(name.clone());
            }
        }
        waves
    }

    /// Target the plan was built for
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn nodes(&self) -> &BTreeMap<String, PlanNode> {
        &self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&PlanNode> {
        self.nodes.get(name)
    }

    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    /// Tasks in execution order, dependencies first
    pub fn sorted(&self) -> &[String] {
        &self.sorted_order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Human readable plan; `command` supplies the action shown for each task
    pub fn execution_plan<F>(&self, command: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut plan = String::new();
        for (i, wave) in self.waves.iter().enumerate() {
            plan.push_str(&format!("Wave {} ({} tasks):\n", i, wave.len()));
            for name in wave {
                if let Some(node) = self.nodes.get(name) {
                    let cmd = command(name).unwrap_or_else(|| "<no action>".to_string());
                    if node.dependencies.is_empty() {
                        plan.push_str(&format!("  {} -> {}\n", name, cmd));
                    } else {
                        let deps: Vec<&str> = node.dependencies.iter().map(String::as_str).collect();
                        plan.push_str(&format!(
                            "  {} -> {} (after: {})\n",
                            name,
                            cmd,
                            deps.join(", ")
                        ));
                    }
                }
            }
        }
        plan
    }
}

/// Errors while planning a target
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Cyclic dependency detected
    #[error("Cyclic dependency detected among tasks: {0}")]
    CyclicDependency(String),

    /// The requested target is not registered
    #[error("Task '{0}' is not registered")]
    UnknownTask(String),

    /// A dependency names a task that is not registered
    #[error("Task '{task}' depends on '{dependency}', which is not registered")]
    MissingDependency { task: String, dependency: String },
}
