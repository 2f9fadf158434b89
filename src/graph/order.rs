use crate::model::{Stage, Transition};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The result of ordering a funnel's stages parent-before-child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologicalOrder {
    /// Stage ids such that every transition's source precedes its target.
    pub sorted: Vec<String>,
    /// Stages whose in-degree never reached zero, i.e. on a cycle or only
    /// reachable through one. Listed in input order.
    pub excluded: Vec<String>,
}

impl TopologicalOrder {
    pub fn is_complete(&self) -> bool {
        self.excluded.is_empty()
    }
}

/// Kahn's algorithm over the stage set.
///
/// Ties are broken by input order: zero in-degree stages are queued in the order
/// they appear in `stages`, children in the order their transitions appear.
/// Transitions touching an unknown stage id are ignored.
pub fn topological_order(stages: &[Stage], transitions: &[Transition]) -> TopologicalOrder {
    let mut ids: Vec<&str> = Vec::with_capacity(stages.len());
    let mut in_degree: AHashMap<&str, usize> = AHashMap::with_capacity(stages.len());
    for stage in stages {
        if in_degree.insert(stage.id.as_str(), 0).is_none() {
            ids.push(stage.id.as_str());
        }
    }

    let mut children: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for t in transitions {
        let (source, target) = (t.source_id.as_str(), t.target_id.as_str());
        if !in_degree.contains_key(source) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(target) {
            *degree += 1;
            children.entry(source).or_default().push(target);
        }
    }

    let mut queue: VecDeque<&str> = ids
        .iter()
        .copied()
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(ids.len());
    let mut visited: AHashSet<&str> = AHashSet::with_capacity(ids.len());
    while let Some(node) = queue.pop_front() {
        sorted.push(node.to_string());
        visited.insert(node);
        for &child in children.get(node).map(Vec::as_slice).unwrap_or_default() {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    let excluded = ids
        .into_iter()
        .filter(|id| !visited.contains(id))
        .map(str::to_string)
        .collect();

    TopologicalOrder { sorted, excluded }
}
