//! Funnel graph indexing and the stage orderer.

use crate::error::GraphError;
use crate::model::{Stage, Transition};
use ahash::{AHashMap, AHashSet};
use log::debug;

mod order;

pub use order::{TopologicalOrder, topological_order};

/// A read-only index over one snapshot of stages and transitions.
///
/// Built once and shared by every walk of a projection, since the stage and
/// transition sets do not change between cohorts or opportunities.
pub struct FunnelGraph<'a> {
    stages: &'a [Stage],
    known: AHashSet<&'a str>,
    outgoing: AHashMap<&'a str, Vec<&'a Transition>>,
    order: TopologicalOrder,
}

impl<'a> FunnelGraph<'a> {
    pub fn new(stages: &'a [Stage], transitions: &'a [Transition]) -> Self {
        let order = topological_order(stages, transitions);
        if !order.is_complete() {
            debug!(
                "{} stage(s) excluded from propagation by a cycle: {:?}",
                order.excluded.len(),
                order.excluded
            );
        }

        let known: AHashSet<&'a str> = stages.iter().map(|s| s.id.as_str()).collect();
        let mut outgoing: AHashMap<&'a str, Vec<&'a Transition>> = AHashMap::new();
        for t in transitions {
            if known.contains(t.source_id.as_str()) && known.contains(t.target_id.as_str()) {
                outgoing.entry(t.source_id.as_str()).or_default().push(t);
            }
        }

        Self {
            stages,
            known,
            outgoing,
            order,
        }
    }

    pub fn stages(&self) -> &'a [Stage] {
        self.stages
    }

    pub fn order(&self) -> &TopologicalOrder {
        &self.order
    }

    /// Transitions leaving `stage_id` toward a known stage, in input order.
    pub fn outgoing(&self, stage_id: &str) -> &[&'a Transition] {
        self.outgoing
            .get(stage_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains_stage(&self, stage_id: &str) -> bool {
        self.known.contains(stage_id)
    }

    pub fn terminal_stages(&self) -> impl Iterator<Item = &'a Stage> + 'a {
        self.stages.iter().filter(|s| s.is_terminal)
    }

    /// Fails with the excluded stages if any cycle truncates propagation.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.order.is_complete() {
            Ok(())
        } else {
            Err(GraphError::Cycle {
                stages: self.order.excluded.clone(),
            })
        }
    }
}
