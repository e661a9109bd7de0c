/// Cycle is a closed path of currencies: c0 -> c1 -> ... -> cn-1 -> c0.
/// It only records which currencies are visited; which quote serves each hop is decided when
/// the cycle is scored.
use std::collections::HashSet;
use std::fmt::{self, Debug};

use eyre::{bail, Result};
use itertools::Itertools;

use super::graph::NodeId;

/// Smallest cycle worth reporting. Two-currency loops trade a pair against its own inverse.
pub const MIN_CYCLE_LENGTH: usize = 3;

/// A simple cycle of distinct currencies, stored in canonical rotation
/// (starting from its smallest node).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    /// Visited nodes in traversal order; the closing hop back to the first is implicit
    nodes: Vec<NodeId>,
}

impl Debug for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cycle({})", self.nodes.iter().join(">"))
    }
}

impl Cycle {
    /// Creates a cycle, rotating it so it starts at its smallest node.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than three nodes or a node repeats
    pub fn new(mut nodes: Vec<NodeId>) -> Result<Self> {
        Self::validate_nodes(&nodes)?;
        if let Some(min_pos) = nodes.iter().position_min() {
            nodes.rotate_left(min_pos);
        }
        Ok(Self { nodes })
    }

    /// At least three nodes, none repeated
    fn validate_nodes(nodes: &[NodeId]) -> Result<()> {
        if nodes.len() < MIN_CYCLE_LENGTH {
            bail!("Cycle must have at least {MIN_CYCLE_LENGTH} currencies");
        }
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in nodes {
            if !seen.insert(node) {
                bail!("Cycle visits node {node} more than once");
            }
        }
        Ok(())
    }

    /// Visited nodes, canonical rotation
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of currencies (and hops)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a valid cycle has at least three nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The hops `(from, to)` in traversal order, including the closing one
    pub fn hops(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().copied().circular_tuple_windows()
    }
}
