// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Modular culture connectivity
//!
//! A [`Topology`] is the static wiring of a culture: number of neurons, the
//! module each neuron belongs to, and the directed edge list. Topologies are
//! loaded from and saved to a JSON document so that a run's connectivity can
//! travel with its recording.
//!
//! The [`TopologyBuilder`] grows modular cultures in-silico: dense random
//! wiring inside each module plus a small number of bridge axons between
//! adjacent modules.

mod builder;

pub use builder::TopologyBuilder;

use ahash::AHashSet;
use culture_types::{ModuleId, NeuronId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors for topology loading and validation.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to read topology file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse topology: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("module id list has {actual} entries, topology has {expected} neurons")]
    ModuleIdMismatch { expected: usize, actual: usize },

    #[error("edge ({0}, {1}) references a neuron outside the culture")]
    EdgeOutOfRange(NeuronId, NeuronId),

    #[error("self-connection on neuron {0}")]
    SelfConnection(NeuronId),

    #[error("module ids are not dense: module {0} has no neurons")]
    SparseModuleIds(ModuleId),

    #[error("topology has no neurons")]
    Empty,
}

pub type Result<T> = std::result::Result<T, TopologyError>;

/// The static wiring of a culture.
///
/// Edges are directed, `(pre, post)`: a spike of `pre` delivers current to
/// `post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of neurons in the culture.
    pub num_neurons: usize,
    /// Module membership, one entry per neuron.
    pub module_ids: Vec<ModuleId>,
    /// Directed edge list, `(pre, post)`.
    pub edges: Vec<(NeuronId, NeuronId)>,
    /// Optional provenance tag, carried into recordings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Topology {
    /// Load a topology from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let topology: Topology = serde_json::from_str(&contents)?;
        topology.validate()?;
        tracing::info!(
            neurons = topology.num_neurons,
            modules = topology.num_modules(),
            edges = topology.edges.len(),
            "loaded topology from {}",
            path.display()
        );
        Ok(topology)
    }

    /// Save the topology as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check the structural invariants.
    ///
    /// Indices in range, no self-connections, dense module ids (every module
    /// between 0 and max has at least one neuron).
    pub fn validate(&self) -> Result<()> {
        if self.num_neurons == 0 {
            return Err(TopologyError::Empty);
        }
        if self.module_ids.len() != self.num_neurons {
            return Err(TopologyError::ModuleIdMismatch {
                expected: self.num_neurons,
                actual: self.module_ids.len(),
            });
        }
        for &(pre, post) in &self.edges {
            if pre.index() >= self.num_neurons || post.index() >= self.num_neurons {
                return Err(TopologyError::EdgeOutOfRange(pre, post));
            }
            if pre == post {
                return Err(TopologyError::SelfConnection(pre));
            }
        }
        let num_modules = self.num_modules();
        let mut seen = vec![false; num_modules];
        for id in &self.module_ids {
            seen[id.index()] = true;
        }
        for (idx, present) in seen.iter().enumerate() {
            if !present {
                return Err(TopologyError::SparseModuleIds(ModuleId(idx as u32)));
            }
        }
        Ok(())
    }

    /// Number of modules (max module id + 1).
    pub fn num_modules(&self) -> usize {
        self.module_ids
            .iter()
            .map(|id| id.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Neurons belonging to one module, in index order.
    pub fn neurons_in_module(&self, module: ModuleId) -> Vec<NeuronId> {
        self.module_ids
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == module)
            .map(|(idx, _)| NeuronId(idx as u32))
            .collect()
    }

    /// Per-neuron outgoing target lists, for fast spike propagation.
    pub fn outgoing_targets(&self) -> Vec<Vec<NeuronId>> {
        let mut targets = vec![Vec::new(); self.num_neurons];
        for &(pre, post) in &self.edges {
            targets[pre.index()].push(post);
        }
        targets
    }

    /// Count of edges whose endpoints lie in different modules.
    pub fn num_bridge_edges(&self) -> usize {
        self.edges
            .iter()
            .filter(|(pre, post)| self.module_ids[pre.index()] != self.module_ids[post.index()])
            .count()
    }
}

/// Undirected adjacency of the module grid.
///
/// Modules are laid out on a two-column grid; neighbors differ by one grid
/// step. For the canonical four-module culture this is the square
/// 0 - 1, 0 - 2, 1 - 3, 2 - 3.
pub fn module_grid_adjacency(num_modules: usize) -> Vec<(ModuleId, ModuleId)> {
    let mut pairs = Vec::new();
    for m in 0..num_modules {
        let (row, col) = (m / 2, m % 2);
        // right neighbor
        if col == 0 && m + 1 < num_modules {
            pairs.push((ModuleId(m as u32), ModuleId((m + 1) as u32)));
        }
        // neighbor below
        let below = (row + 1) * 2 + col;
        if below < num_modules {
            pairs.push((ModuleId(m as u32), ModuleId(below as u32)));
        }
    }
    pairs
}

/// Deduplicate an edge list, preserving first occurrence order.
pub(crate) fn dedup_edges(edges: &mut Vec<(NeuronId, NeuronId)>) {
    let mut seen = AHashSet::with_capacity(edges.len());
    edges.retain(|edge| seen.insert(*edge));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Topology {
        Topology {
            num_neurons: 4,
            module_ids: vec![ModuleId(0), ModuleId(0), ModuleId(1), ModuleId(1)],
            edges: vec![
                (NeuronId(0), NeuronId(1)),
                (NeuronId(1), NeuronId(0)),
                (NeuronId(1), NeuronId(2)),
                (NeuronId(2), NeuronId(3)),
            ],
            name: None,
        }
    }

    #[test]
    fn test_valid_topology_passes() {
        assert!(tiny().validate().is_ok());
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut t = tiny();
        t.edges.push((NeuronId(3), NeuronId(3)));
        assert!(matches!(t.validate(), Err(TopologyError::SelfConnection(_))));
    }

    #[test]
    fn test_out_of_range_edge_rejected() {
        let mut t = tiny();
        t.edges.push((NeuronId(0), NeuronId(9)));
        assert!(matches!(t.validate(), Err(TopologyError::EdgeOutOfRange(_, _))));
    }

    #[test]
    fn test_sparse_module_ids_rejected() {
        let mut t = tiny();
        t.module_ids = vec![ModuleId(0), ModuleId(0), ModuleId(2), ModuleId(2)];
        assert!(matches!(t.validate(), Err(TopologyError::SparseModuleIds(_))));
    }

    #[test]
    fn test_grid_adjacency_square() {
        let pairs = module_grid_adjacency(4);
        assert_eq!(
            pairs,
            vec![
                (ModuleId(0), ModuleId(1)),
                (ModuleId(0), ModuleId(2)),
                (ModuleId(1), ModuleId(3)),
                (ModuleId(2), ModuleId(3)),
            ]
        );
    }

    #[test]
    fn test_outgoing_targets() {
        let t = tiny();
        let targets = t.outgoing_targets();
        assert_eq!(targets[1], vec![NeuronId(0), NeuronId(2)]);
        assert!(targets[3].is_empty());
    }

    #[test]
    fn test_bridge_edge_count() {
        assert_eq!(tiny().num_bridge_edges(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topo.json");
        let t = tiny();
        t.save(&path).unwrap();
        let loaded = Topology::load(&path).unwrap();
        assert_eq!(t, loaded);
    }
}
