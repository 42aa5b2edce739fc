// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-silico growth of modular cultures
//!
//! Each module is wired as a dense random graph (`k_in` presynaptic partners
//! per neuron); grid-adjacent modules are coupled by `k_inter` bridge axons
//! per direction. Generation is deterministic per seed.

use crate::{dedup_edges, module_grid_adjacency, Topology};
use culture_types::{ModuleId, NeuronId};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Builder for modular culture topologies.
///
/// ```
/// use culture_topology::TopologyBuilder;
///
/// let topology = TopologyBuilder::new()
///     .modules(4)
///     .neurons_per_module(25)
///     .k_in(5)
///     .k_inter(3)
///     .seed(117)
///     .build();
/// assert_eq!(topology.num_neurons, 100);
/// assert!(topology.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    modules: usize,
    neurons_per_module: usize,
    k_in: usize,
    k_inter: usize,
    seed: u64,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyBuilder {
    /// Canonical four-module culture, 25 neurons each.
    pub fn new() -> Self {
        Self {
            modules: 4,
            neurons_per_module: 25,
            k_in: 5,
            k_inter: 3,
            seed: 117,
        }
    }

    /// Number of modules, laid out on a two-column grid.
    pub fn modules(mut self, modules: usize) -> Self {
        self.modules = modules;
        self
    }

    pub fn neurons_per_module(mut self, n: usize) -> Self {
        self.neurons_per_module = n;
        self
    }

    /// Intra-module in-degree per neuron.
    pub fn k_in(mut self, k_in: usize) -> Self {
        self.k_in = k_in;
        self
    }

    /// Bridge axons per direction between adjacent modules.
    pub fn k_inter(mut self, k_inter: usize) -> Self {
        self.k_inter = k_inter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow the culture.
    ///
    /// # Panics
    ///
    /// Panics if `k_in` is not smaller than the module size; the intra-module
    /// in-degree cannot exceed the number of possible partners.
    pub fn build(&self) -> Topology {
        assert!(
            self.k_in < self.neurons_per_module,
            "k_in must be smaller than the module size"
        );
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let num_neurons = self.modules * self.neurons_per_module;

        let module_ids: Vec<ModuleId> = (0..num_neurons)
            .map(|idx| ModuleId((idx / self.neurons_per_module) as u32))
            .collect();

        let mut edges = Vec::with_capacity(num_neurons * self.k_in);

        // intra-module wiring: k_in random presynaptic partners per neuron
        for module in 0..self.modules {
            let first = module * self.neurons_per_module;
            let members: Vec<u32> = (first..first + self.neurons_per_module)
                .map(|idx| idx as u32)
                .collect();
            for &post in &members {
                let mut partners: Vec<u32> =
                    members.iter().copied().filter(|&pre| pre != post).collect();
                partners.shuffle(&mut rng);
                for &pre in partners.iter().take(self.k_in) {
                    edges.push((NeuronId(pre), NeuronId(post)));
                }
            }
        }

        // bridge axons between grid-adjacent modules, both directions
        for (a, b) in module_grid_adjacency(self.modules) {
            for (src, dst) in [(a, b), (b, a)] {
                for _ in 0..self.k_inter {
                    let pre = self.random_member(src, &mut rng);
                    let post = self.random_member(dst, &mut rng);
                    edges.push((pre, post));
                }
            }
        }

        dedup_edges(&mut edges);

        let topology = Topology {
            num_neurons,
            module_ids,
            edges,
            name: Some(format!(
                "grown:{}x{}_kin={}_k={}_seed={}",
                self.modules, self.neurons_per_module, self.k_in, self.k_inter, self.seed
            )),
        };
        tracing::debug!(
            neurons = topology.num_neurons,
            edges = topology.edges.len(),
            bridges = topology.num_bridge_edges(),
            "grew modular topology"
        );
        topology
    }

    fn random_member(&self, module: ModuleId, rng: &mut impl Rng) -> NeuronId {
        let first = module.index() * self.neurons_per_module;
        NeuronId(rng.gen_range(first..first + self.neurons_per_module) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_deterministic_per_seed() {
        let a = TopologyBuilder::new().seed(42).build();
        let b = TopologyBuilder::new().seed(42).build();
        assert_eq!(a.edges, b.edges);

        let c = TopologyBuilder::new().seed(43).build();
        assert_ne!(a.edges, c.edges);
    }

    #[test]
    fn test_intra_module_in_degree() {
        let t = TopologyBuilder::new()
            .modules(2)
            .neurons_per_module(10)
            .k_in(4)
            .k_inter(0)
            .build();
        // without bridges, every neuron receives exactly k_in edges
        let mut in_degree = vec![0usize; t.num_neurons];
        for &(_, post) in &t.edges {
            in_degree[post.index()] += 1;
        }
        assert!(in_degree.iter().all(|&d| d == 4));
    }

    #[test]
    fn test_bridges_connect_adjacent_modules_only() {
        let t = TopologyBuilder::new()
            .modules(4)
            .neurons_per_module(10)
            .k_in(3)
            .k_inter(2)
            .seed(7)
            .build();
        let allowed: Vec<(u32, u32)> = vec![(0, 1), (0, 2), (1, 3), (2, 3)];
        for &(pre, post) in &t.edges {
            let (ma, mb) = (t.module_ids[pre.index()].0, t.module_ids[post.index()].0);
            if ma != mb {
                let pair = (ma.min(mb), ma.max(mb));
                assert!(allowed.contains(&pair), "unexpected bridge {:?}", pair);
            }
        }
        assert!(t.num_bridge_edges() > 0);
    }

    #[test]
    fn test_built_topology_validates() {
        let t = TopologyBuilder::new().build();
        assert!(t.validate().is_ok());
    }
}
