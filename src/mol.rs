use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::bond::Bond;
use crate::particle::Particle;
use crate::traits::HasId;

/// The concrete molecule type used by the synthesis engine.
pub type Molecule = Mol<Particle, Bond>;

/// A molecule graph: particles on nodes, bonds on undirected edges.
///
/// Node indices follow insertion order, so iterating [`particles`](Self::particles)
/// visits particles in declaration order. Every tie-break in the engine
/// depends on that order.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn particle(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn particle_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_particle(&mut self, particle: A) -> NodeIndex {
        self.graph.add_node(particle)
    }

    /// Adds an edge without checking for an existing one; callers that
    /// need uniqueness go through [`bond_between`](Self::bond_between) first.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn particle_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn particles(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }
}

impl<A: HasId, B> Mol<A, B> {
    pub fn find_particle(&self, id: &str) -> Option<NodeIndex> {
        self.graph.node_indices().find(|&idx| self.graph[idx].id() == id)
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.particle_count() != other.particle_count()
            || self.bond_count() != other.bond_count()
        {
            return false;
        }
        for idx in self.particles() {
            if self.particle(idx) != other.particle(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx) {
                return false;
            }
            if self.bond_endpoints(idx) != other.bond_endpoints(idx) {
                return false;
            }
        }
        true
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let particles: Vec<&A> = self.particles().map(|idx| self.particle(idx)).collect();
        let bonds: Vec<(usize, usize, &B)> = self
            .bonds()
            .filter_map(|e| {
                let (a, b) = self.bond_endpoints(e)?;
                Some((a.index(), b.index(), self.bond(e)))
            })
            .collect();
        f.debug_struct("Mol")
            .field("particles", &particles)
            .field("bonds", &bonds)
            .finish()
    }
}
