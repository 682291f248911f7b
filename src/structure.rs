//! Structural classification of molecule graphs.
//!
//! [`analyze_structure`] derives a [`StructuralInfo`] from the bond
//! topology alone: particle types, polarities and multiplicities play no
//! part. The topology label is decided by counting endpoints (degree-1
//! particles); the older hub-degree rule stays available through
//! [`TopologyRule::Hub`] and [`analyze_structure_with`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::graph_ops::{adjacency, detect_cycle, is_fully_connected};
use crate::mol::Mol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "X")]
    X,
    #[serde(rename = "tree")]
    Tree,
    #[serde(rename = "cycle")]
    Cycle,
    /// Ring with at least one branch hanging off it.
    #[serde(rename = "mista")]
    Mixed,
    /// Hub rule only: ring without hubs.
    #[serde(rename = "ring")]
    Ring,
    /// Hub rule only: ring with hubs.
    #[serde(rename = "complex")]
    Complex,
    /// Hub rule only: single hub of degree five or more.
    #[serde(rename = "star")]
    Star,
}

impl Topology {
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Single => "single",
            Self::Linear => "linear",
            Self::Y => "Y",
            Self::X => "X",
            Self::Tree => "tree",
            Self::Cycle => "cycle",
            Self::Mixed => "mista",
            Self::Ring => "ring",
            Self::Complex => "complex",
            Self::Star => "star",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which signal decides the topology label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyRule {
    /// Count degree-1 particles. The canonical rule.
    #[default]
    Endpoint,
    /// Look at hubs (degree >= 3) and their degree.
    Hub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralInfo {
    pub has_cycle: bool,
    pub topology: Topology,
    pub branch_count: usize,
    pub max_degree: usize,
    pub is_connected: bool,
    /// Length of the first cycle found, if any.
    pub cycle_size: Option<usize>,
}

pub fn analyze_structure<A, B>(mol: &Mol<A, B>) -> StructuralInfo {
    analyze_structure_with(mol, TopologyRule::Endpoint)
}

pub fn analyze_structure_with<A, B>(mol: &Mol<A, B>, rule: TopologyRule) -> StructuralInfo {
    if mol.is_empty() {
        return StructuralInfo {
            has_cycle: false,
            topology: Topology::Empty,
            branch_count: 0,
            max_degree: 0,
            is_connected: false,
            cycle_size: None,
        };
    }

    let adj = adjacency(mol);
    let degrees: Vec<usize> = adj.iter().map(Vec::len).collect();
    let cycle = detect_cycle(&adj);
    let has_cycle = cycle.is_some();

    let topology = match rule {
        TopologyRule::Endpoint => classify_by_endpoints(&degrees, has_cycle),
        TopologyRule::Hub => classify_by_hubs(&degrees, has_cycle),
    };
    trace!(?rule, %topology, has_cycle, "classified molecule");

    StructuralInfo {
        has_cycle,
        topology,
        branch_count: degrees.iter().filter(|&&d| d >= 3).count(),
        max_degree: degrees.iter().copied().max().unwrap_or(0),
        is_connected: is_fully_connected(mol),
        cycle_size: cycle.map(|c| c.len()),
    }
}

fn classify_by_endpoints(degrees: &[usize], has_cycle: bool) -> Topology {
    match degrees.len() {
        0 => return Topology::Empty,
        1 => return Topology::Single,
        2 => return Topology::Linear,
        _ => {}
    }

    let endpoints = degrees.iter().filter(|&&d| d == 1).count();
    if has_cycle {
        return if endpoints == 0 {
            Topology::Cycle
        } else {
            Topology::Mixed
        };
    }

    match endpoints {
        0 if degrees.iter().all(|&d| d == 2) => Topology::Cycle,
        0 => Topology::Tree,
        2 => Topology::Linear,
        3 => Topology::Y,
        4 => Topology::X,
        _ => Topology::Tree,
    }
}

fn classify_by_hubs(degrees: &[usize], has_cycle: bool) -> Topology {
    match degrees.len() {
        0 => return Topology::Empty,
        1 => return Topology::Single,
        _ => {}
    }

    let hubs: Vec<usize> = degrees.iter().copied().filter(|&d| d >= 3).collect();
    let tips = degrees.iter().filter(|&&d| d == 1).count();

    if has_cycle {
        return if hubs.is_empty() {
            Topology::Ring
        } else {
            Topology::Complex
        };
    }
    if degrees.len() == 2 || (tips == 2 && hubs.is_empty()) {
        return Topology::Linear;
    }
    match hubs.as_slice() {
        [3] => Topology::Y,
        [4] => Topology::X,
        [d] if *d >= 5 => Topology::Star,
        _ => Topology::Tree,
    }
}
