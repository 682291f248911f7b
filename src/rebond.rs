//! Greedy rebonding: repair a molecule whose particles sit below capacity.
//!
//! Each round adds exactly one bond unit. Under-capacity particles are
//! ranked by how many connections they miss (most first, ties in
//! declaration order) and the first ordered pair of differently shaped
//! particles either gets its existing bond raised by one or a new single
//! bond. Polarity is not consulted.
//!
//! This is a feasibility heuristic, not a matching solver: it can fail on
//! inputs that some other bond assignment would stabilize. The exact
//! tie-break is part of the observable behavior (cached synthesis results
//! depend on it) and must not be "improved".

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;
use tracing::{debug, trace};

use crate::bond::Bond;
use crate::config::RebondConfig;
use crate::mol::Molecule;
use crate::valence::{check_capacity, unstable_particles, Unstable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebondError {
    /// The input already carries more connections than some particle allows.
    #[error("particle {particle} exceeds its capacity before rebonding")]
    OverCapacity { particle: String },
    /// No pair of under-capacity particles can take another bond.
    #[error("no legal bond in round {round}; {missing} connections still missing")]
    NoLegalMove { round: usize, missing: u32 },
    #[error("molecule not stable after {rounds} rounds")]
    RoundLimit { rounds: usize },
}

enum Move {
    Raise(EdgeIndex),
    Create(NodeIndex, NodeIndex),
}

/// Rebond with the default round budget.
///
/// ```
/// use molsynth::{from_notation, rebond, is_stable};
///
/// // a pentagon and two squares, no bonds yet
/// let mol = from_notation("P+ Q- Q-").unwrap();
/// let stable = rebond(&mol).unwrap();
/// assert!(is_stable(&stable));
/// assert_eq!(stable.bond_count(), 2);
/// ```
pub fn rebond(mol: &Molecule) -> Result<Molecule, RebondError> {
    rebond_with(mol, &RebondConfig::default())
}

pub fn rebond_with(mol: &Molecule, config: &RebondConfig) -> Result<Molecule, RebondError> {
    if let Err(errors) = check_capacity(mol) {
        let particle = errors
            .first()
            .map(|e| mol.particle(e.particle_idx).id.clone())
            .unwrap_or_default();
        return Err(RebondError::OverCapacity { particle });
    }

    let mut work = mol.clone();
    for round in 1..=config.max_rounds {
        let mut unstable = unstable_particles(&work);
        if unstable.is_empty() {
            debug!(rounds = round - 1, bonds = work.bond_count(), "rebond reached stability");
            return Ok(work);
        }
        // stable sort keeps declaration order among equal needs
        unstable.sort_by(|a, b| b.missing.cmp(&a.missing));

        match propose(&work, &unstable) {
            Some(Move::Raise(edge)) => {
                trace!(round, edge = edge.index(), "raise bond multiplicity");
                work.bond_mut(edge).multiplicity += 1;
            }
            Some(Move::Create(a, b)) => {
                trace!(round, from = a.index(), to = b.index(), "create bond");
                work.add_bond(a, b, Bond::new(1));
            }
            None => {
                let missing = unstable.iter().map(|u| u.missing).sum();
                debug!(round, missing, "rebond found no legal move");
                return Err(RebondError::NoLegalMove { round, missing });
            }
        }
    }

    debug!(rounds = config.max_rounds, "rebond exhausted its round budget");
    Err(RebondError::RoundLimit {
        rounds: config.max_rounds,
    })
}

fn propose(mol: &Molecule, unstable: &[Unstable]) -> Option<Move> {
    for u1 in unstable {
        for u2 in unstable {
            if u1.idx == u2.idx || u1.particle_type == u2.particle_type {
                continue;
            }
            // both sides still miss at least one connection, so a raise
            // never pushes either past capacity
            return Some(match mol.bond_between(u1.idx, u2.idx) {
                Some(edge) => Move::Raise(edge),
                None => Move::Create(u1.idx, u2.idx),
            });
        }
    }
    None
}
