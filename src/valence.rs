use petgraph::graph::NodeIndex;

use crate::mol::Mol;
use crate::particle::ParticleType;
use crate::traits::{HasMultiplicity, HasParticleType};

/// Sum of bond multiplicities incident to `particle`.
pub fn total_connections<A, B>(mol: &Mol<A, B>, particle: NodeIndex) -> u32
where
    B: HasMultiplicity,
{
    mol.bonds_of(particle)
        .map(|e| u32::from(mol.bond(e).multiplicity()))
        .sum()
}

/// Incident multiplicity sums for every particle, indexed by node.
pub fn connection_counts<A, B>(mol: &Mol<A, B>) -> Vec<u32>
where
    B: HasMultiplicity,
{
    let mut counts = vec![0u32; mol.particle_count()];
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            let m = u32::from(mol.bond(edge).multiplicity());
            counts[a.index()] += m;
            counts[b.index()] += m;
        }
    }
    counts
}

/// A particle short of its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unstable {
    pub idx: NodeIndex,
    pub particle_type: ParticleType,
    pub missing: u32,
}

/// Particles whose incident multiplicity is below capacity, in node order.
pub fn unstable_particles<A, B>(mol: &Mol<A, B>) -> Vec<Unstable>
where
    A: HasParticleType,
    B: HasMultiplicity,
{
    let counts = connection_counts(mol);
    mol.particles()
        .filter_map(|idx| {
            let particle_type = mol.particle(idx).particle_type();
            let cap = u32::from(particle_type.capacity());
            let have = counts[idx.index()];
            (have < cap).then_some(Unstable {
                idx,
                particle_type,
                missing: cap - have,
            })
        })
        .collect()
}

/// Whether every particle carries exactly its capacity.
pub fn is_stable<A, B>(mol: &Mol<A, B>) -> bool
where
    A: HasParticleType,
    B: HasMultiplicity,
{
    let counts = connection_counts(mol);
    mol.particles()
        .all(|idx| counts[idx.index()] == u32::from(mol.particle(idx).capacity()))
}

/// A particle carrying more than its capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError {
    pub particle_idx: NodeIndex,
    pub particle_type: ParticleType,
    pub actual: u32,
}

impl std::fmt::Display for CapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "particle {} ({}): {} connections exceed capacity {}",
            self.particle_idx.index(),
            self.particle_type,
            self.actual,
            self.particle_type.capacity(),
        )
    }
}

impl std::error::Error for CapacityError {}

pub fn check_capacity<A, B>(mol: &Mol<A, B>) -> Result<(), Vec<CapacityError>>
where
    A: HasParticleType,
    B: HasMultiplicity,
{
    let counts = connection_counts(mol);
    let errors: Vec<CapacityError> = mol
        .particles()
        .filter_map(|idx| {
            let particle_type = mol.particle(idx).particle_type();
            let actual = counts[idx.index()];
            (actual > u32::from(particle_type.capacity())).then_some(CapacityError {
                particle_idx: idx,
                particle_type,
                actual,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
