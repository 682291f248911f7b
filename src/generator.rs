//! Exhaustive generation of stable molecules of a given mass.
//!
//! Every particle weighs one, so the mass is the particle count. For a
//! mass `n` the generator walks, in a fixed order:
//!
//! 1. every multiset of `n` shapes (optionally only those containing a
//!    preferred shape), with its particles listed alphabetically by
//!    shape name;
//! 2. every one of the `2^n` polarity assignments, `+` before `-`, first
//!    particle most significant;
//! 3. every non-empty set of at most `2n` candidate bonds, by size and
//!    then lexicographically, where a candidate bond joins two particles
//!    of different shapes and opposite polarities with a multiplicity up
//!    to the smaller capacity (and never above three). A set may use each
//!    pair once and may not push a particle past capacity.
//!
//! Bond sets that leave every particle exactly at capacity and form one
//! component are laid out, classified and kept unless an identical
//! molecule (by [`fingerprint`]) was already found. No rebonding happens
//! here: only molecules that are stable as enumerated qualify.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::bond::Bond;
use crate::config::{GeneratorConfig, LayoutConfig};
use crate::fingerprint::fingerprint;
use crate::graph_ops::is_fully_connected;
use crate::layout::layout_with;
use crate::mol::Molecule;
use crate::particle::{Particle, ParticleType, Polarity};
use crate::structure::{analyze_structure, StructuralInfo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("target mass must be at least 1")]
    MassTooSmall,
    #[error("target mass {mass} exceeds the maximum of {max} particles")]
    MassTooLarge { mass: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMolecule {
    #[serde(flatten)]
    pub molecule: Molecule,
    pub structure: StructuralInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationDetails {
    pub preferred_shape: Option<ParticleType>,
    pub target_mass: usize,
    /// Candidate molecules examined: one per legal bond set.
    pub attempted: usize,
    pub type_combinations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub molecules: Vec<GeneratedMolecule>,
    pub count: usize,
    pub details: GenerationDetails,
}

/// Shape filter from a numeric request code: `1..=4` pick a shape,
/// anything else means no preference.
pub fn particle_type_from_code(code: u8) -> Option<ParticleType> {
    ParticleType::from_code(code)
}

pub fn generate(
    preferred: Option<ParticleType>,
    target_mass: usize,
) -> Result<GenerationResult, GenerationError> {
    generate_with(
        preferred,
        target_mass,
        &GeneratorConfig::default(),
        &LayoutConfig::default(),
    )
}

#[instrument(skip_all)]
pub fn generate_with(
    preferred: Option<ParticleType>,
    target_mass: usize,
    config: &GeneratorConfig,
    layout: &LayoutConfig,
) -> Result<GenerationResult, GenerationError> {
    if target_mass < 1 {
        return Err(GenerationError::MassTooSmall);
    }
    if target_mass > config.max_mass {
        return Err(GenerationError::MassTooLarge {
            mass: target_mass,
            max: config.max_mass,
        });
    }

    let combos = type_combinations(target_mass, preferred);
    let mut seen: HashSet<String> = HashSet::new();
    let mut molecules = Vec::new();
    let mut attempted = 0;

    for types in &combos {
        for polarities in polarity_assignments(target_mass) {
            let options = candidate_bonds(types, &polarities, config.max_multiplicity);
            let caps: Vec<u8> = types.iter().map(|t| t.capacity()).collect();
            for_each_bond_set(&options, &caps, 2 * target_mass, |bonds, load| {
                attempted += 1;
                if load != caps.as_slice() {
                    return;
                }
                let mut mol = build(types, &polarities, bonds);
                if !is_fully_connected(&mol) {
                    return;
                }
                if !seen.insert(fingerprint(&mol)) {
                    return;
                }
                layout_with(&mut mol, layout);
                let structure = analyze_structure(&mol);
                molecules.push(GeneratedMolecule {
                    molecule: mol,
                    structure,
                });
            });
        }
    }

    debug!(
        found = molecules.len(),
        attempted,
        type_combinations = combos.len(),
        "generation finished"
    );
    Ok(GenerationResult {
        count: molecules.len(),
        molecules,
        details: GenerationDetails {
            preferred_shape: preferred,
            target_mass,
            attempted,
            type_combinations: combos.len(),
        },
    })
}

/// Distinct shape multisets of size `n`, in order of first appearance
/// when walking all `4^n` shape sequences. Each multiset is sorted by
/// shape name.
fn type_combinations(n: usize, preferred: Option<ParticleType>) -> Vec<Vec<ParticleType>> {
    let shapes = ParticleType::ALL;
    let mut combos: Vec<Vec<ParticleType>> = Vec::new();
    let mut digits = vec![0usize; n];
    loop {
        let sequence: Vec<ParticleType> = digits.iter().map(|&d| shapes[d]).collect();
        if preferred.map_or(true, |p| sequence.contains(&p)) {
            let mut sorted = sequence;
            sorted.sort_by_key(|t| t.name());
            if !combos.contains(&sorted) {
                combos.push(sorted);
            }
        }
        // odometer, last position fastest
        let mut pos = n;
        loop {
            if pos == 0 {
                return combos;
            }
            pos -= 1;
            digits[pos] += 1;
            if digits[pos] < shapes.len() {
                break;
            }
            digits[pos] = 0;
        }
    }
}

fn polarity_assignments(n: usize) -> impl Iterator<Item = Vec<Polarity>> {
    (0..1u32 << n).map(move |mask| {
        (0..n)
            .map(|i| {
                if mask & (1 << (n - 1 - i)) == 0 {
                    Polarity::Positive
                } else {
                    Polarity::Negative
                }
            })
            .collect()
    })
}

/// `(i, j, multiplicity)` with `i < j`, pairs in order, multiplicities
/// ascending within a pair.
fn candidate_bonds(
    types: &[ParticleType],
    polarities: &[Polarity],
    max_multiplicity: u8,
) -> Vec<(usize, usize, u8)> {
    let mut options = Vec::new();
    for i in 0..types.len() {
        for j in i + 1..types.len() {
            if types[i] == types[j] || polarities[i] == polarities[j] {
                continue;
            }
            let max = types[i]
                .capacity()
                .min(types[j].capacity())
                .min(max_multiplicity);
            options.extend((1..=max).map(|m| (i, j, m)));
        }
    }
    options
}

/// Call `visit` with every legal bond set and the resulting per-particle
/// load. With no candidate bonds at all, the empty set is visited once.
fn for_each_bond_set<F>(options: &[(usize, usize, u8)], caps: &[u8], max_bonds: usize, mut visit: F)
where
    F: FnMut(&[(usize, usize, u8)], &[u8]),
{
    let n = caps.len();
    let mut load = vec![0u8; n];
    if options.is_empty() {
        visit(&[], &load);
        return;
    }

    struct Search<'a, F> {
        options: &'a [(usize, usize, u8)],
        caps: &'a [u8],
        n: usize,
        pair_used: Vec<bool>,
        chosen: Vec<(usize, usize, u8)>,
        visit: F,
    }

    impl<F: FnMut(&[(usize, usize, u8)], &[u8])> Search<'_, F> {
        fn run(&mut self, start: usize, remaining: usize, load: &mut [u8]) {
            if remaining == 0 {
                (self.visit)(&self.chosen, load);
                return;
            }
            let last = self.options.len() - remaining;
            for k in start..=last {
                let (i, j, m) = self.options[k];
                let pair = i * self.n + j;
                if self.pair_used[pair] || load[i] + m > self.caps[i] || load[j] + m > self.caps[j] {
                    continue;
                }
                self.pair_used[pair] = true;
                load[i] += m;
                load[j] += m;
                self.chosen.push((i, j, m));
                self.run(k + 1, remaining - 1, load);
                self.chosen.pop();
                load[i] -= m;
                load[j] -= m;
                self.pair_used[pair] = false;
            }
        }
    }

    let mut search = Search {
        options,
        caps,
        n,
        pair_used: vec![false; n * n],
        chosen: Vec::new(),
        visit: &mut visit,
    };
    for size in 1..=options.len().min(max_bonds) {
        search.run(0, size, &mut load);
    }
}

fn build(types: &[ParticleType], polarities: &[Polarity], bonds: &[(usize, usize, u8)]) -> Molecule {
    let mut mol = Molecule::new();
    let nodes: Vec<_> = types
        .iter()
        .zip(polarities)
        .enumerate()
        .map(|(i, (&t, &p))| mol.add_particle(Particle::new(format!("p{i}"), t, p)))
        .collect();
    for &(i, j, m) in bonds {
        mol.add_bond(nodes[i], nodes[j], Bond::new(m));
    }
    mol
}
