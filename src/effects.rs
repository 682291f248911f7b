//! Bond-pattern predicates for gameplay effects.
//!
//! An effect is unlocked by a molecule that contains all of its
//! [`BondRequirement`]s: bonds between particles of given shapes and
//! polarities with a given multiplicity. Which requirements an effect gets
//! is derived from a seed with [`assign_requirements`], so each save can
//! have its own effect table while staying reproducible.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fnv1aHasher;
use crate::mol::Mol;
use crate::particle::{ParticleType, Polarity};
use crate::traits::{HasMultiplicity, HasParticleType, HasPolarity};

/// Requirements handed to each effect.
pub const REQUIREMENTS_PER_EFFECT: usize = 3;

const POLARITY_RETRIES: usize = 10;

/// A bond between a `type1`/`polarity1` particle and a `type2`/`polarity2`
/// particle with the given multiplicity, in either direction.
///
/// Constructed through [`BondRequirement::new`], which orders the two ends
/// by shape name so equal requirements compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BondRequirement {
    pub type1: ParticleType,
    pub polarity1: Polarity,
    pub type2: ParticleType,
    pub polarity2: Polarity,
    pub multiplicity: u8,
}

impl BondRequirement {
    pub fn new(
        type1: ParticleType,
        polarity1: Polarity,
        type2: ParticleType,
        polarity2: Polarity,
        multiplicity: u8,
    ) -> Self {
        if type1.name() <= type2.name() {
            Self {
                type1,
                polarity1,
                type2,
                polarity2,
                multiplicity,
            }
        } else {
            Self {
                type1: type2,
                polarity1: polarity2,
                type2: type1,
                polarity2: polarity1,
                multiplicity,
            }
        }
    }

    fn matches(&self, a: (ParticleType, Polarity), b: (ParticleType, Polarity), multiplicity: u8) -> bool {
        let first = (self.type1, self.polarity1);
        let second = (self.type2, self.polarity2);
        multiplicity == self.multiplicity && ((a == first && b == second) || (a == second && b == first))
    }
}

impl fmt::Display for BondRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}{} x{}",
            self.type1, self.polarity1, self.type2, self.polarity2, self.multiplicity
        )
    }
}

fn ends<A, B>(mol: &Mol<A, B>) -> impl Iterator<Item = ((ParticleType, Polarity), (ParticleType, Polarity), u8)> + '_
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    mol.bonds().filter_map(move |edge| {
        let (a, b) = mol.bond_endpoints(edge)?;
        let (pa, pb) = (mol.particle(a), mol.particle(b));
        Some((
            (pa.particle_type(), pa.polarity()),
            (pb.particle_type(), pb.polarity()),
            mol.bond(edge).multiplicity(),
        ))
    })
}

pub fn has_requirement<A, B>(mol: &Mol<A, B>, requirement: &BondRequirement) -> bool
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    ends(mol).any(|(a, b, m)| requirement.matches(a, b, m))
}

/// `true` for an empty requirement list.
pub fn has_all_requirements<A, B>(mol: &Mol<A, B>, requirements: &[BondRequirement]) -> bool
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    requirements.iter().all(|r| has_requirement(mol, r))
}

/// Every distinct bond pattern present in `mol`, normalized.
pub fn bond_patterns<A, B>(mol: &Mol<A, B>) -> BTreeSet<BondRequirement>
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    ends(mol)
        .map(|((t1, p1), (t2, p2), m)| BondRequirement::new(t1, p1, t2, p2, m))
        .collect()
}

/// Every requirement a legal bond can satisfy: different shapes, opposite
/// polarities, multiplicity up to the smaller capacity. Twenty in all,
/// in a fixed order.
pub fn all_possible_requirements() -> Vec<BondRequirement> {
    let polarities = [Polarity::Positive, Polarity::Negative];
    let mut all = Vec::new();
    for t1 in ParticleType::ALL {
        for t2 in ParticleType::ALL {
            if t1 == t2 {
                continue;
            }
            for p1 in polarities {
                for p2 in polarities {
                    if p1 == p2 {
                        continue;
                    }
                    let max = t1.capacity().min(t2.capacity()).min(3);
                    for m in 1..=max {
                        let requirement = BondRequirement::new(t1, p1, t2, p2, m);
                        if !all.contains(&requirement) {
                            all.push(requirement);
                        }
                    }
                }
            }
        }
    }
    all
}

/// xorshift64.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

/// Give every effect [`REQUIREMENTS_PER_EFFECT`] requirements.
///
/// Each effect draws one polarity per shape from a generator seeded with
/// FNV-1a of `seed` and the effect name, keeps the requirements
/// compatible with those polarities, and takes three consecutive ones
/// (wrapping) from a drawn start. A draw leaving fewer than three
/// compatible requirements is retried a bounded number of times; an
/// effect that never gets three ends up with none.
pub fn assign_requirements<S: AsRef<str>>(
    effect_names: &[S],
    seed: &str,
) -> BTreeMap<String, Vec<BondRequirement>> {
    let all = all_possible_requirements();
    effect_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut h = Fnv1aHasher::new();
            h.write(seed.as_bytes());
            h.write(name.as_bytes());
            let mut rng = SimpleRng::new(h.finish());

            let mut picked = Vec::new();
            for _ in 0..=POLARITY_RETRIES {
                let chosen: Vec<(ParticleType, Polarity)> = ParticleType::ALL
                    .iter()
                    .map(|&t| {
                        let polarity = if rng.next_u64() % 2 == 0 {
                            Polarity::Positive
                        } else {
                            Polarity::Negative
                        };
                        (t, polarity)
                    })
                    .collect();
                let compatible: Vec<BondRequirement> = all
                    .iter()
                    .filter(|r| {
                        chosen.contains(&(r.type1, r.polarity1))
                            && chosen.contains(&(r.type2, r.polarity2))
                    })
                    .copied()
                    .collect();
                if compatible.len() >= REQUIREMENTS_PER_EFFECT {
                    let start = rng.next_index(compatible.len());
                    picked = (0..REQUIREMENTS_PER_EFFECT)
                        .map(|k| compatible[(start + k) % compatible.len()])
                        .collect();
                    break;
                }
            }
            (name.to_string(), picked)
        })
        .collect()
}

/// Names of the effects whose requirements `mol` meets. Effects without
/// requirements never match.
pub fn matching_effects<'a, A, B>(
    mol: &Mol<A, B>,
    table: &'a BTreeMap<String, Vec<BondRequirement>>,
) -> Vec<&'a str>
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    table
        .iter()
        .filter(|(_, reqs)| !reqs.is_empty() && has_all_requirements(mol, reqs))
        .map(|(name, _)| name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_notation;
    use ParticleType::*;
    use Polarity::*;

    #[test]
    fn normalization_orders_by_name() {
        let a = BondRequirement::new(Triangle, Positive, Square, Negative, 2);
        let b = BondRequirement::new(Square, Negative, Triangle, Positive, 2);
        assert_eq!(a, b);
        assert_eq!(a.type1, Square);
        // pentagon sorts before square by name
        let c = BondRequirement::new(Square, Positive, Pentagon, Negative, 1);
        assert_eq!(c.type1, Pentagon);
        assert_eq!(c.polarity1, Negative);
    }

    #[test]
    fn twenty_possible() {
        let all = all_possible_requirements();
        assert_eq!(all.len(), 20);
        assert_eq!(all[0], BondRequirement::new(Circle, Positive, Square, Negative, 1));
        assert!(all.iter().all(|r| r.type1 != r.type2 && r.polarity1 != r.polarity2));
        assert_eq!(all.iter().filter(|r| r.multiplicity == 3).count(), 2);
    }

    #[test]
    fn requirement_matching_is_direction_agnostic() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        let double = BondRequirement::new(Triangle, Positive, Square, Negative, 2);
        let single = BondRequirement::new(Square, Negative, Triangle, Positive, 1);
        let circle = BondRequirement::new(Circle, Negative, Triangle, Positive, 1);
        assert!(has_requirement(&mol, &double));
        assert!(!has_requirement(&mol, &single));
        assert!(has_all_requirements(&mol, &[double, circle]));
        assert!(!has_all_requirements(&mol, &[double, single]));
        assert!(has_all_requirements(&mol, &[]));
    }

    #[test]
    fn patterns_collapse_duplicates() {
        let mol = from_notation("C+ Q- C+; 0-1 1-2").unwrap();
        let patterns = bond_patterns(&mol);
        assert_eq!(patterns.len(), 1);
        assert!(patterns.contains(&BondRequirement::new(Circle, Positive, Square, Negative, 1)));
    }

    #[test]
    fn assignment_is_reproducible() {
        let names = ["Analgesia", "Euphoria", "Insomnia"];
        let first = assign_requirements(&names, "save-1");
        let second = assign_requirements(&names, "save-1");
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn assigned_requirements_are_consistent() {
        let names: Vec<String> = (0..20).map(|i| format!("effect-{i}")).collect();
        let table = assign_requirements(&names, "seed");
        for reqs in table.values() {
            if reqs.is_empty() {
                continue;
            }
            assert_eq!(reqs.len(), REQUIREMENTS_PER_EFFECT);
            let distinct: BTreeSet<_> = reqs.iter().collect();
            assert_eq!(distinct.len(), REQUIREMENTS_PER_EFFECT);
            // one polarity per shape within an effect
            let mut polarity_of = BTreeMap::new();
            for r in reqs {
                for (t, p) in [(r.type1, r.polarity1), (r.type2, r.polarity2)] {
                    assert_eq!(*polarity_of.entry(t).or_insert(p), p);
                }
            }
        }
    }

    #[test]
    fn matching_effects_by_table() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        let mut table = BTreeMap::new();
        table.insert(
            "bitter".to_string(),
            vec![
                BondRequirement::new(Square, Negative, Triangle, Positive, 2),
                BondRequirement::new(Circle, Negative, Triangle, Positive, 1),
            ],
        );
        table.insert(
            "sweet".to_string(),
            vec![BondRequirement::new(Pentagon, Positive, Triangle, Negative, 3)],
        );
        table.insert("inert".to_string(), Vec::new());
        assert_eq!(matching_effects(&mol, &table), vec!["bitter"]);
    }
}
