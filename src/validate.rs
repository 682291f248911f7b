//! Rule checking for molecule records.
//!
//! [`validate_molecule`] works on the raw [`MoleculeRecord`] so that it can
//! report data problems (missing ids, unknown shapes, dangling bond ends)
//! as well as chemistry problems. It collects every violation it finds,
//! with three exceptions that stop early:
//!
//! - a record without a `particles` or `bonds` list;
//! - a record with fewer than two particles;
//! - any per-particle field error, since later checks need every
//!   particle's id, shape and polarity.
//!
//! Under-capacity particles count as errors: a valid molecule is stable.
//! When connections are missing and no positive/negative pair of
//! different shapes is left to supply them, an extra
//! [`ValidationError::Unstabilizable`] is reported.

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::graph_ops::bfs_component;
use crate::mol::Molecule;
use crate::particle::{ParticleType, Polarity};
use crate::record::MoleculeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("molecule has no particles")]
    MissingParticles,
    #[error("molecule has no bonds")]
    MissingBonds,
    #[error("empty molecule: a valid molecule has at least 2 particles")]
    Empty,
    #[error("single particle: a valid molecule has at least 2 particles")]
    SingleParticle,

    #[error("particle {index} has no id")]
    MissingId { index: usize },
    #[error("duplicate particle id {id}")]
    DuplicateId { id: String },
    #[error("particle {id} has no type")]
    MissingType { id: String },
    #[error("particle {id} has invalid type {value:?}")]
    UnknownType { id: String, value: String },
    #[error("particle {id} has no polarity")]
    MissingPolarity { id: String },
    #[error("particle {id} has invalid polarity {value:?}")]
    InvalidPolarity { id: String, value: String },
    #[error("{particle_type} particles carry different polarities")]
    MixedPolarity { particle_type: ParticleType },

    #[error("bond {index} is missing an endpoint")]
    MissingEndpoint { index: usize },
    #[error("bond references unknown particle {id}")]
    UnknownParticle { id: String },
    #[error("bond {from}-{to} has no multiplicity")]
    MissingMultiplicity { from: String, to: String },
    #[error("bond {from}-{to} has invalid multiplicity {value}")]
    InvalidMultiplicity { from: String, to: String, value: i64 },
    #[error("bond on {id} is a self-loop")]
    SelfLoop { id: String },
    #[error("more than one bond between {from} and {to}")]
    DuplicateBond { from: String, to: String },

    #[error("particle {id} ({particle_type}) exceeds its capacity: {actual}/{capacity}")]
    OverCapacity {
        id: String,
        particle_type: ParticleType,
        actual: i64,
        capacity: u8,
    },
    #[error("particle {id} ({particle_type}) is not stable: {actual}/{capacity} connections")]
    Unstable {
        id: String,
        particle_type: ParticleType,
        actual: i64,
        capacity: u8,
    },
    #[error("bond {from}-{to} joins two {particle_type} particles")]
    SameType {
        from: String,
        to: String,
        particle_type: ParticleType,
    },
    #[error("bond {from}-{to} joins two {polarity} particles")]
    SamePolarity {
        from: String,
        to: String,
        polarity: Polarity,
    },
    #[error("molecule is not connected")]
    Disconnected,
    #[error("cannot stabilize: {missing} connections missing and no compatible particles left to bond")]
    Unstabilizable { missing: i64 },
}

struct Checked<'a> {
    id: &'a str,
    particle_type: ParticleType,
    polarity: Polarity,
}

pub fn validate_molecule(record: &MoleculeRecord) -> Result<(), Vec<ValidationError>> {
    let Some(particles) = &record.particles else {
        return Err(vec![ValidationError::MissingParticles]);
    };
    let Some(bonds) = &record.bonds else {
        return Err(vec![ValidationError::MissingBonds]);
    };
    match particles.len() {
        0 => return Err(vec![ValidationError::Empty]),
        1 => return Err(vec![ValidationError::SingleParticle]),
        _ => {}
    }

    let mut errors = Vec::new();

    let mut checked: Vec<Checked<'_>> = Vec::with_capacity(particles.len());
    let mut seen_ids = HashSet::new();
    for (index, p) in particles.iter().enumerate() {
        let Some(id) = p.id.as_deref() else {
            errors.push(ValidationError::MissingId { index });
            continue;
        };
        if !seen_ids.insert(id) {
            errors.push(ValidationError::DuplicateId { id: id.to_string() });
            continue;
        }
        let Some(type_name) = p.particle_type.as_deref() else {
            errors.push(ValidationError::MissingType { id: id.to_string() });
            continue;
        };
        let Some(particle_type) = ParticleType::from_name(type_name) else {
            errors.push(ValidationError::UnknownType {
                id: id.to_string(),
                value: type_name.to_string(),
            });
            continue;
        };
        let Some(sign) = p.polarity.as_deref() else {
            errors.push(ValidationError::MissingPolarity { id: id.to_string() });
            continue;
        };
        let Some(polarity) = Polarity::from_symbol(sign) else {
            errors.push(ValidationError::InvalidPolarity {
                id: id.to_string(),
                value: sign.to_string(),
            });
            continue;
        };
        checked.push(Checked {
            id,
            particle_type,
            polarity,
        });
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    check_polarity_consistency(&checked, &mut errors);

    let index_of: HashMap<&str, usize> = checked
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    // bonds whose endpoints both resolve: (from, to, multiplicity)
    let mut resolved: Vec<(usize, usize, Option<i64>)> = Vec::new();
    let mut pairs = HashSet::new();
    for (index, bond) in bonds.iter().enumerate() {
        let (Some(from), Some(to)) = (bond.from.as_deref(), bond.to.as_deref()) else {
            errors.push(ValidationError::MissingEndpoint { index });
            continue;
        };
        let a = index_of.get(from).copied();
        let b = index_of.get(to).copied();
        for (id, found) in [(from, a), (to, b)] {
            if found.is_none() {
                errors.push(ValidationError::UnknownParticle { id: id.to_string() });
            }
        }
        match bond.multiplicity {
            None => errors.push(ValidationError::MissingMultiplicity {
                from: from.to_string(),
                to: to.to_string(),
            }),
            Some(value) if value < 1 => errors.push(ValidationError::InvalidMultiplicity {
                from: from.to_string(),
                to: to.to_string(),
                value,
            }),
            Some(_) => {}
        }
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };
        if a == b {
            errors.push(ValidationError::SelfLoop { id: from.to_string() });
        } else if !pairs.insert((a.min(b), a.max(b))) {
            errors.push(ValidationError::DuplicateBond {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        resolved.push((a, b, bond.multiplicity));
    }

    let mut load = vec![0i64; checked.len()];
    for &(a, b, multiplicity) in &resolved {
        // rejected multiplicities are reported above and carry no load
        if let Some(m) = multiplicity.filter(|&m| m >= 1) {
            load[a] = load[a].saturating_add(m);
            load[b] = load[b].saturating_add(m);
        }
    }
    for (p, &actual) in checked.iter().zip(&load) {
        let capacity = p.particle_type.capacity();
        let cap = i64::from(capacity);
        if actual > cap {
            errors.push(ValidationError::OverCapacity {
                id: p.id.to_string(),
                particle_type: p.particle_type,
                actual,
                capacity,
            });
        } else if actual < cap {
            errors.push(ValidationError::Unstable {
                id: p.id.to_string(),
                particle_type: p.particle_type,
                actual,
                capacity,
            });
        }
    }

    for &(a, b, _) in &resolved {
        if a == b {
            continue;
        }
        let (pa, pb) = (&checked[a], &checked[b]);
        if pa.particle_type == pb.particle_type {
            errors.push(ValidationError::SameType {
                from: pa.id.to_string(),
                to: pb.id.to_string(),
                particle_type: pa.particle_type,
            });
        }
        if pa.polarity == pb.polarity {
            errors.push(ValidationError::SamePolarity {
                from: pa.id.to_string(),
                to: pb.id.to_string(),
                polarity: pa.polarity,
            });
        }
    }

    if !all_reachable(checked.len(), &resolved) {
        errors.push(ValidationError::Disconnected);
    }

    check_stabilizable(&checked, &load, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn is_valid(record: &MoleculeRecord) -> bool {
    validate_molecule(record).is_ok()
}

/// Validate a typed molecule through its record form.
pub fn validate(mol: &Molecule) -> Result<(), Vec<ValidationError>> {
    validate_molecule(&MoleculeRecord::from(mol))
}

/// One error per shape whose particles disagree on polarity, in order of
/// the shape's first appearance.
fn check_polarity_consistency(checked: &[Checked<'_>], errors: &mut Vec<ValidationError>) {
    let mut groups: Vec<(ParticleType, Polarity, bool)> = Vec::new();
    for p in checked {
        match groups.iter_mut().find(|(t, _, _)| *t == p.particle_type) {
            Some((_, first, mixed)) => *mixed |= *first != p.polarity,
            None => groups.push((p.particle_type, p.polarity, false)),
        }
    }
    errors.extend(
        groups
            .into_iter()
            .filter(|&(_, _, mixed)| mixed)
            .map(|(particle_type, _, _)| ValidationError::MixedPolarity { particle_type }),
    );
}

/// Records may carry dangling bonds, so connectivity is checked on the
/// resolved index pairs rather than on a built [`Molecule`].
fn all_reachable(n: usize, bonds: &[(usize, usize, Option<i64>)]) -> bool {
    let mut adj = vec![Vec::new(); n];
    for &(a, b, _) in bonds {
        adj[a].push(NodeIndex::new(b));
        adj[b].push(NodeIndex::new(a));
    }
    let mut visited = vec![false; n];
    bfs_component(&adj, NodeIndex::new(0), &mut visited).len() == n
}

fn check_stabilizable(checked: &[Checked<'_>], load: &[i64], errors: &mut Vec<ValidationError>) {
    let mut missing = 0;
    let mut positive = HashSet::new();
    let mut negative = HashSet::new();
    for (p, &actual) in checked.iter().zip(load) {
        let need = i64::from(p.particle_type.capacity()).saturating_sub(actual);
        if need <= 0 {
            continue;
        }
        missing += need;
        match p.polarity {
            Polarity::Positive => positive.insert(p.particle_type),
            Polarity::Negative => negative.insert(p.particle_type),
        };
    }
    if missing == 0 {
        return;
    }
    let can_pair = positive
        .iter()
        .any(|pt| negative.iter().any(|nt| pt != nt));
    if !can_pair {
        errors.push(ValidationError::Unstabilizable { missing });
    }
}
