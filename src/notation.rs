//! Compact text notation for molecules.
//!
//! Particles are written as a shape symbol followed by a sign (`C`, `Q`,
//! `T`, `P` for circle, square, triangle, pentagon), separated by spaces.
//! An optional `;` starts the bond list: `i-j` for a single bond between
//! the `i`th and `j`th particle, `i-j:m` for multiplicity `m`.
//!
//! ```
//! use molsynth::from_notation;
//!
//! let mol = from_notation("C+ Q- C+; 0-1 1-2").unwrap();
//! assert_eq!(mol.particle_count(), 3);
//! assert_eq!(mol.bond_count(), 2);
//! ```
//!
//! Particles receive the ids `p0`, `p1`, … in written order.

use std::fmt::Write;

use thiserror::Error;

use crate::bond::Bond;
use crate::mol::Molecule;
use crate::particle::{Particle, ParticleType, Polarity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid particle token {0:?}")]
    InvalidParticle(String),
    #[error("invalid bond token {0:?}")]
    InvalidBond(String),
    #[error("bond {token:?} references particle {index}, but only {count} exist")]
    IndexOutOfRange {
        token: String,
        index: usize,
        count: usize,
    },
    #[error("bond {0:?} is a self-loop")]
    SelfLoop(String),
    #[error("bond {0:?} duplicates an earlier bond")]
    DuplicateBond(String),
}

pub fn from_notation(s: &str) -> Result<Molecule, NotationError> {
    let (particle_part, bond_part) = match s.split_once(';') {
        Some((p, b)) => (p, b),
        None => (s, ""),
    };

    let mut mol = Molecule::new();
    for (i, token) in particle_part.split_whitespace().enumerate() {
        let (particle_type, polarity) = parse_particle(token)
            .ok_or_else(|| NotationError::InvalidParticle(token.to_string()))?;
        mol.add_particle(Particle::new(format!("p{i}"), particle_type, polarity));
    }

    let count = mol.particle_count();
    let nodes: Vec<_> = mol.particles().collect();
    for token in bond_part.split_whitespace() {
        let (a, b, multiplicity) =
            parse_bond(token).ok_or_else(|| NotationError::InvalidBond(token.to_string()))?;
        for index in [a, b] {
            if index >= count {
                return Err(NotationError::IndexOutOfRange {
                    token: token.to_string(),
                    index,
                    count,
                });
            }
        }
        if a == b {
            return Err(NotationError::SelfLoop(token.to_string()));
        }
        if mol.bond_between(nodes[a], nodes[b]).is_some() {
            return Err(NotationError::DuplicateBond(token.to_string()));
        }
        mol.add_bond(nodes[a], nodes[b], Bond::new(multiplicity));
    }

    Ok(mol)
}

fn parse_particle(token: &str) -> Option<(ParticleType, Polarity)> {
    let mut chars = token.chars();
    let particle_type = match chars.next()? {
        'C' => ParticleType::Circle,
        'Q' => ParticleType::Square,
        'T' => ParticleType::Triangle,
        'P' => ParticleType::Pentagon,
        _ => return None,
    };
    let polarity = match chars.next()? {
        '+' => Polarity::Positive,
        '-' => Polarity::Negative,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some((particle_type, polarity))
}

fn parse_bond(token: &str) -> Option<(usize, usize, u8)> {
    let (pair, multiplicity) = match token.split_once(':') {
        Some((pair, m)) => (pair, m.parse::<u8>().ok().filter(|&m| m >= 1)?),
        None => (token, 1),
    };
    let (a, b) = pair.split_once('-')?;
    Some((a.parse().ok()?, b.parse().ok()?, multiplicity))
}

/// Write a molecule back in compact notation, in node order.
pub fn to_notation(mol: &Molecule) -> String {
    let mut out = String::new();
    for (i, idx) in mol.particles().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let p = mol.particle(idx);
        out.push(p.particle_type.symbol());
        out.push(p.polarity.symbol());
    }
    let mut first = true;
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        out.push_str(if first { "; " } else { " " });
        first = false;
        let _ = write!(out, "{}-{}", a.index(), b.index());
        let m = mol.bond(edge).multiplicity;
        if m > 1 {
            let _ = write!(out, ":{m}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_multiplicities() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        assert_eq!(mol.particle_count(), 3);
        let q = mol.find_particle("p0").unwrap();
        let t = mol.find_particle("p1").unwrap();
        let e = mol.bond_between(q, t).unwrap();
        assert_eq!(mol.bond(e).multiplicity, 2);
    }

    #[test]
    fn particles_only() {
        let mol = from_notation("C+ P-").unwrap();
        assert_eq!(mol.particle_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn writer_round_trip() {
        let text = "C+ Q- T+; 0-1 1-2:2";
        assert_eq!(to_notation(&from_notation(text).unwrap()), text);
    }

    #[test]
    fn errors() {
        assert!(matches!(
            from_notation("X+"),
            Err(NotationError::InvalidParticle(_))
        ));
        assert!(matches!(
            from_notation("C+ Q-; 0-3"),
            Err(NotationError::IndexOutOfRange { index: 3, .. })
        ));
        assert!(matches!(
            from_notation("C+ Q-; 0-0"),
            Err(NotationError::SelfLoop(_))
        ));
        assert!(matches!(
            from_notation("C+ Q-; 0-1 1-0"),
            Err(NotationError::DuplicateBond(_))
        ));
        assert!(matches!(
            from_notation("C+ Q-; 0-1:0"),
            Err(NotationError::InvalidBond(_))
        ));
    }
}
