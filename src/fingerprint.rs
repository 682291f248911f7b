//! Structural identity of molecules.
//!
//! A fingerprint is a multiset summary: the sorted particle signatures
//! plus the sorted signature of every bond. It ignores ids, coordinates
//! and declaration order, so relabeled or redrawn copies of one molecule
//! compare equal. It is not a full graph canonicalization: two
//! non-isomorphic molecules can share a fingerprint when their bond
//! multisets coincide. Generated catalogs and discovery deduplication
//! rely on this exact key.

use std::hash::Hasher;

use crate::mol::Mol;
use crate::traits::{HasMultiplicity, HasParticleType, HasPolarity};

/// 64-bit FNV-1a, stable across processes and platforms.
pub(crate) struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    pub(crate) fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

fn signature<A: HasParticleType + HasPolarity>(particle: &A) -> String {
    format!("{}{}", particle.particle_type(), particle.polarity())
}

/// `circle+,square-,...::circle+-square-x1|...`
///
/// ```
/// use molsynth::{fingerprint, from_notation};
///
/// let mol = from_notation("Q- C+; 0-1").unwrap();
/// assert_eq!(fingerprint(&mol), "circle+,square-::circle+-square-x1");
/// ```
pub fn fingerprint<A, B>(mol: &Mol<A, B>) -> String
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    let mut particles: Vec<String> = mol
        .particles()
        .map(|idx| signature(mol.particle(idx)))
        .collect();
    particles.sort();

    let mut bonds: Vec<String> = mol
        .bonds()
        .filter_map(|edge| {
            let (a, b) = mol.bond_endpoints(edge)?;
            let mut ends = [signature(mol.particle(a)), signature(mol.particle(b))];
            ends.sort();
            Some(format!(
                "{}-{}x{}",
                ends[0],
                ends[1],
                mol.bond(edge).multiplicity()
            ))
        })
        .collect();
    bonds.sort();

    format!("{}::{}", particles.join(","), bonds.join("|"))
}

/// FNV-1a of the fingerprint string.
pub fn fingerprint_hash<A, B>(mol: &Mol<A, B>) -> u64
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    let mut h = Fnv1aHasher::new();
    h.write(fingerprint(mol).as_bytes());
    h.finish()
}

/// Same particle count, same bond count, same fingerprint.
pub fn are_identical<A, B>(a: &Mol<A, B>, b: &Mol<A, B>) -> bool
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    a.particle_count() == b.particle_count()
        && a.bond_count() == b.bond_count()
        && fingerprint(a) == fingerprint(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::notation::from_notation;

    #[test]
    fn known_string() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        assert_eq!(
            fingerprint(&mol),
            "circle-,square-,triangle+::circle--triangle+x1|square--triangle+x2"
        );
    }

    #[test]
    fn order_and_ids_do_not_matter() {
        let a = from_notation("C+ Q- C+; 0-1 1-2").unwrap();
        let b = from_notation("Q- C+ C+; 1-0 0-2").unwrap();
        assert!(are_identical(&a, &b));
        assert_eq!(fingerprint_hash(&a), fingerprint_hash(&b));
    }

    #[test]
    fn coordinates_do_not_matter() {
        let a = from_notation("T+ C- C- C-; 0-1 0-2 0-3").unwrap();
        let mut b = a.clone();
        layout(&mut b);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn polarity_and_multiplicity_matter() {
        let a = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        let b = from_notation("Q+ T- C+; 0-1:2 1-2").unwrap();
        let c = from_notation("Q- T+ C-; 0-1 1-2").unwrap();
        assert!(!are_identical(&a, &b));
        assert!(!are_identical(&a, &c));
    }

    #[test]
    fn empty_molecule() {
        let mol = from_notation("").unwrap();
        assert_eq!(fingerprint(&mol), "::");
    }

    #[test]
    fn fnv_reference_value() {
        let mut h = Fnv1aHasher::new();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }
}
