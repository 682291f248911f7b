//! Observable molecule properties: mass, net charge and formula.
//!
//! The formula lists `C`, `Q`, `T`, `P` in capacity order, each followed
//! by its count in Unicode superscript when the count is above one.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::mol::Mol;
use crate::particle::{ParticleType, Polarity};
use crate::traits::{HasMultiplicity, HasParticleType, HasPolarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeLabel {
    Positive,
    Negative,
    Neutral,
}

impl ChargeLabel {
    pub fn from_charge(charge: i32) -> Self {
        match charge.cmp(&0) {
            std::cmp::Ordering::Greater => ChargeLabel::Positive,
            std::cmp::Ordering::Less => ChargeLabel::Negative,
            std::cmp::Ordering::Equal => ChargeLabel::Neutral,
        }
    }
}

impl fmt::Display for ChargeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChargeLabel::Positive => "positive",
            ChargeLabel::Negative => "negative",
            ChargeLabel::Neutral => "neutral",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoleculeProperties {
    /// Particle count.
    pub mass: usize,
    /// Positive particles minus negative ones.
    pub charge: i32,
    pub charge_label: ChargeLabel,
    pub formula: String,
    /// Distinct bond multiplicities present.
    pub multiplicities: BTreeSet<u8>,
}

pub fn properties<A, B>(mol: &Mol<A, B>) -> MoleculeProperties
where
    A: HasParticleType + HasPolarity,
    B: HasMultiplicity,
{
    let charge = mol
        .particles()
        .map(|idx| match mol.particle(idx).polarity() {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        })
        .sum();
    MoleculeProperties {
        mass: mol.particle_count(),
        charge,
        charge_label: ChargeLabel::from_charge(charge),
        formula: formula(mol),
        multiplicities: mol.bonds().map(|e| mol.bond(e).multiplicity()).collect(),
    }
}

/// ```
/// use molsynth::{formula, from_notation};
///
/// let mol = from_notation("T+ C- C- C-; 0-1 0-2 0-3").unwrap();
/// assert_eq!(formula(&mol), "C³T");
/// ```
pub fn formula<A: HasParticleType, B>(mol: &Mol<A, B>) -> String {
    let mut counts = [0u32; 4];
    for idx in mol.particles() {
        counts[mol.particle(idx).particle_type().priority() as usize] += 1;
    }

    let mut result = String::new();
    for t in ParticleType::ALL {
        append_shape(&mut result, t.symbol(), counts[t.priority() as usize]);
    }
    result
}

fn append_shape(buf: &mut String, symbol: char, count: u32) {
    if count == 0 {
        return;
    }
    buf.push(symbol);
    if count > 1 {
        buf.extend(count.to_string().chars().map(superscript));
    }
}

fn superscript(digit: char) -> char {
    match digit {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_notation;

    #[test]
    fn star_properties() {
        let mol = from_notation("T+ C- C- C-; 0-1 0-2 0-3").unwrap();
        let p = properties(&mol);
        assert_eq!(p.mass, 4);
        assert_eq!(p.charge, -2);
        assert_eq!(p.charge_label, ChargeLabel::Negative);
        assert_eq!(p.formula, "C³T");
        assert_eq!(p.multiplicities, BTreeSet::from([1]));
    }

    #[test]
    fn formula_in_capacity_order() {
        let mol = from_notation("P+ T- Q+ C- C-").unwrap();
        assert_eq!(formula(&mol), "C²QTP");
    }

    #[test]
    fn multi_digit_superscript() {
        let notation = vec!["C+"; 12].join(" ");
        let mol = from_notation(&notation).unwrap();
        assert_eq!(formula(&mol), "C¹²");
    }

    #[test]
    fn neutral_and_mixed_multiplicities() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        let p = properties(&mol);
        assert_eq!(p.charge, -1);
        let mol = from_notation("C+ C-").unwrap();
        let p = properties(&mol);
        assert_eq!(p.charge_label, ChargeLabel::Neutral);
        assert!(p.multiplicities.is_empty());
    }

    #[test]
    fn json_shape() {
        let mol = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
        let json = serde_json::to_value(properties(&mol)).unwrap();
        assert_eq!(json["charge_label"], "negative");
        assert_eq!(json["formula"], "CQT");
        assert_eq!(json["multiplicities"], serde_json::json!([1, 2]));
    }
}
