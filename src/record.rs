//! Wire records for molecules.
//!
//! [`MoleculeRecord`] mirrors the JSON shape exchanged with the storage
//! and transport layers (`{"particles": [...], "bonds": [...]}`). Every
//! field is optional so that a malformed record still deserializes and the
//! [`validate`](crate::validate) module can report what is missing instead
//! of failing at the parsing stage.
//!
//! [`Molecule`] converts from a record with [`TryFrom`] and serializes back
//! to the same shape.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::bond::Bond;
use crate::mol::Molecule;
use crate::particle::{Particle, ParticleType, Polarity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particles: Option<Vec<ParticleRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonds: Option<Vec<BondRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub particle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarity: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<i64>,
}

/// Error returned when a record cannot be represented as a [`Molecule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no particles")]
    MissingParticles,
    #[error("record has no bonds")]
    MissingBonds,
    #[error("particle {index} has no {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("particle {id} has unknown type {value:?}")]
    UnknownType { id: String, value: String },
    #[error("particle {id} has unknown polarity {value:?}")]
    UnknownPolarity { id: String, value: String },
    #[error("duplicate particle id {0}")]
    DuplicateId(String),
    #[error("bond {index} is missing an endpoint")]
    MissingEndpoint { index: usize },
    #[error("bond references unknown particle {0}")]
    UnknownParticle(String),
    #[error("bond {from}-{to} has invalid multiplicity {value:?}")]
    InvalidMultiplicity {
        from: String,
        to: String,
        value: Option<i64>,
    },
}

impl TryFrom<&MoleculeRecord> for Molecule {
    type Error = RecordError;

    fn try_from(record: &MoleculeRecord) -> Result<Self, Self::Error> {
        let particles = record
            .particles
            .as_ref()
            .ok_or(RecordError::MissingParticles)?;
        let bonds = record.bonds.as_ref().ok_or(RecordError::MissingBonds)?;

        let mut mol = Molecule::new();
        let mut seen = HashSet::new();
        for (index, p) in particles.iter().enumerate() {
            let id = p
                .id
                .clone()
                .ok_or(RecordError::MissingField { index, field: "id" })?;
            let type_name = p
                .particle_type
                .as_deref()
                .ok_or(RecordError::MissingField { index, field: "type" })?;
            let particle_type =
                ParticleType::from_name(type_name).ok_or_else(|| RecordError::UnknownType {
                    id: id.clone(),
                    value: type_name.to_string(),
                })?;
            let sign = p.polarity.as_deref().ok_or(RecordError::MissingField {
                index,
                field: "polarity",
            })?;
            let polarity =
                Polarity::from_symbol(sign).ok_or_else(|| RecordError::UnknownPolarity {
                    id: id.clone(),
                    value: sign.to_string(),
                })?;
            if !seen.insert(id.clone()) {
                return Err(RecordError::DuplicateId(id));
            }
            mol.add_particle(Particle {
                id,
                particle_type,
                polarity,
                x: p.x.round_ties_even() as i32,
                y: p.y.round_ties_even() as i32,
            });
        }

        for (index, b) in bonds.iter().enumerate() {
            let (from, to) = match (&b.from, &b.to) {
                (Some(from), Some(to)) => (from, to),
                _ => return Err(RecordError::MissingEndpoint { index }),
            };
            let a = mol
                .find_particle(from)
                .ok_or_else(|| RecordError::UnknownParticle(from.clone()))?;
            let c = mol
                .find_particle(to)
                .ok_or_else(|| RecordError::UnknownParticle(to.clone()))?;
            let multiplicity = match b.multiplicity {
                Some(m) if (1..=i64::from(u8::MAX)).contains(&m) => m as u8,
                other => {
                    return Err(RecordError::InvalidMultiplicity {
                        from: from.clone(),
                        to: to.clone(),
                        value: other,
                    })
                }
            };
            mol.add_bond(a, c, Bond::new(multiplicity));
        }

        Ok(mol)
    }
}

impl TryFrom<MoleculeRecord> for Molecule {
    type Error = RecordError;

    fn try_from(record: MoleculeRecord) -> Result<Self, Self::Error> {
        Molecule::try_from(&record)
    }
}

impl From<&Molecule> for MoleculeRecord {
    fn from(mol: &Molecule) -> Self {
        let particles = mol
            .particles()
            .map(|idx| {
                let p = mol.particle(idx);
                ParticleRecord {
                    id: Some(p.id.clone()),
                    particle_type: Some(p.particle_type.name().to_string()),
                    polarity: Some(p.polarity.symbol().to_string()),
                    x: f64::from(p.x),
                    y: f64::from(p.y),
                }
            })
            .collect();
        let bonds = mol
            .bonds()
            .filter_map(|e| {
                let (a, b) = mol.bond_endpoints(e)?;
                Some(BondRecord {
                    from: Some(mol.particle(a).id.clone()),
                    to: Some(mol.particle(b).id.clone()),
                    multiplicity: Some(i64::from(mol.bond(e).multiplicity)),
                })
            })
            .collect();
        Self {
            particles: Some(particles),
            bonds: Some(bonds),
        }
    }
}

impl Serialize for Molecule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MoleculeRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Molecule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = MoleculeRecord::deserialize(deserializer)?;
        Molecule::try_from(&record).map_err(serde::de::Error::custom)
    }
}

/// Parse a molecule from its JSON record form.
pub fn molecule_from_json(json: &str) -> Result<Molecule, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const M3_2: &str = r#"{
        "particles": [
            {"id": "p0", "type": "square", "polarity": "-", "x": 0, "y": 0},
            {"id": "p1", "type": "triangle", "polarity": "+", "x": 1, "y": 0},
            {"id": "p2", "type": "circle", "polarity": "-", "x": 2, "y": 0}
        ],
        "bonds": [
            {"from": "p0", "to": "p1", "multiplicity": 2},
            {"from": "p1", "to": "p2", "multiplicity": 1}
        ]
    }"#;

    #[test]
    fn parse_seed_molecule() {
        let mol = molecule_from_json(M3_2).unwrap();
        assert_eq!(mol.particle_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        let p1 = mol.find_particle("p1").unwrap();
        assert_eq!(mol.particle(p1).particle_type, ParticleType::Triangle);
        assert_eq!(mol.particle(p1).polarity, Polarity::Positive);
        assert_eq!(mol.particle(p1).x, 1);
    }

    #[test]
    fn record_round_trip_keeps_shape() {
        let mol = molecule_from_json(M3_2).unwrap();
        let json = serde_json::to_value(&mol).unwrap();
        assert_eq!(json["particles"][0]["type"], "square");
        assert_eq!(json["particles"][0]["polarity"], "-");
        assert_eq!(json["bonds"][0]["multiplicity"], 2);
        let back: Molecule = serde_json::from_value(json).unwrap();
        assert_eq!(back, mol);
    }

    #[test]
    fn missing_keys_are_distinct() {
        let record: MoleculeRecord = serde_json::from_str(r#"{"particles": []}"#).unwrap();
        assert_eq!(
            Molecule::try_from(&record).unwrap_err(),
            RecordError::MissingBonds
        );
        let record: MoleculeRecord = serde_json::from_str(r#"{"bonds": []}"#).unwrap();
        assert_eq!(
            Molecule::try_from(&record).unwrap_err(),
            RecordError::MissingParticles
        );
    }

    #[test]
    fn unknown_type_rejected() {
        let record: MoleculeRecord = serde_json::from_str(
            r#"{"particles": [{"id": "a", "type": "hexagon", "polarity": "+"}], "bonds": []}"#,
        )
        .unwrap();
        assert!(matches!(
            Molecule::try_from(&record),
            Err(RecordError::UnknownType { .. })
        ));
    }

    #[test]
    fn dangling_bond_rejected() {
        let record: MoleculeRecord = serde_json::from_str(
            r#"{"particles": [{"id": "a", "type": "circle", "polarity": "+"}],
                "bonds": [{"from": "a", "to": "b", "multiplicity": 1}]}"#,
        )
        .unwrap();
        assert_eq!(
            Molecule::try_from(&record).unwrap_err(),
            RecordError::UnknownParticle("b".into())
        );
    }

    #[test]
    fn fractional_coordinates_round_half_even() {
        let record: MoleculeRecord = serde_json::from_str(
            r#"{"particles": [{"id": "a", "type": "circle", "polarity": "+", "x": 2.5, "y": -1.5}],
                "bonds": []}"#,
        )
        .unwrap();
        let mol = Molecule::try_from(&record).unwrap();
        let a = mol.find_particle("a").unwrap();
        assert_eq!((mol.particle(a).x, mol.particle(a).y), (2, -2));
    }
}
