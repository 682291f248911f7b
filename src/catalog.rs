//! Molecule lookup by id.
//!
//! The engine only needs one capability from the data layer: resolve an
//! id to a molecule. [`MoleculeSource`] is that seam. [`Catalog`] is the
//! in-memory implementation: a read-only seed table, searched first, over
//! per-save discovery records.

use std::collections::BTreeMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::fingerprint::Fnv1aHasher;
use crate::mol::Molecule;
use crate::properties::formula;
use crate::record::{MoleculeRecord, RecordError};
use crate::synthesis::{synthesize_with, SynthesisResult};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown molecule {0}")]
    UnknownMolecule(String),
    #[error("seed molecule {id} is malformed: {source}")]
    InvalidSeed {
        id: String,
        #[source]
        source: RecordError,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub trait MoleculeSource {
    fn find_molecule(&self, id: &str) -> Option<Molecule>;
}

impl<F> MoleculeSource for F
where
    F: Fn(&str) -> Option<Molecule>,
{
    fn find_molecule(&self, id: &str) -> Option<Molecule> {
        self(id)
    }
}

/// Seed table entry as stored on disk: id and display name next to the
/// usual molecule record fields.
#[derive(Debug, Clone, Deserialize)]
struct SeedRecord {
    id: String,
    name: String,
    #[serde(flatten)]
    record: MoleculeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub molecule: Molecule,
}

impl CatalogEntry {
    pub fn mass(&self) -> usize {
        self.molecule.particle_count()
    }
}

/// A molecule a player found through synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discovery {
    pub id: String,
    pub name: String,
    pub formula: String,
    pub molecule: Molecule,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    seed: Vec<CatalogEntry>,
    discoveries: BTreeMap<String, Vec<Discovery>>,
    next_seq: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a seed table keyed by mass:
    /// `{"3": [{"id": "m3_1", "name": "...", "particles": [...], "bonds": [...]}], ...}`.
    ///
    /// Entries are kept in ascending mass order, then file order.
    pub fn from_seed_json(json: &str) -> Result<Self, CatalogError> {
        let table: BTreeMap<String, Vec<SeedRecord>> = serde_json::from_str(json)?;
        let mut groups: Vec<(u64, Vec<SeedRecord>)> = table
            .into_iter()
            .map(|(mass, entries)| (mass.parse().unwrap_or(u64::MAX), entries))
            .collect();
        groups.sort_by_key(|(mass, _)| *mass);

        let mut catalog = Self::new();
        for seed in groups.into_iter().flat_map(|(_, entries)| entries) {
            let molecule = Molecule::try_from(&seed.record).map_err(|source| {
                CatalogError::InvalidSeed {
                    id: seed.id.clone(),
                    source,
                }
            })?;
            catalog.insert_seed(seed.id, seed.name, molecule);
        }
        Ok(catalog)
    }

    pub fn insert_seed(&mut self, id: impl Into<String>, name: impl Into<String>, molecule: Molecule) {
        self.seed.push(CatalogEntry {
            id: id.into(),
            name: name.into(),
            molecule,
        });
    }

    pub fn seed(&self) -> &[CatalogEntry] {
        &self.seed
    }

    pub fn seed_by_mass(&self, mass: usize) -> impl Iterator<Item = &CatalogEntry> + '_ {
        self.seed.iter().filter(move |e| e.mass() == mass)
    }

    /// Masses with at least one seed molecule, ascending.
    pub fn available_masses(&self) -> Vec<usize> {
        let mut masses: Vec<usize> = self.seed.iter().map(CatalogEntry::mass).collect();
        masses.sort_unstable();
        masses.dedup();
        masses
    }

    /// Record a discovery for `save_id` and return its id. Without a name
    /// the first free `Discovery #n` is used.
    pub fn add_discovery(&mut self, save_id: &str, molecule: Molecule, name: Option<String>) -> String {
        let id = self.fresh_discovery_id(save_id);
        let records = self.discoveries.entry(save_id.to_string()).or_default();
        let name = name.unwrap_or_else(|| {
            let n = (1..)
                .find(|n| {
                    let candidate = format!("Discovery #{n}");
                    records.iter().all(|d| d.name != candidate)
                })
                .unwrap_or(1);
            format!("Discovery #{n}")
        });
        debug!(save_id, %id, %name, "discovery recorded");
        records.push(Discovery {
            id: id.clone(),
            name,
            formula: formula(&molecule),
            molecule,
        });
        id
    }

    fn fresh_discovery_id(&mut self, save_id: &str) -> String {
        loop {
            let mut h = Fnv1aHasher::new();
            h.write(save_id.as_bytes());
            h.write(&self.next_seq.to_le_bytes());
            self.next_seq += 1;
            let id = format!("disc_{:08x}", h.finish() as u32);
            if self.find_discovery(&id).is_none() {
                return id;
            }
        }
    }

    pub fn discoveries(&self, save_id: &str) -> &[Discovery] {
        self.discoveries.get(save_id).map_or(&[], Vec::as_slice)
    }

    pub fn discovery(&self, save_id: &str, id: &str) -> Option<&Discovery> {
        self.discoveries(save_id).iter().find(|d| d.id == id)
    }

    /// Search every save.
    pub fn find_discovery(&self, id: &str) -> Option<&Discovery> {
        self.discoveries.values().flatten().find(|d| d.id == id)
    }

    pub fn delete_discovery(&mut self, save_id: &str, id: &str) -> bool {
        let Some(records) = self.discoveries.get_mut(save_id) else {
            return false;
        };
        let before = records.len();
        records.retain(|d| d.id != id);
        records.len() != before
    }

    pub fn clear_discoveries(&mut self, save_id: &str) {
        self.discoveries.remove(save_id);
    }
}

impl MoleculeSource for Catalog {
    fn find_molecule(&self, id: &str) -> Option<Molecule> {
        self.seed
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.molecule.clone())
            .or_else(|| self.find_discovery(id).map(|d| d.molecule.clone()))
    }
}

/// Key under which a synthesis result is cached for a save:
/// `"{save}:{a}+{b}"`. Argument order is kept.
pub fn synthesis_cache_key(save_id: &str, a_id: &str, b_id: &str) -> String {
    format!("{save_id}:{a_id}+{b_id}")
}

pub fn synthesize_by_id<S: MoleculeSource>(
    source: &S,
    a_id: &str,
    b_id: &str,
) -> Result<SynthesisResult, CatalogError> {
    synthesize_by_id_with(source, a_id, b_id, &EngineConfig::default())
}

pub fn synthesize_by_id_with<S: MoleculeSource>(
    source: &S,
    a_id: &str,
    b_id: &str,
    config: &EngineConfig,
) -> Result<SynthesisResult, CatalogError> {
    let a = source
        .find_molecule(a_id)
        .ok_or_else(|| CatalogError::UnknownMolecule(a_id.to_string()))?;
    let b = source
        .find_molecule(b_id)
        .ok_or_else(|| CatalogError::UnknownMolecule(b_id.to_string()))?;
    Ok(synthesize_with(&a, &b, config))
}
