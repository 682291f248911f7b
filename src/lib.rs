pub mod bond;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod fingerprint;
pub mod generator;
pub mod graph_ops;
pub mod layout;
pub mod mol;
pub mod notation;
pub mod particle;
pub mod properties;
pub mod rebond;
pub mod record;
pub mod structure;
pub mod synthesis;
pub mod traits;
pub mod validate;
pub mod valence;

pub use bond::Bond;
pub use catalog::{
    synthesis_cache_key, synthesize_by_id, synthesize_by_id_with, Catalog, CatalogEntry,
    CatalogError, Discovery, MoleculeSource,
};
pub use config::{ConfigError, EngineConfig, GeneratorConfig, LayoutConfig, RebondConfig};
pub use effects::{
    all_possible_requirements, assign_requirements, bond_patterns, has_all_requirements,
    has_requirement, matching_effects, BondRequirement,
};
pub use fingerprint::{are_identical, fingerprint, fingerprint_hash};
pub use generator::{
    generate, generate_with, particle_type_from_code, GeneratedMolecule, GenerationDetails,
    GenerationError, GenerationResult,
};
pub use layout::{layout, layout_with};
pub use mol::{Mol, Molecule};
pub use notation::{from_notation, to_notation, NotationError};
pub use particle::{Particle, ParticleType, Polarity};
pub use properties::{formula, properties, ChargeLabel, MoleculeProperties};
pub use rebond::{rebond, rebond_with, RebondError};
pub use record::{molecule_from_json, BondRecord, MoleculeRecord, ParticleRecord, RecordError};
pub use structure::{analyze_structure, analyze_structure_with, StructuralInfo, Topology, TopologyRule};
pub use synthesis::{
    synthesize, synthesize_with, FailureReason, SynthesisDetails, SynthesisOutcome,
    SynthesisResult,
};
pub use traits::{HasId, HasMultiplicity, HasParticleType, HasPolarity, HasPosition2D};
pub use validate::{is_valid, validate, validate_molecule, ValidationError};
pub use valence::{is_stable, unstable_particles};
