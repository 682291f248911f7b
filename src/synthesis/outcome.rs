use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::mol::Molecule;

/// Why a synthesis produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No particle pair annihilated.
    NoReaction,
    /// Every particle of both inputs annihilated.
    CompleteAnnihilation,
    /// The merged survivors could not be stabilized.
    CannotRebond,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoReaction => "no_reaction",
            Self::CompleteAnnihilation => "complete_annihilation",
            Self::CannotRebond => "cannot_rebond",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Single(Molecule),
    /// The stabilized product fell apart into several molecules, in
    /// component discovery order.
    Multiple(Vec<Molecule>),
    None,
}

impl SynthesisOutcome {
    pub fn molecules(&self) -> &[Molecule] {
        match self {
            Self::Single(mol) => std::slice::from_ref(mol),
            Self::Multiple(mols) => mols,
            Self::None => &[],
        }
    }
}

impl Serialize for SynthesisOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(mol) => mol.serialize(serializer),
            Self::Multiple(mols) => mols.serialize(serializer),
            Self::None => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub initial_count: usize,
    pub annihilated_pairs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_particles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecules_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub success: bool,
    pub result: SynthesisOutcome,
    pub details: SynthesisDetails,
}

impl SynthesisResult {
    pub(crate) fn failure(reason: FailureReason, details: SynthesisDetails) -> Self {
        Self {
            success: false,
            result: SynthesisOutcome::None,
            details: SynthesisDetails {
                reason: Some(reason),
                ..details
            },
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self.result, SynthesisOutcome::Multiple(_))
    }

    pub fn reason(&self) -> Option<FailureReason> {
        self.details.reason
    }
}

/// `multiple` is only written for successful results.
impl Serialize for SynthesisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SynthesisResult", 4)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("result", &self.result)?;
        if self.success {
            state.serialize_field("multiple", &self.is_multiple())?;
        } else {
            state.skip_field("multiple")?;
        }
        state.serialize_field("details", &self.details)?;
        state.end()
    }
}
