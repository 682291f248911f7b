//! Two-molecule synthesis.
//!
//! A synthesis runs a fixed pipeline on working copies of its inputs:
//!
//! 1. **Annihilation**: matching particles (same shape, opposite polarity)
//!    across the two inputs cancel pairwise.
//! 2. **Merge**: the survivors are pooled, sorted and renumbered.
//! 3. **Rebond**: the pooled molecule is repaired to stability.
//! 4. **Split**: a disconnected product is split into its components.
//! 5. **Layout**: every product gets fresh display coordinates.
//!
//! The inputs are first put in a canonical order (fingerprint, then
//! compact notation), so `synthesize(a, b)` and `synthesize(b, a)` give
//! the same result.
//!
//! The outcome is a [`SynthesisResult`], never an error: the three ways a
//! synthesis can yield nothing are reported as a [`FailureReason`].
//!
//! ```
//! use molsynth::{from_notation, synthesize, FailureReason};
//!
//! let a = from_notation("C+ Q-; 0-1").unwrap();
//! let b = from_notation("C- T+; 0-1").unwrap();
//! let result = synthesize(&a, &b);
//! assert!(!result.success);
//! assert_eq!(result.reason(), Some(FailureReason::CannotRebond));
//! ```

mod outcome;
mod stages;

pub use outcome::{FailureReason, SynthesisDetails, SynthesisOutcome, SynthesisResult};
pub use stages::{annihilate, merge, Annihilation};

use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::fingerprint::fingerprint;
use crate::graph_ops::{connected_components, split_components};
use crate::layout::layout_with;
use crate::mol::Molecule;
use crate::notation::to_notation;
use crate::rebond::rebond_with;

/// Inputs are reordered by fingerprint and notation first, so the result is
/// independent of argument order even where the merge sort ties.
pub fn synthesize(a: &Molecule, b: &Molecule) -> SynthesisResult {
    synthesize_with(a, b, &EngineConfig::default())
}

#[instrument(skip_all)]
pub fn synthesize_with(a: &Molecule, b: &Molecule, config: &EngineConfig) -> SynthesisResult {
    let mut details = SynthesisDetails {
        initial_count: a.particle_count() + b.particle_count(),
        ..SynthesisDetails::default()
    };

    let (a, b) = reaction_order(a, b);
    let survivors = annihilate(a, b);
    details.annihilated_pairs = survivors.pairs;
    debug!(pairs = survivors.pairs, "annihilation done");
    if survivors.pairs == 0 {
        return SynthesisResult::failure(FailureReason::NoReaction, details);
    }
    if survivors.a.is_empty() && survivors.b.is_empty() {
        return SynthesisResult::failure(FailureReason::CompleteAnnihilation, details);
    }

    let merged = merge(&survivors.a, &survivors.b);
    details.remaining_particles = Some(merged.particle_count());

    let stable = match rebond_with(&merged, &config.rebond) {
        Ok(mol) => mol,
        Err(e) => {
            debug!(error = %e, "rebond failed");
            return SynthesisResult::failure(FailureReason::CannotRebond, details);
        }
    };

    let components = connected_components(&stable);
    if components.len() > 1 {
        let mut products = split_components(&stable, &components);
        for product in &mut products {
            layout_with(product, &config.layout);
        }
        details.molecules_count = Some(products.len());
        debug!(count = products.len(), "synthesis produced several molecules");
        return SynthesisResult {
            success: true,
            result: SynthesisOutcome::Multiple(products),
            details,
        };
    }

    let mut product = stable;
    layout_with(&mut product, &config.layout);
    debug!(particles = product.particle_count(), "synthesis produced one molecule");
    SynthesisResult {
        success: true,
        result: SynthesisOutcome::Single(product),
        details,
    }
}

fn reaction_order<'a>(a: &'a Molecule, b: &'a Molecule) -> (&'a Molecule, &'a Molecule) {
    let key = |m: &Molecule| (fingerprint(m), to_notation(m));
    if key(b) < key(a) {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_ops::is_fully_connected;
    use crate::notation::from_notation;
    use crate::valence::is_stable;

    fn mol(s: &str) -> Molecule {
        from_notation(s).unwrap_or_else(|e| panic!("bad notation {s:?}: {e}"))
    }

    #[test]
    fn no_reaction_without_pairs() {
        let result = synthesize(&mol("C+ Q-; 0-1"), &mol("C+ T-"));
        assert!(!result.success);
        assert_eq!(result.reason(), Some(FailureReason::NoReaction));
        assert_eq!(result.details.initial_count, 4);
        assert_eq!(result.details.annihilated_pairs, 0);
        assert_eq!(result.details.remaining_particles, None);
        assert_eq!(result.result, SynthesisOutcome::None);
    }

    #[test]
    fn complete_annihilation() {
        let result = synthesize(&mol("C+ Q-; 0-1"), &mol("Q+ C-; 0-1"));
        assert_eq!(result.reason(), Some(FailureReason::CompleteAnnihilation));
        assert_eq!(result.details.annihilated_pairs, 2);
    }

    #[test]
    fn square_and_triangle_cannot_rebond() {
        let result = synthesize(&mol("C+ Q-; 0-1"), &mol("C- T+; 0-1"));
        assert_eq!(result.reason(), Some(FailureReason::CannotRebond));
        assert_eq!(result.details.initial_count, 4);
        assert_eq!(result.details.annihilated_pairs, 1);
        assert_eq!(result.details.remaining_particles, Some(2));
    }

    #[test]
    fn single_product_is_stable_and_connected() {
        let a = mol("C+ Q- C+; 0-1 1-2");
        let b = mol("Q- T+ C-; 0-1:2 1-2");
        let result = synthesize(&a, &b);
        assert!(result.success);
        assert!(!result.is_multiple());
        assert_eq!(result.details.remaining_particles, Some(4));
        let SynthesisOutcome::Single(product) = &result.result else {
            panic!("expected a single product, got {:?}", result.result);
        };
        assert!(is_stable(product));
        assert!(is_fully_connected(product));
        assert_eq!(product.bond_count(), 3);
    }

    #[test]
    fn commutative_on_chain_fixture() {
        let a = mol("C+ Q- C+; 0-1 1-2");
        let b = mol("Q- T+ C-; 0-1:2 1-2");
        let ab = synthesize(&a, &b);
        let ba = synthesize(&b, &a);
        let fa: Vec<String> = ab.result.molecules().iter().map(fingerprint).collect();
        let fb: Vec<String> = ba.result.molecules().iter().map(fingerprint).collect();
        assert_eq!(fa, fb);
        assert_eq!(ab, ba);
    }

    #[test]
    fn argument_order_does_not_matter_for_split() {
        let a = mol("C+ Q- C+ T-; 0-1 1-2");
        let b = mol("T+ C+ Q- C+; 1-2 2-3");
        assert_eq!(synthesize(&a, &b), synthesize(&b, &a));
    }

    #[test]
    fn reaction_order_is_canonical() {
        let a = mol("C+ Q-; 0-1");
        let b = mol("C- T+; 0-1");
        let (first, _) = reaction_order(&b, &a);
        assert_eq!(first, &a);
        // same fingerprint, different declaration order
        let c = mol("Q- C+; 0-1");
        let (x, y) = reaction_order(&c, &a);
        assert_eq!((x, y), (&a, &c));
        let (x, y) = reaction_order(&a, &c);
        assert_eq!((x, y), (&a, &c));
    }

    #[test]
    fn disconnected_product_is_split() {
        let a = mol("C+ Q- C+ T-; 0-1 1-2");
        let b = mol("T+ C+ Q- C+; 1-2 2-3");
        let result = synthesize(&a, &b);
        assert!(result.success);
        assert!(result.is_multiple());
        assert_eq!(result.details.molecules_count, Some(2));
        assert_eq!(result.details.remaining_particles, Some(6));
        assert_eq!(result.details.initial_count, 8);

        let products = result.result.molecules();
        let ids: Vec<Vec<&str>> = products
            .iter()
            .map(|m| m.particles().map(|i| m.particle(i).id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["p0", "p1", "p4"], vec!["p2", "p3", "p5"]]);
        assert!(products.iter().all(is_stable));
    }

    #[test]
    fn inputs_are_untouched() {
        let a = mol("C+ Q-; 0-1");
        let b = mol("C- T+; 0-1");
        let (a0, b0) = (a.clone(), b.clone());
        let _ = synthesize(&a, &b);
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let failure = synthesize(&mol("C+ Q-; 0-1"), &mol("C- T+; 0-1"));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["result"].is_null());
        assert!(json.get("multiple").is_none());
        assert_eq!(json["details"]["reason"], "cannot_rebond");
        assert_eq!(json["details"]["remaining_particles"], 2);

        let ok = synthesize(&mol("C+ Q- C+; 0-1 1-2"), &mol("Q- T+ C-; 0-1:2 1-2"));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["multiple"], false);
        assert_eq!(json["result"]["particles"].as_array().unwrap().len(), 4);
        assert!(json["details"].get("reason").is_none());
    }
}
