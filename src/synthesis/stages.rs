use petgraph::graph::NodeIndex;

use crate::graph_ops::retain_particles;
use crate::mol::Molecule;
use crate::particle::Particle;

/// Survivors of the annihilation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Annihilation {
    pub a: Molecule,
    pub b: Molecule,
    pub pairs: usize,
}

/// Remove matching particle pairs across `a` and `b`.
///
/// Each particle of `a`, in declaration order, consumes the first
/// not-yet-consumed particle of `b` with the same shape and the opposite
/// polarity. Bonds touching a removed particle go with it.
pub fn annihilate(a: &Molecule, b: &Molecule) -> Annihilation {
    let mut keep_a = vec![true; a.particle_count()];
    let mut keep_b = vec![true; b.particle_count()];
    let mut pairs = 0;

    for ia in a.particles() {
        let pa = a.particle(ia);
        let partner = b.particles().find(|ib| {
            let pb = b.particle(*ib);
            keep_b[ib.index()]
                && pb.particle_type == pa.particle_type
                && pb.polarity != pa.polarity
        });
        if let Some(ib) = partner {
            keep_a[ia.index()] = false;
            keep_b[ib.index()] = false;
            pairs += 1;
        }
    }

    Annihilation {
        a: retain_particles(a, &keep_a),
        b: retain_particles(b, &keep_b),
        pairs,
    }
}

/// Pool the survivors into one molecule with fresh ids.
///
/// Particles of `a` come before those of `b`, then the pool is stably
/// sorted by shape priority and polarity and renumbered `p0, p1, …`.
/// Coordinates are carried over unchanged. Bonds keep their endpoints
/// through the renumbering, `a`'s bonds first.
pub fn merge(a: &Molecule, b: &Molecule) -> Molecule {
    // (origin, node) pairs; origin 0 is `a`, 1 is `b`
    let mut pool: Vec<(usize, NodeIndex)> = a
        .particles()
        .map(|idx| (0, idx))
        .chain(b.particles().map(|idx| (1, idx)))
        .collect();
    let sources = [a, b];
    pool.sort_by_key(|&(origin, idx)| {
        let p = sources[origin].particle(idx);
        (p.particle_type.priority(), p.polarity)
    });

    let mut merged = Molecule::new();
    let mut index_map = [
        vec![NodeIndex::end(); a.particle_count()],
        vec![NodeIndex::end(); b.particle_count()],
    ];
    for (new_index, &(origin, idx)) in pool.iter().enumerate() {
        let old = sources[origin].particle(idx);
        let particle = Particle {
            id: format!("p{new_index}"),
            ..old.clone()
        };
        index_map[origin][idx.index()] = merged.add_particle(particle);
    }

    for (origin, source) in sources.iter().enumerate() {
        for edge in source.bonds() {
            if let Some((x, y)) = source.bond_endpoints(edge) {
                merged.add_bond(
                    index_map[origin][x.index()],
                    index_map[origin][y.index()],
                    *source.bond(edge),
                );
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::{from_notation, to_notation};

    #[test]
    fn first_match_wins() {
        // both circles of `a` are positive; the first pairs with b's first
        // negative circle, the second with the next
        let a = from_notation("C+ Q- C+; 0-1 1-2").unwrap();
        let b = from_notation("C- T+ C-; 0-1 1-2").unwrap();
        let out = annihilate(&a, &b);
        assert_eq!(out.pairs, 2);
        assert_eq!(to_notation(&out.a), "Q-");
        assert_eq!(to_notation(&out.b), "T+");
    }

    #[test]
    fn same_polarity_does_not_annihilate() {
        let a = from_notation("C+ Q-; 0-1").unwrap();
        let b = from_notation("C+ T-").unwrap();
        let out = annihilate(&a, &b);
        assert_eq!(out.pairs, 0);
        assert_eq!(out.a, a);
        assert_eq!(out.b, b);
    }

    #[test]
    fn each_partner_used_once() {
        let a = from_notation("Q+ Q+").unwrap();
        let b = from_notation("Q-").unwrap();
        let out = annihilate(&a, &b);
        assert_eq!(out.pairs, 1);
        assert_eq!(out.a.particle_count(), 1);
        assert!(out.b.is_empty());
        // the survivor is the second square, keeping its old id
        assert_eq!(out.a.particle(NodeIndex::new(0)).id, "p1");
    }

    #[test]
    fn merge_sorts_and_renumbers() {
        let a = from_notation("T+ C-; 0-1").unwrap();
        let b = from_notation("Q- C+; 0-1").unwrap();
        let merged = merge(&a, &b);
        // C+ (b) < C- (a) < Q- (b) < T+ (a)
        assert_eq!(to_notation(&merged), "C+ C- Q- T+; 3-1 2-0");
        let ids: Vec<&str> = merged
            .particles()
            .map(|i| merged.particle(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3"]);
    }

    #[test]
    fn merge_keeps_coordinates() {
        let mut a = from_notation("T+").unwrap();
        a.particle_mut(NodeIndex::new(0)).x = 7;
        let b = from_notation("C-").unwrap();
        let merged = merge(&a, &b);
        assert_eq!(merged.particle(NodeIndex::new(1)).x, 7);
    }
}
