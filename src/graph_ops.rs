use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Neighbor lists indexed by node, built from the bond list in insertion
/// order, both directions per bond. Multiplicity is ignored.
///
/// Unlike [`Mol::neighbors`], whose order follows petgraph's internal edge
/// lists, the order here is the bond declaration order, which the cycle
/// search and the layout depend on.
pub fn adjacency<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let mut adj = vec![Vec::new(); mol.particle_count()];
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            adj[a.index()].push(b);
            adj[b.index()].push(a);
        }
    }
    adj
}

pub fn degrees<A, B>(mol: &Mol<A, B>) -> Vec<usize> {
    adjacency(mol).iter().map(Vec::len).collect()
}

/// Connected components by repeated BFS, seeded from the first unvisited
/// particle in declaration order.
///
/// Components are returned in discovery order; inside a component the
/// particles are in BFS order.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let adj = adjacency(mol);
    let mut visited = vec![false; adj.len()];
    let mut components = Vec::new();
    for start in mol.particles() {
        if !visited[start.index()] {
            components.push(bfs_component(&adj, start, &mut visited));
        }
    }
    components
}

/// Particles reachable from `start` in BFS order, marking each in `visited`.
pub(crate) fn bfs_component(
    adj: &[Vec<NodeIndex>],
    start: NodeIndex,
    visited: &mut [bool],
) -> Vec<NodeIndex> {
    visited[start.index()] = true;
    let mut component = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for &neighbor in &adj[current.index()] {
            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                component.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }
    component
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// `false` for an empty molecule, `true` for a single particle, otherwise
/// whether every particle is reachable from the first.
pub fn is_fully_connected<A, B>(mol: &Mol<A, B>) -> bool {
    match mol.particle_count() {
        0 => false,
        1 => true,
        _ => num_components(mol) == 1,
    }
}

/// Find one cycle by depth-first search.
///
/// Roots are tried in node order and neighbors in adjacency order. The
/// first back edge to an already visited node other than the current
/// node's parent closes the cycle; its members are returned from the
/// back-edge target down the tree path to the current node. Only that
/// first cycle is reported, which is not necessarily the shortest.
pub fn detect_cycle(adj: &[Vec<NodeIndex>]) -> Option<Vec<NodeIndex>> {
    let n = adj.len();
    if n < 3 {
        return None;
    }
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
    // (node, position of the next neighbor to examine)
    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();

    for root in (0..n).map(NodeIndex::new) {
        if visited[root.index()] {
            continue;
        }
        visited[root.index()] = true;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (node, pos) = *top;
            let Some(&neighbor) = adj[node.index()].get(pos) else {
                stack.pop();
                continue;
            };
            top.1 += 1;

            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                parent[neighbor.index()] = Some(node);
                stack.push((neighbor, 0));
            } else if parent[node.index()] != Some(neighbor) {
                return Some(reconstruct_cycle(&parent, neighbor, node));
            }
        }
    }
    None
}

fn reconstruct_cycle(
    parent: &[Option<NodeIndex>],
    target: NodeIndex,
    node: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![node];
    let mut current = node;
    while let Some(p) = parent[current.index()] {
        if p == target {
            break;
        }
        path.push(p);
        current = p;
    }
    path.push(target);
    path.reverse();
    path
}

/// Split a molecule into one molecule per component.
///
/// Particles keep their relative declaration order and bonds their
/// relative insertion order; a bond goes to the component holding both of
/// its endpoints.
pub fn split_components<A: Clone, B: Clone>(
    mol: &Mol<A, B>,
    components: &[Vec<NodeIndex>],
) -> Vec<Mol<A, B>> {
    let mut owner = vec![usize::MAX; mol.particle_count()];
    for (ci, component) in components.iter().enumerate() {
        for &idx in component {
            owner[idx.index()] = ci;
        }
    }

    let mut fragments: Vec<Mol<A, B>> = components.iter().map(|_| Mol::new()).collect();
    let mut index_map = vec![NodeIndex::end(); mol.particle_count()];
    for idx in mol.particles() {
        let ci = owner[idx.index()];
        if let Some(frag) = fragments.get_mut(ci) {
            index_map[idx.index()] = frag.add_particle(mol.particle(idx).clone());
        }
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let ci = owner[a.index()];
        if ci != owner[b.index()] {
            continue;
        }
        if let Some(frag) = fragments.get_mut(ci) {
            frag.add_bond(
                index_map[a.index()],
                index_map[b.index()],
                mol.bond(edge).clone(),
            );
        }
    }
    fragments
}

/// Copy of `mol` without the particles whose `keep` flag is false, and
/// without any bond touching them. Relative order is preserved.
pub fn retain_particles<A: Clone, B: Clone>(mol: &Mol<A, B>, keep: &[bool]) -> Mol<A, B> {
    let mut out = Mol::new();
    let mut index_map = vec![None; mol.particle_count()];
    for idx in mol.particles() {
        if keep.get(idx.index()).copied().unwrap_or(false) {
            index_map[idx.index()] = Some(out.add_particle(mol.particle(idx).clone()));
        }
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(na), Some(nb)) = (index_map[a.index()], index_map[b.index()]) {
            out.add_bond(na, nb, mol.bond(edge).clone());
        }
    }
    out
}

/// Split a molecule into its connected fragments.
pub fn get_fragments<A: Clone, B: Clone>(mol: &Mol<A, B>) -> Vec<Mol<A, B>> {
    split_components(mol, &connected_components(mol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_notation;

    #[test]
    fn bfs_component_stops_at_visited() {
        let mol = from_notation("C+ Q- C+ T- C+; 0-1 1-2 3-4").unwrap();
        let adj = adjacency(&mol);
        let mut visited = vec![false; adj.len()];
        let first = bfs_component(&adj, NodeIndex::new(2), &mut visited);
        let order: Vec<usize> = first.iter().map(|n| n.index()).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(visited, vec![true, true, true, false, false]);
        assert_eq!(bfs_component(&adj, NodeIndex::new(4), &mut visited).len(), 2);
    }

    #[test]
    fn adjacency_follows_bond_order() {
        let mol = from_notation("T+ C- Q- C-; 0-3 0-1 0-2").unwrap();
        let adj = adjacency(&mol);
        let order: Vec<usize> = adj[0].iter().map(|n| n.index()).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(degrees(&mol), vec![3, 1, 1, 1]);
    }

    #[test]
    fn components_in_discovery_order() {
        let mol = from_notation("C+ Q- C+ C- Q+; 3-4 0-1 1-2").unwrap();
        let comps = connected_components(&mol);
        assert_eq!(comps.len(), 2);
        let first: Vec<usize> = comps[0].iter().map(|n| n.index()).collect();
        let second: Vec<usize> = comps[1].iter().map(|n| n.index()).collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(second, vec![3, 4]);
    }

    #[test]
    fn connectivity_edge_cases() {
        assert!(!is_fully_connected(&from_notation("").unwrap()));
        assert!(is_fully_connected(&from_notation("C+").unwrap()));
        assert!(!is_fully_connected(&from_notation("C+ C-").unwrap()));
        assert!(is_fully_connected(&from_notation("C+ Q-; 0-1").unwrap()));
    }

    #[test]
    fn no_cycle_in_tree() {
        let mol = from_notation("T+ C- C- C-; 0-1 0-2 0-3").unwrap();
        assert!(detect_cycle(&adjacency(&mol)).is_none());
    }

    #[test]
    fn too_small_for_cycle() {
        let mol = from_notation("C+ Q-; 0-1").unwrap();
        assert!(detect_cycle(&adjacency(&mol)).is_none());
    }

    #[test]
    fn square_ring_found() {
        let mol = from_notation("P+ T- Q+ T-; 0-1:2 0-3:2 2-1 2-3").unwrap();
        let cycle = detect_cycle(&adjacency(&mol)).unwrap();
        let members: Vec<usize> = cycle.iter().map(|n| n.index()).collect();
        // DFS 0 -> 1 -> 2 -> 3, back edge 3 -> 0
        assert_eq!(members, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cycle_with_tail_reports_ring_only() {
        // tail 0-1, ring 1-2-3
        let mol = from_notation("C+ P- T+ Q+; 0-1 1-2 2-3 3-1").unwrap();
        let cycle = detect_cycle(&adjacency(&mol)).unwrap();
        let members: Vec<usize> = cycle.iter().map(|n| n.index()).collect();
        assert_eq!(members, vec![1, 2, 3]);
    }

    #[test]
    fn cycle_in_second_component() {
        let mol = from_notation("C+ Q- T+ Q- P-; 0-1 2-3 3-4 4-2").unwrap();
        let cycle = detect_cycle(&adjacency(&mol)).unwrap();
        assert_eq!(cycle.len(), 3);
        assert!(cycle.iter().all(|n| n.index() >= 2));
    }

    #[test]
    fn retain_drops_touching_bonds() {
        let mol = from_notation("C+ Q- C+ T-; 0-1 1-2 2-3").unwrap();
        let kept = retain_particles(&mol, &[true, false, true, true]);
        assert_eq!(kept.particle_count(), 3);
        assert_eq!(kept.bond_count(), 1);
        let ids: Vec<&str> = kept.particles().map(|i| kept.particle(i).id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p2", "p3"]);
    }

    #[test]
    fn split_partitions_particles_and_bonds() {
        let mol = from_notation("C+ Q- C+ C- Q+; 0-1 3-4 1-2").unwrap();
        let frags = get_fragments(&mol);
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].particle_count(), 3);
        assert_eq!(frags[0].bond_count(), 2);
        assert_eq!(frags[1].particle_count(), 2);
        assert_eq!(frags[1].bond_count(), 1);
        let ids: Vec<&str> = frags[1]
            .particles()
            .map(|i| frags[1].particle(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["p3", "p4"]);
    }
}
