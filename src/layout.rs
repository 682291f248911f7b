//! Integer 2D display coordinates.
//!
//! Coordinates are cosmetic: nothing in the engine reads them back for
//! chemistry. They are still deterministic, since cached results and
//! generated catalogs store them, so every step rounds half-to-even and
//! visits particles in declaration order.
//!
//! Two strategies, chosen by whether the molecule contains a cycle:
//!
//! - **Polygon**: the first detected cycle is drawn as a regular polygon
//!   starting at the top. A particle bonded to exactly one cycle member
//!   sits radially outside it; one bonded to several sits at their
//!   centroid. Everything else is grown outward by breadth-first search.
//! - **Tree**: breadth-first from the best-connected particle over a ring
//!   of eight directions, then recentred on the origin.
//!
//! Both end with a few damped relaxation passes pulling hubs (degree three
//! or more) toward the centre of their neighbors.

use std::collections::{HashSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, TAU};

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::config::LayoutConfig;
use crate::graph_ops::{adjacency, detect_cycle};
use crate::mol::Mol;
use crate::traits::{HasParticleType, HasPosition2D};

type Point = [i32; 2];

pub fn layout<A, B>(mol: &mut Mol<A, B>)
where
    A: HasParticleType + HasPosition2D,
{
    layout_with(mol, &LayoutConfig::default());
}

pub fn layout_with<A, B>(mol: &mut Mol<A, B>, config: &LayoutConfig)
where
    A: HasParticleType + HasPosition2D,
{
    if mol.is_empty() {
        return;
    }
    let adj = adjacency(mol);
    let mut positions = match detect_cycle(&adj) {
        Some(cycle) => {
            trace!(size = cycle.len(), "polygon layout");
            polygon_layout(&adj, &cycle, config)
        }
        None => {
            trace!("tree layout");
            let priorities: Vec<u8> = mol
                .particles()
                .map(|idx| mol.particle(idx).particle_type().priority())
                .collect();
            tree_layout(&adj, &priorities, config)
        }
    };
    relax(&mut positions, &adj, config);

    let nodes: Vec<NodeIndex> = mol.particles().collect();
    for idx in nodes {
        mol.particle_mut(idx).set_position_2d(positions[idx.index()]);
    }
}

fn round(v: f64) -> i32 {
    v.round_ties_even() as i32
}

fn directions(spacing: i32) -> [Point; 8] {
    let s = spacing;
    [
        [s, 0],
        [-s, 0],
        [0, s],
        [0, -s],
        [s, s],
        [s, -s],
        [-s, s],
        [-s, -s],
    ]
}

/// Placement state for the children of one parent.
struct ChildPlacer<'a> {
    config: &'a LayoutConfig,
    dirs: [Point; 8],
    dir_idx: usize,
    angle_offset: i32,
    /// Number of children being placed; widens the circular fallback.
    siblings: usize,
}

impl<'a> ChildPlacer<'a> {
    fn new(config: &'a LayoutConfig, siblings: usize) -> Self {
        Self {
            config,
            dirs: directions(config.spacing),
            dir_idx: 0,
            angle_offset: 0,
            siblings,
        }
    }

    /// First free spot around `parent`: the eight directions in order,
    /// then a widening circle. After `max_attempts` misses the child is
    /// put at a shifted direction even if taken.
    fn place(&mut self, parent: Point, occupied: &HashSet<Point>) -> Point {
        let mut attempts = 0;
        let spot = loop {
            if attempts >= self.config.max_attempts {
                let [dx, dy] = self.dirs[self.dir_idx % self.dirs.len()];
                let shift = attempts as i32;
                break [parent[0] + dx + shift, parent[1] + dy + shift];
            }
            let [dx, dy] = match self.dirs.get(self.dir_idx) {
                Some(&d) => d,
                None => {
                    let slots = self.siblings.max(8) as f64;
                    let angle = f64::from(self.angle_offset) * (TAU / slots);
                    let radius = f64::from(2 + (self.angle_offset / 8) * 2);
                    self.angle_offset += 1;
                    [round(radius * angle.cos()), round(radius * angle.sin())]
                }
            };
            let candidate = [parent[0] + dx, parent[1] + dy];
            if !occupied.contains(&candidate) {
                break candidate;
            }
            self.dir_idx += 1;
            attempts += 1;
        };
        self.dir_idx += 1;
        spot
    }
}

fn polygon_layout(adj: &[Vec<NodeIndex>], cycle: &[NodeIndex], config: &LayoutConfig) -> Vec<Point> {
    let n = adj.len();
    let radius = config.cycle_radius;
    let mut positions = vec![[0, 0]; n];
    let mut placed = vec![false; n];
    let mut in_cycle = vec![false; n];

    let step = TAU / cycle.len() as f64;
    for (i, node) in cycle.iter().enumerate() {
        let angle = i as f64 * step - FRAC_PI_2;
        positions[node.index()] = [round(radius * angle.cos()), round(radius * angle.sin())];
        placed[node.index()] = true;
        in_cycle[node.index()] = true;
    }

    for node in 0..n {
        if in_cycle[node] {
            continue;
        }
        let anchors: Vec<Point> = adj[node]
            .iter()
            .filter(|nb| in_cycle[nb.index()])
            .map(|nb| positions[nb.index()])
            .collect();
        match anchors.as_slice() {
            [] => continue,
            [[ax, ay]] => {
                let outward = f64::from(*ay).atan2(f64::from(*ax));
                let reach = radius * 1.2;
                positions[node] = [
                    round(f64::from(*ax) + reach * outward.cos()),
                    round(f64::from(*ay) + reach * outward.sin()),
                ];
            }
            _ => {
                let k = anchors.len() as f64;
                let cx = anchors.iter().map(|p| f64::from(p[0])).sum::<f64>() / k;
                let cy = anchors.iter().map(|p| f64::from(p[1])).sum::<f64>() / k;
                positions[node] = [round(cx), round(cy)];
            }
        }
        placed[node] = true;
    }

    grow_from_placed(adj, &mut positions, &mut placed, config);
    positions
}

/// Breadth-first placement of everything reachable from the already
/// placed particles. Unreachable particles stay at the origin.
fn grow_from_placed(
    adj: &[Vec<NodeIndex>],
    positions: &mut [Point],
    placed: &mut [bool],
    config: &LayoutConfig,
) {
    let mut occupied: HashSet<Point> = (0..adj.len())
        .filter(|&i| placed[i])
        .map(|i| positions[i])
        .collect();
    let mut queue: VecDeque<usize> = (0..adj.len()).filter(|&i| placed[i]).collect();

    while let Some(node) = queue.pop_front() {
        let children: Vec<usize> = adj[node]
            .iter()
            .map(|nb| nb.index())
            .filter(|&nb| !placed[nb])
            .collect();
        let mut placer = ChildPlacer::new(config, children.len());
        for child in children {
            let spot = placer.place(positions[node], &occupied);
            positions[child] = spot;
            placed[child] = true;
            occupied.insert(spot);
            queue.push_back(child);
        }
    }
}

fn tree_layout(adj: &[Vec<NodeIndex>], priorities: &[u8], config: &LayoutConfig) -> Vec<Point> {
    let n = adj.len();
    let mut positions = vec![[0, 0]; n];

    // first particle with the highest (degree, shape priority)
    let mut start = 0;
    for node in 1..n {
        if (adj[node].len(), priorities[node]) > (adj[start].len(), priorities[start]) {
            start = node;
        }
    }

    let mut visited = vec![false; n];
    visited[start] = true;
    // a spot counts as taken once its particle is dequeued
    let mut occupied: HashSet<Point> = HashSet::new();
    let mut queue: VecDeque<(usize, Point)> = VecDeque::from([(start, [0, 0])]);

    while let Some((node, spot)) = queue.pop_front() {
        positions[node] = spot;
        occupied.insert(spot);

        let children: Vec<usize> = adj[node]
            .iter()
            .map(|nb| nb.index())
            .filter(|&nb| !visited[nb])
            .collect();
        let mut placer = ChildPlacer::new(config, children.len());
        for child in children {
            visited[child] = true;
            let child_spot = placer.place(spot, &occupied);
            queue.push_back((child, child_spot));
        }
    }

    let count = n as f64;
    let avg_x = positions.iter().map(|p| f64::from(p[0])).sum::<f64>() / count;
    let avg_y = positions.iter().map(|p| f64::from(p[1])).sum::<f64>() / count;
    for p in &mut positions {
        *p = [round(f64::from(p[0]) - avg_x), round(f64::from(p[1]) - avg_y)];
    }
    positions
}

/// Damped pull of hubs toward their neighbor centroid. Forces are computed
/// for the whole pass first; moves are then applied in order and rejected
/// if they land too close to any other particle's current spot.
fn relax(positions: &mut [Point], adj: &[Vec<NodeIndex>], config: &LayoutConfig) {
    for _ in 0..config.relax_iterations {
        let forces: Vec<[f64; 2]> = (0..positions.len())
            .map(|node| {
                let neighbors = &adj[node];
                if neighbors.len() < 3 {
                    return [0.0, 0.0];
                }
                let k = neighbors.len() as f64;
                let cx = neighbors.iter().map(|nb| f64::from(positions[nb.index()][0])).sum::<f64>() / k;
                let cy = neighbors.iter().map(|nb| f64::from(positions[nb.index()][1])).sum::<f64>() / k;
                let [x, y] = positions[node];
                [
                    (cx - f64::from(x)) * config.damping,
                    (cy - f64::from(y)) * config.damping,
                ]
            })
            .collect();

        for node in 0..positions.len() {
            let [x, y] = positions[node];
            let target = [
                round(f64::from(x) + forces[node][0]),
                round(f64::from(y) + forces[node][1]),
            ];
            let collides = positions.iter().enumerate().any(|(other, p)| {
                other != node && {
                    let dx = f64::from(target[0] - p[0]);
                    let dy = f64::from(target[1] - p[1]);
                    (dx * dx + dy * dy).sqrt() < config.min_distance
                }
            });
            if !collides {
                positions[node] = target;
            }
        }
    }
}
