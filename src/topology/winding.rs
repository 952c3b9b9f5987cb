// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Winding propagation
//!
//! Two faces sharing a manifold edge are consistently wound when they walk
//! that edge in opposite directions. A breadth-first pass from one seed per
//! connected component decides, for every reachable face, whether it has to
//! be reversed to agree with the seed.

use super::adjacency::EdgeMap;
use crate::geometry::Mesh;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Result of orientation propagation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindingSummary {
    /// Faces whose vertex order must be reversed, ascending
    pub flipped: Vec<usize>,
    /// Number of seeds needed, one per edge-connected component
    pub components: usize,
    /// Manifold edges whose required orientation contradicts an earlier decision
    pub conflicts: usize,
}

/// Neighbour across a manifold edge. Orientation only travels across
/// edges with exactly two faces, where "opposite direction" is well defined.
#[derive(Debug, Clone, Copy)]
struct Link {
    face: usize,
    /// Both faces walk the shared edge in the same direction
    same_direction: bool,
}

fn face_links(mesh: &Mesh, edges: &EdgeMap) -> Vec<Vec<Link>> {
    let mut links: Vec<Vec<Link>> = vec![Vec::new(); mesh.triangles.len()];
    for (a, b) in edges.manifold_pairs() {
        if a.face == b.face {
            continue;
        }
        let same_direction = a.forward == b.forward;
        links[a.face].push(Link {
            face: b.face,
            same_direction,
        });
        links[b.face].push(Link {
            face: a.face,
            same_direction,
        });
    }
    // Hash map iteration order must not leak into the traversal
    for list in &mut links {
        list.sort_unstable_by_key(|link| link.face);
    }
    links
}

/// Compute which faces to reverse so every component is consistently wound.
///
/// Seeds are taken in face order and keep their orientation, so the result
/// is deterministic for a given face list.
pub fn propagate_winding(mesh: &Mesh) -> WindingSummary {
    let edges = EdgeMap::build(mesh);
    let links = face_links(mesh, &edges);

    let face_count = mesh.triangles.len();
    let mut visited = vec![false; face_count];
    let mut flip = vec![false; face_count];
    let mut summary = WindingSummary::default();
    let mut queue = VecDeque::new();

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        summary.components += 1;
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(face) = queue.pop_front() {
            for link in &links[face] {
                let required = flip[face] ^ link.same_direction;
                if visited[link.face] {
                    if flip[link.face] != required {
                        summary.conflicts += 1;
                    }
                    continue;
                }
                visited[link.face] = true;
                flip[link.face] = required;
                queue.push_back(link.face);
            }
        }
    }

    // Every conflicting edge is seen from both sides
    summary.conflicts /= 2;
    summary.flipped = flip
        .iter()
        .enumerate()
        .filter(|(_, &f)| f)
        .map(|(i, _)| i)
        .collect();

    debug!(
        "Winding propagation: {} components, {} faces to flip",
        summary.components,
        summary.flipped.len()
    );
    if summary.conflicts > 0 {
        warn!(
            "{} edges cannot be oriented consistently (non-orientable surface)",
            summary.conflicts
        );
    }

    summary
}

/// Count edge-connected components of in-range faces without computing orientation.
///
/// Unlike winding propagation, faces meeting along a non-manifold edge count
/// as connected, so a duplicated face never splits a shell in two.
pub fn count_components(mesh: &Mesh, edges: &EdgeMap) -> usize {
    let mut links: Vec<Vec<usize>> = vec![Vec::new(); mesh.triangles.len()];
    for uses in edges.shared_uses() {
        let hub = uses[0].face;
        for other in &uses[1..] {
            if other.face != hub {
                links[hub].push(other.face);
                links[other.face].push(hub);
            }
        }
    }
    let mut visited = vec![false; mesh.triangles.len()];
    let mut components = 0;
    let mut stack = Vec::new();

    for (seed, triangle) in mesh.triangles.iter().enumerate() {
        if visited[seed] || !mesh.triangle_in_range(triangle) {
            continue;
        }
        components += 1;
        visited[seed] = true;
        stack.push(seed);
        while let Some(face) = stack.pop() {
            for &next in &links[face] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
    }
    components
}
