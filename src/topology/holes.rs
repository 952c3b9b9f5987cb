// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary tracing and hole filling
//!
//! A hole is a closed loop of boundary edges (edges with exactly one
//! adjacent face). Loops are traced along the direction each boundary edge
//! is walked by its face, so a fill triangle is wound against the loop to
//! agree with its neighbours.

use super::adjacency::EdgeMap;
use super::repair::is_degenerate;
use crate::config::Tolerances;
use crate::geometry::{Mesh, Triangle};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Closed loop of boundary vertices, in boundary traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    pub vertices: Vec<usize>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Result of chaining every boundary edge of a mesh
#[derive(Debug, Clone, Default)]
pub struct BoundaryScan {
    /// Chains that returned to their start vertex
    pub loops: Vec<BoundaryLoop>,
    /// Chains that ran out of continuations; vertex lists include both ends
    pub open_chains: Vec<Vec<usize>>,
}

impl BoundaryScan {
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty() && self.open_chains.is_empty()
    }
}

/// Chain boundary edges into loops: an edge's end vertex becomes the next edge's start.
pub fn trace_boundaries(edges: &EdgeMap) -> BoundaryScan {
    let boundary = edges.boundary_edges();
    if boundary.is_empty() {
        return BoundaryScan::default();
    }

    debug!("Found {} boundary edges", boundary.len());

    // Sorted input keeps the continuation choice deterministic
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(a, b) in &boundary {
        outgoing.entry(a).or_default().push(b);
    }

    let mut used: HashSet<(usize, usize)> = HashSet::with_capacity(boundary.len());
    let mut scan = BoundaryScan::default();

    for &(start, first_end) in &boundary {
        if !used.insert((start, first_end)) {
            continue;
        }

        let mut chain = vec![start];
        let mut current = first_end;

        loop {
            if current == start {
                scan.loops.push(BoundaryLoop { vertices: chain });
                break;
            }
            chain.push(current);

            let next = outgoing.get(&current).and_then(|ends| {
                ends.iter()
                    .copied()
                    .find(|&end| !used.contains(&(current, end)))
            });

            match next {
                Some(end) => {
                    used.insert((current, end));
                    current = end;
                }
                None => {
                    scan.open_chains.push(chain);
                    break;
                }
            }
        }
    }

    scan
}

/// Fan-triangulate a closed loop from its first vertex.
///
/// Only correct for near-planar, convex-ish loops. Fan triangles below the
/// area threshold are skipped.
pub fn fill_loop(mesh: &Mesh, boundary: &BoundaryLoop, tol: &Tolerances) -> Vec<Triangle> {
    let n = boundary.vertices.len();
    if n < 3 {
        return Vec::new();
    }

    let v0 = boundary.vertices[0];
    let mut triangles = Vec::with_capacity(n - 2);
    for i in 1..n - 1 {
        let triangle = Triangle::new([v0, boundary.vertices[i + 1], boundary.vertices[i]]);
        if is_degenerate(mesh, &triangle, tol) {
            debug!("Skipping degenerate fan triangle {:?}", triangle.indices);
            continue;
        }
        triangles.push(triangle);
    }
    triangles
}

/// Outcome of [`fill_holes`]
#[derive(Debug, Clone, Default)]
pub struct HoleFillSummary {
    /// (loop length, faces added) per filled loop
    pub filled: Vec<(usize, usize)>,
    /// Open chains long enough to report
    pub unfillable: Vec<Vec<usize>>,
}

/// Close every boundary loop of length >= 3 in place
pub fn fill_holes(mesh: &mut Mesh, tol: &Tolerances, min_unfillable_chain: usize) -> HoleFillSummary {
    let edges = EdgeMap::build(mesh);
    let scan = trace_boundaries(&edges);
    let mut summary = HoleFillSummary::default();

    for chain in scan.open_chains {
        let edge_count = chain.len().saturating_sub(1);
        if edge_count >= min_unfillable_chain {
            warn!(
                "Boundary chain starting at vertex {} with {} edges is not closed",
                chain[0], edge_count
            );
            summary.unfillable.push(chain);
        } else {
            debug!("Ignoring short open boundary chain {:?}", chain);
        }
    }

    for boundary in &scan.loops {
        let triangles = fill_loop(mesh, boundary, tol);
        if triangles.is_empty() {
            continue;
        }
        info!(
            "Filled hole with {} edges using {} triangles",
            boundary.edge_count(),
            triangles.len()
        );
        summary.filled.push((boundary.edge_count(), triangles.len()));
        mesh.triangles.extend(triangles);
    }

    summary
}
