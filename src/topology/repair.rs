// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Best-effort mesh repair
//!
//! Stages run in a fixed order, each feeding the next:
//!
//! 1. faces with out-of-range indices are dropped
//! 2. duplicate vertices are welded on a quantized key
//! 3. degenerate faces are removed
//! 4. closed boundary loops are fan-filled
//! 5. winding is propagated across manifold edges
//!
//! Repair never fails. Whatever it cannot fix is listed in the report.

use super::holes::fill_holes;
use super::validate::{validate, TopologyIssue};
use super::winding::propagate_winding;
use crate::config::{Tolerances, WeldKey};
use crate::geometry::{Mesh, Triangle};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Which repair stages run. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    pub remove_duplicate_vertices: bool,
    pub remove_degenerate_faces: bool,
    pub fill_holes: bool,
    pub fix_normals: bool,
    /// Open boundary chains with at least this many edges are reported as unfillable.
    ///
    /// Default: `2`
    pub min_unfillable_chain: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            remove_duplicate_vertices: true,
            remove_degenerate_faces: true,
            fill_holes: true,
            fix_normals: true,
            min_unfillable_chain: 2,
        }
    }
}

impl RepairOptions {
    /// Every stage disabled; only out-of-range faces are dropped
    #[must_use]
    pub fn none() -> Self {
        Self {
            remove_duplicate_vertices: false,
            remove_degenerate_faces: false,
            fill_holes: false,
            fix_normals: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_remove_duplicate_vertices(mut self, enabled: bool) -> Self {
        self.remove_duplicate_vertices = enabled;
        self
    }

    #[must_use]
    pub fn with_remove_degenerate_faces(mut self, enabled: bool) -> Self {
        self.remove_degenerate_faces = enabled;
        self
    }

    #[must_use]
    pub fn with_fill_holes(mut self, enabled: bool) -> Self {
        self.fill_holes = enabled;
        self
    }

    #[must_use]
    pub fn with_fix_normals(mut self, enabled: bool) -> Self {
        self.fix_normals = enabled;
        self
    }
}

/// A fix applied by [`repair`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepairFix {
    InvalidFacesDropped { count: usize },
    DuplicateVerticesMerged { count: usize },
    DegenerateFacesRemoved { count: usize },
    HoleFilled { loop_len: usize, faces_added: usize },
    FacesReoriented { count: usize },
}

impl fmt::Display for RepairFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairFix::InvalidFacesDropped { count } => {
                write!(f, "dropped {} faces with out-of-range indices", count)
            }
            RepairFix::DuplicateVerticesMerged { count } => {
                write!(f, "merged {} duplicate vertices", count)
            }
            RepairFix::DegenerateFacesRemoved { count } => {
                write!(f, "removed {} degenerate faces", count)
            }
            RepairFix::HoleFilled {
                loop_len,
                faces_added,
            } => write!(
                f,
                "filled hole of {} edges with {} faces",
                loop_len, faces_added
            ),
            RepairFix::FacesReoriented { count } => {
                write!(f, "reversed winding of {} faces", count)
            }
        }
    }
}

/// Fixes applied and issues left, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub fixed: Vec<RepairFix>,
    pub remaining: Vec<TopologyIssue>,
}

impl RepairReport {
    /// True when nothing was changed and nothing is left
    pub fn is_clean(&self) -> bool {
        self.fixed.is_empty() && self.remaining.is_empty()
    }
}

/// Repaired mesh plus what happened to it
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub mesh: Mesh,
    pub report: RepairReport,
}

/// A face is degenerate when two indices coincide, an edge is shorter than
/// `min_edge_length`, or its cross product is below `area_epsilon`.
/// Indices must be in range.
pub(crate) fn is_degenerate(mesh: &Mesh, triangle: &Triangle, tol: &Tolerances) -> bool {
    if triangle.has_repeated_index() {
        return true;
    }
    let [a, b, c] = mesh.triangle_positions(triangle);
    if (b - a).norm() < tol.min_edge_length
        || (c - b).norm() < tol.min_edge_length
        || (a - c).norm() < tol.min_edge_length
    {
        return true;
    }
    triangle.cross(mesh).norm() < tol.area_epsilon
}

fn drop_invalid_faces(mesh: &mut Mesh) -> usize {
    let before = mesh.triangles.len();
    let vertex_count = mesh.vertices.len();
    mesh.triangles
        .retain(|t| t.indices.iter().all(|&i| i < vertex_count));
    before - mesh.triangles.len()
}

/// Weld vertices sharing a quantized key into the first one seen
fn merge_duplicate_vertices(mesh: &mut Mesh, tol: &Tolerances) -> usize {
    let mut first_by_key: HashMap<WeldKey, usize> = HashMap::with_capacity(mesh.vertices.len());
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    let mut remap = Vec::with_capacity(mesh.vertices.len());

    for position in &mesh.vertices {
        let index = match first_by_key.entry(tol.weld_key(position)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                vertices.push(*position);
                *e.insert(vertices.len() - 1)
            }
        };
        remap.push(index);
    }

    let merged = mesh.vertices.len() - vertices.len();
    if merged > 0 {
        for triangle in &mut mesh.triangles {
            triangle.indices = triangle.indices.map(|i| remap[i]);
        }
        mesh.vertices = vertices;
    }
    merged
}

fn remove_degenerate_faces(mesh: &mut Mesh, tol: &Tolerances) -> usize {
    let before = mesh.triangles.len();
    let kept: Vec<Triangle> = mesh
        .triangles
        .iter()
        .filter(|t| !is_degenerate(mesh, t, tol))
        .copied()
        .collect();
    mesh.triangles = kept;
    before - mesh.triangles.len()
}

fn reorient_faces(mesh: &mut Mesh) -> usize {
    let summary = propagate_winding(mesh);
    for &face in &summary.flipped {
        mesh.triangles[face] = mesh.triangles[face].flipped();
    }
    summary.flipped.len()
}

/// Repair a mesh. The input is never modified.
pub fn repair(mesh: &Mesh, options: &RepairOptions, tol: &Tolerances) -> RepairOutcome {
    let mut mesh = mesh.clone();
    let mut fixed = Vec::new();

    debug!(
        "Repairing mesh: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let dropped = drop_invalid_faces(&mut mesh);
    if dropped > 0 {
        debug!("Dropped {} faces with out-of-range indices", dropped);
        fixed.push(RepairFix::InvalidFacesDropped { count: dropped });
    }

    if options.remove_duplicate_vertices {
        let merged = merge_duplicate_vertices(&mut mesh, tol);
        debug!("Merged {} duplicate vertices", merged);
        if merged > 0 {
            fixed.push(RepairFix::DuplicateVerticesMerged { count: merged });
        }
    }

    if options.remove_degenerate_faces {
        let removed = remove_degenerate_faces(&mut mesh, tol);
        debug!("Removed {} degenerate faces", removed);
        if removed > 0 {
            fixed.push(RepairFix::DegenerateFacesRemoved { count: removed });
        }
    }

    if options.fill_holes {
        let summary = fill_holes(&mut mesh, tol, options.min_unfillable_chain);
        for (loop_len, faces_added) in summary.filled {
            fixed.push(RepairFix::HoleFilled {
                loop_len,
                faces_added,
            });
        }
    }

    if options.fix_normals {
        let flipped = reorient_faces(&mut mesh);
        if flipped > 0 {
            debug!("Reversed winding of {} faces", flipped);
            fixed.push(RepairFix::FacesReoriented { count: flipped });

            // Chains broken by inconsistent winding may close now
            if options.fill_holes {
                let retry = fill_holes(&mut mesh, tol, options.min_unfillable_chain);
                for (loop_len, faces_added) in retry.filled {
                    fixed.push(RepairFix::HoleFilled {
                        loop_len,
                        faces_added,
                    });
                }
            }
        }
    }

    let validation = validate(&mesh, tol);
    let components = validation.stats.components;
    let mut remaining: Vec<TopologyIssue> = validation
        .issues
        .into_iter()
        .filter(|issue| match issue {
            TopologyIssue::OpenBoundary { vertices } => {
                vertices.len().saturating_sub(1) >= options.min_unfillable_chain
            }
            _ => true,
        })
        .collect();
    for issue in &remaining {
        if let TopologyIssue::NonManifoldEdges { edges } = issue {
            warn!("{} non-manifold edges left as is", edges.len());
        }
    }
    if options.fix_normals && components > 1 {
        remaining.push(TopologyIssue::DisconnectedComponents { count: components });
    }

    info!(
        "Repair complete: {} fixes applied, {} issues remaining",
        fixed.len(),
        remaining.len()
    );

    RepairOutcome {
        mesh,
        report: RepairReport { fixed, remaining },
    }
}
