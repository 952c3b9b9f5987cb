// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Read-only topology validation
//!
//! Runs the same detection routines repair uses, without touching the mesh.

use super::adjacency::{isolated_vertices, Edge, EdgeMap};
use super::holes::trace_boundaries;
use super::repair::is_degenerate;
use super::winding::count_components;
use crate::config::Tolerances;
use crate::geometry::Mesh;
use serde::Serialize;
use std::fmt;

/// A topological defect found in a mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyIssue {
    /// Faces referencing a vertex index past the end of the vertex list
    IndexOutOfRange { faces: Vec<usize> },
    /// Faces with a repeated index or near-zero area
    DegenerateFaces { faces: Vec<usize> },
    /// Edges shared by more than two faces
    NonManifoldEdges { edges: Vec<Edge> },
    /// Closed loop of boundary edges
    Hole { vertices: Vec<usize> },
    /// Boundary chain that does not close
    OpenBoundary { vertices: Vec<usize> },
    IsolatedVertices { vertices: Vec<usize> },
    /// Manifold edges walked in the same direction by both faces
    InconsistentWinding { edges: usize },
    /// Components oriented independently of each other
    DisconnectedComponents { count: usize },
}

impl fmt::Display for TopologyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyIssue::IndexOutOfRange { faces } => {
                write!(f, "{} faces reference out-of-range vertices", faces.len())
            }
            TopologyIssue::DegenerateFaces { faces } => {
                write!(f, "{} degenerate faces", faces.len())
            }
            TopologyIssue::NonManifoldEdges { edges } => {
                write!(f, "{} non-manifold edges", edges.len())
            }
            TopologyIssue::Hole { vertices } => {
                write!(f, "hole bounded by {} edges", vertices.len())
            }
            TopologyIssue::OpenBoundary { vertices } => write!(
                f,
                "unfillable open boundary of {} edges starting at vertex {}",
                vertices.len().saturating_sub(1),
                vertices.first().copied().unwrap_or_default()
            ),
            TopologyIssue::IsolatedVertices { vertices } => {
                write!(f, "{} isolated vertices", vertices.len())
            }
            TopologyIssue::InconsistentWinding { edges } => {
                write!(f, "{} edges with inconsistent winding", edges)
            }
            TopologyIssue::DisconnectedComponents { count } => write!(
                f,
                "{} disconnected components oriented independently",
                count
            ),
        }
    }
}

/// Counts gathered during validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshStats {
    pub vertices: usize,
    pub faces: usize,
    pub edges: usize,
    pub boundary_edges: usize,
    pub non_manifold_edges: usize,
    pub holes: usize,
    pub open_chains: usize,
    pub isolated_vertices: usize,
    pub degenerate_faces: usize,
    pub inconsistent_edges: usize,
    pub components: usize,
}

/// Result of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<TopologyIssue>,
    pub stats: MeshStats,
}

/// Inspect a mesh and report every defect found.
///
/// A mesh is valid when it has no issues: it is closed, manifold,
/// consistently wound and free of degenerate faces and unused vertices.
/// Several connected components are allowed.
pub fn validate(mesh: &Mesh, tol: &Tolerances) -> ValidationReport {
    let mut issues = Vec::new();

    let mut out_of_range = Vec::new();
    let mut degenerate = Vec::new();
    for (i, triangle) in mesh.triangles.iter().enumerate() {
        if !mesh.triangle_in_range(triangle) {
            out_of_range.push(i);
        } else if is_degenerate(mesh, triangle, tol) {
            degenerate.push(i);
        }
    }

    let edges = EdgeMap::build(mesh);
    let non_manifold = edges.sorted_non_manifold_edges();
    let scan = trace_boundaries(&edges);
    let isolated = isolated_vertices(mesh);
    let inconsistent = edges.inconsistent_edge_count();

    let stats = MeshStats {
        vertices: mesh.vertex_count(),
        faces: mesh.triangle_count(),
        edges: edges.edge_count(),
        boundary_edges: edges.boundary_edge_count(),
        non_manifold_edges: non_manifold.len(),
        holes: scan.loops.len(),
        open_chains: scan.open_chains.len(),
        isolated_vertices: isolated.len(),
        degenerate_faces: degenerate.len(),
        inconsistent_edges: inconsistent,
        components: count_components(mesh, &edges),
    };

    if !out_of_range.is_empty() {
        issues.push(TopologyIssue::IndexOutOfRange {
            faces: out_of_range,
        });
    }
    if !degenerate.is_empty() {
        issues.push(TopologyIssue::DegenerateFaces { faces: degenerate });
    }
    if !non_manifold.is_empty() {
        issues.push(TopologyIssue::NonManifoldEdges {
            edges: non_manifold,
        });
    }
    for boundary in scan.loops {
        issues.push(TopologyIssue::Hole {
            vertices: boundary.vertices,
        });
    }
    for chain in scan.open_chains {
        issues.push(TopologyIssue::OpenBoundary { vertices: chain });
    }
    if !isolated.is_empty() {
        issues.push(TopologyIssue::IsolatedVertices { vertices: isolated });
    }
    if inconsistent > 0 {
        issues.push(TopologyIssue::InconsistentWinding {
            edges: inconsistent,
        });
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Triangle};
    use nalgebra::Point3;

    #[test]
    fn test_closed_cube_is_valid() {
        let report = validate(&Primitive::unit_cube().to_mesh(), &Tolerances::default());
        assert!(report.is_valid, "issues: {:?}", report.issues);
        assert_eq!(report.stats.faces, 12);
        assert_eq!(report.stats.edges, 18);
        assert_eq!(report.stats.components, 1);
    }

    #[test]
    fn test_missing_face_is_one_hole() {
        let mut mesh = Primitive::unit_cube().to_mesh();
        mesh.triangles.pop();
        let report = validate(&mesh, &Tolerances::default());

        assert!(!report.is_valid);
        assert_eq!(report.stats.holes, 1);
        assert_eq!(report.stats.boundary_edges, 3);
        assert!(matches!(
            &report.issues[0],
            TopologyIssue::Hole { vertices } if vertices.len() == 3
        ));
    }

    #[test]
    fn test_reports_without_mutating() {
        let mut mesh = Primitive::unit_cube().to_mesh();
        mesh.vertices.push(Point3::new(9.0, 9.0, 9.0));
        mesh.triangles.push(Triangle::new([0, 0, 1]));
        mesh.triangles.push(Triangle::new([0, 1, 42]));
        let before = mesh.clone();

        let report = validate(&mesh, &Tolerances::default());
        assert_eq!(mesh, before);
        assert_eq!(report.stats.degenerate_faces, 1);
        assert!(report
            .issues
            .contains(&TopologyIssue::IndexOutOfRange { faces: vec![13] }));
        assert!(report
            .issues
            .contains(&TopologyIssue::IsolatedVertices { vertices: vec![8] }));
    }

    #[test]
    fn test_flipped_face_reports_inconsistent_winding() {
        let mut mesh = Primitive::unit_cube().to_mesh();
        mesh.triangles[3] = mesh.triangles[3].flipped();
        let report = validate(&mesh, &Tolerances::default());
        assert_eq!(
            report.issues,
            vec![TopologyIssue::InconsistentWinding { edges: 3 }]
        );
    }

    #[test]
    fn test_issue_messages() {
        let issue = TopologyIssue::NonManifoldEdges {
            edges: vec![(0, 1), (2, 3)],
        };
        assert_eq!(issue.to_string(), "2 non-manifold edges");
        let issue = TopologyIssue::OpenBoundary {
            vertices: vec![4, 5, 6],
        };
        assert_eq!(
            issue.to_string(),
            "unfillable open boundary of 2 edges starting at vertex 4"
        );
    }
}
