// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge adjacency built in a single pass over the faces
//!
//! Edges are never stored on the mesh. They are derived here, keyed by the
//! unordered vertex pair, and each entry records which faces use the edge
//! and in which direction they traverse it.

use crate::geometry::Mesh;
use std::collections::HashMap;

/// Unordered vertex pair, smaller index first
pub type Edge = (usize, usize);

/// Normalize edge direction so the smaller index comes first
#[inline]
pub fn normalize_edge(v0: usize, v1: usize) -> Edge {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

/// One face's use of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    pub face: usize,
    /// The face walks the edge from the smaller to the larger index
    pub forward: bool,
}

impl EdgeUse {
    /// The edge as this face traverses it
    pub fn directed(&self, edge: Edge) -> (usize, usize) {
        if self.forward {
            edge
        } else {
            (edge.1, edge.0)
        }
    }
}

/// Edge to face-use map for a mesh
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    edges: HashMap<Edge, Vec<EdgeUse>>,
}

impl EdgeMap {
    /// Build the map. Faces with out-of-range indices and collapsed edges are skipped.
    pub fn build(mesh: &Mesh) -> Self {
        let mut edges: HashMap<Edge, Vec<EdgeUse>> = HashMap::with_capacity(mesh.triangles.len() * 3 / 2);

        for (face, triangle) in mesh.triangles.iter().enumerate() {
            if !mesh.triangle_in_range(triangle) {
                continue;
            }
            for (a, b) in triangle.edges() {
                if a == b {
                    continue;
                }
                edges.entry(normalize_edge(a, b)).or_default().push(EdgeUse {
                    face,
                    forward: a < b,
                });
            }
        }

        Self { edges }
    }

    /// Faces using an edge, in either direction
    pub fn uses(&self, v0: usize, v1: usize) -> &[EdgeUse] {
        self.edges
            .get(&normalize_edge(v0, v1))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of faces sharing the edge
    pub fn face_count(&self, v0: usize, v1: usize) -> usize {
        self.uses(v0, v1).len()
    }

    /// Boundary edges (exactly one face), directed as their face walks them, sorted
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut boundary: Vec<(usize, usize)> = self
            .edges
            .iter()
            .filter(|(_, uses)| uses.len() == 1)
            .map(|(&edge, uses)| uses[0].directed(edge))
            .collect();
        boundary.sort_unstable();
        boundary
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.edges.values().filter(|uses| uses.len() == 1).count()
    }

    /// Edges shared by more than two faces
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .iter()
            .filter(|(_, uses)| uses.len() > 2)
            .map(|(&edge, _)| edge)
    }

    /// Sorted list of non-manifold edges
    pub fn sorted_non_manifold_edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self.non_manifold_edges().collect();
        edges.sort_unstable();
        edges
    }

    /// Manifold edges whose two faces walk them in the same direction
    pub fn inconsistent_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|uses| uses.len() == 2 && uses[0].forward == uses[1].forward)
            .count()
    }

    /// Pairs of faces sharing a two-face edge, with whether their windings agree
    pub fn manifold_pairs(&self) -> impl Iterator<Item = (EdgeUse, EdgeUse)> + '_ {
        self.edges
            .values()
            .filter(|uses| uses.len() == 2)
            .map(|uses| (uses[0], uses[1]))
    }

    /// Uses of every edge shared by two or more faces
    pub fn shared_uses(&self) -> impl Iterator<Item = &[EdgeUse]> + '_ {
        self.edges
            .values()
            .filter(|uses| uses.len() >= 2)
            .map(Vec::as_slice)
    }

    /// Each edge shared by at most two faces
    pub fn is_manifold(&self) -> bool {
        self.edges.values().all(|uses| uses.len() <= 2)
    }

    /// Each edge shared by exactly two faces
    pub fn is_closed(&self) -> bool {
        self.edges.values().all(|uses| uses.len() == 2)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Vertices not referenced by any in-range face
pub fn isolated_vertices(mesh: &Mesh) -> Vec<usize> {
    let mut used = vec![false; mesh.vertices.len()];
    for triangle in &mesh.triangles {
        if mesh.triangle_in_range(triangle) {
            for &i in &triangle.indices {
                used[i] = true;
            }
        }
    }
    used.iter()
        .enumerate()
        .filter(|(_, &u)| !u)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Point3;

    fn quad() -> Mesh {
        Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_shared_edge_counts() {
        let edges = EdgeMap::build(&quad());
        assert_eq!(edges.edge_count(), 5);
        assert_eq!(edges.face_count(0, 2), 2);
        assert_eq!(edges.face_count(2, 0), 2);
        assert_eq!(edges.face_count(0, 1), 1);
        assert_eq!(edges.face_count(1, 3), 0);
    }

    #[test]
    fn test_boundary_edges_are_directed() {
        let edges = EdgeMap::build(&quad());
        let boundary = edges.boundary_edges();
        assert_eq!(boundary, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(edges.boundary_edge_count(), 4);
    }

    #[test]
    fn test_non_manifold_detection() {
        let mut mesh = quad();
        mesh.vertices.push(Point3::new(0.5, 0.5, 1.0));
        mesh.triangles.push(crate::geometry::Triangle::new([0, 2, 4]));
        let edges = EdgeMap::build(&mesh);

        assert_eq!(edges.sorted_non_manifold_edges(), vec![(0, 2)]);
        assert!(!edges.is_manifold());
    }

    #[test]
    fn test_inconsistent_edges() {
        let mut mesh = quad();
        assert_eq!(EdgeMap::build(&mesh).inconsistent_edge_count(), 0);

        mesh.triangles[1] = mesh.triangles[1].flipped();
        assert_eq!(EdgeMap::build(&mesh).inconsistent_edge_count(), 1);
    }

    #[test]
    fn test_closed_cube() {
        let mesh = Primitive::unit_cube().to_mesh();
        let edges = EdgeMap::build(&mesh);
        assert!(edges.is_closed());
        assert!(edges.is_manifold());
        assert_eq!(edges.edge_count(), 18);
        assert_eq!(edges.inconsistent_edge_count(), 0);
    }

    #[test]
    fn test_isolated_vertices() {
        let mut mesh = quad();
        mesh.vertices.push(Point3::new(5.0, 5.0, 5.0));
        assert_eq!(isolated_vertices(&mesh), vec![4]);
    }

    #[test]
    fn test_out_of_range_faces_are_skipped() {
        let mut mesh = quad();
        mesh.triangles.push(crate::geometry::Triangle::new([0, 1, 99]));
        let edges = EdgeMap::build(&mesh);
        assert_eq!(edges.edge_count(), 5);
    }
}
