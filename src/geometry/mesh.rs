// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{KernelError, KernelResult};
use nalgebra::{Matrix4, Point3, Translation3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// Same triangle with the opposite winding
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.indices;
        Self::new([a, c, b])
    }

    /// True when two of the three indices coincide
    pub fn has_repeated_index(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }

    /// The three directed edges in traversal order
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }

    /// Unnormalized face normal (cross product of the two edge vectors)
    pub fn cross(&self, mesh: &Mesh) -> Vector3<f64> {
        let [v0, v1, v2] = mesh.triangle_positions(self);
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit face normal, zero for degenerate faces
    pub fn face_normal(&self, mesh: &Mesh) -> Vector3<f64> {
        let cross = self.cross(mesh);
        let len = cross.norm();
        if len > f64::EPSILON {
            cross / len
        } else {
            Vector3::zeros()
        }
    }
}

/// Flat exchange form of a mesh: coordinates grouped in 3s, indices grouped in 3s
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<f64>,
    pub indices: Vec<u32>,
}

/// Triangular mesh
///
/// Meshes are treated as values by the kernel: every operation takes a
/// borrowed mesh and returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from position and index arrays
    pub fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            triangles: faces.into_iter().map(Triangle::new).collect(),
        }
    }

    /// Build a mesh from flat buffers, checking grouping, finiteness and index range
    pub fn from_buffers(positions: &[f64], indices: &[u32]) -> KernelResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(KernelError::InvalidBuffers {
                reason: format!(
                    "position buffer length {} is not a multiple of 3",
                    positions.len()
                ),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(KernelError::InvalidBuffers {
                reason: format!(
                    "index buffer length {} is not a multiple of 3",
                    indices.len()
                ),
            });
        }

        if let Some(bad) = positions.iter().position(|v| !v.is_finite()) {
            return Err(KernelError::InvalidBuffers {
                reason: format!(
                    "vertex {} has non-finite coordinate {}",
                    bad / 3,
                    positions[bad]
                ),
            });
        }

        let vertices: Vec<Point3<f64>> = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(KernelError::InvalidBuffers {
                reason: format!(
                    "index {} out of range (mesh has {} vertices)",
                    bad,
                    vertices.len()
                ),
            });
        }

        let triangles = indices
            .chunks_exact(3)
            .map(|c| Triangle::new([c[0] as usize, c[1] as usize, c[2] as usize]))
            .collect();

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Flatten into the exchange form
    pub fn to_buffers(&self) -> MeshBuffers {
        MeshBuffers {
            positions: self
                .vertices
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .collect(),
            indices: self
                .triangles
                .iter()
                .flat_map(|t| t.indices.map(|i| i as u32))
                .collect(),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
    }

    /// Copy of the mesh moved by `offset`
    pub fn translated(&self, offset: Vector3<f64>) -> Mesh {
        let mut mesh = self.clone();
        mesh.transform(&Translation3::from(offset).to_homogeneous());
        mesh
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Compute bounding box over all vertices
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// True when every index of the triangle addresses an existing vertex
    pub fn triangle_in_range(&self, triangle: &Triangle) -> bool {
        triangle.indices.iter().all(|&i| i < self.vertices.len())
    }

    /// Positions of a triangle's corners. Indices must be in range.
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i])
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| t.cross(self).norm() * 0.5)
            .sum()
    }

    /// Signed volume via the divergence theorem; positive for outward winding
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    /// Merge with another mesh without any deduplication
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new(triangle.indices.map(|i| i + offset)));
        }
    }

    /// Reverse the winding of every triangle
    pub fn flip_all(&mut self) {
        for triangle in &mut self.triangles {
            *triangle = triangle.flipped();
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
