// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Every primitive is emitted as a closed, shared-vertex, outward-wound
//! solid, which is the form boolean composition expects.

use super::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Cuboid { min: Point3<f64>, max: Point3<f64> },
    Sphere { r: f64, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Axis-aligned unit cube spanning `[0,1]^3`
    pub fn unit_cube() -> Self {
        Self::cube(Vector3::new(1.0, 1.0, 1.0), false)
    }

    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Cuboid { min, max }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cube { size, center } => {
                let min = if center {
                    Point3::from(-size / 2.0)
                } else {
                    Point3::origin()
                };
                generate_cuboid_mesh(min, min + size)
            }
            Self::Cuboid { min, max } => generate_cuboid_mesh(min, max),
            Self::Sphere { r, segments } => generate_sphere_mesh(r, segments),
        }
    }
}

fn generate_cuboid_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    // 8 vertices of the box
    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    // 6 faces, two triangles each, counter-clockwise seen from outside
    let faces = vec![
        // z+
        [4, 5, 6],
        [4, 6, 7],
        // z-
        [1, 0, 3],
        [1, 3, 2],
        // x+
        [5, 1, 2],
        [5, 2, 6],
        // x-
        [0, 4, 7],
        [0, 7, 3],
        // y+
        [7, 6, 2],
        [7, 2, 3],
        // y-
        [0, 1, 5],
        [0, 5, 4],
    ];

    Mesh::from_parts(vertices, faces)
}

fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let stacks = segments.max(2) as usize;
    let slices = segments as usize;
    let mut mesh = Mesh::with_capacity(2 + (stacks - 1) * slices, 2 * slices * (stacks - 1));

    let top = mesh.add_vertex(Point3::new(0.0, 0.0, radius));

    // Rings between the poles, no seam duplicates
    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(stacks - 1);
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let z = radius * phi.cos();
        let r = radius * phi.sin();

        let ring = (0..slices)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / slices as f64;
                mesh.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z))
            })
            .collect();
        rings.push(ring);
    }

    let bottom = mesh.add_vertex(Point3::new(0.0, 0.0, -radius));

    let first = &rings[0];
    for j in 0..slices {
        let next = (j + 1) % slices;
        mesh.add_triangle(Triangle::new([top, first[j], first[next]]));
    }

    for pair in rings.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for j in 0..slices {
            let next = (j + 1) % slices;
            mesh.add_triangle(Triangle::new([upper[j], lower[j], lower[next]]));
            mesh.add_triangle(Triangle::new([upper[j], lower[next], upper[next]]));
        }
    }

    let last = &rings[rings.len() - 1];
    for j in 0..slices {
        let next = (j + 1) % slices;
        mesh.add_triangle(Triangle::new([bottom, last[next], last[j]]));
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::EdgeMap;

    #[test]
    fn test_cube_generation() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);

        let edges = EdgeMap::build(&mesh);
        assert!(edges.is_closed());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_centered_cube() {
        let mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = Primitive::sphere(5.0, 16).to_mesh();
        let edges = EdgeMap::build(&mesh);
        assert!(edges.is_closed(), "Sphere mesh should be closed");
        assert_eq!(edges.non_manifold_edges().count(), 0);

        // Volume approaches 4/3 pi r^3 from below
        let expected = 4.0 / 3.0 * PI * 125.0;
        let volume = mesh.signed_volume();
        assert!(volume > 0.8 * expected && volume < expected);
    }

    #[test]
    fn test_sphere_vertex_count() {
        // 2 poles + (stacks - 1) rings of `slices` vertices
        let mesh = Primitive::sphere(1.0, 8).to_mesh();
        assert_eq!(mesh.vertex_count(), 2 + 7 * 8);
        assert_eq!(mesh.triangle_count(), 2 * 8 + 2 * 8 * 6);
    }
}
