// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reassemble surviving facets into an indexed mesh

use crate::bsp::Facet;
use crate::config::{Tolerances, WeldKey};
use crate::geometry::{Mesh, Triangle};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::trace;

/// Build one mesh from a facet list, sharing vertices whose weld keys match.
///
/// Facets that collapse onto a repeated vertex after welding are dropped.
pub fn combine<I>(facets: I, tol: &Tolerances) -> Mesh
where
    I: IntoIterator<Item = Facet>,
{
    let facets = facets.into_iter();
    let mut mesh = Mesh::with_capacity(0, facets.size_hint().0);
    let mut by_key: HashMap<WeldKey, usize> = HashMap::new();

    for facet in facets {
        let indices = facet.positions.map(|p| match by_key.entry(tol.weld_key(&p)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => *e.insert(mesh.add_vertex(p)),
        });
        let triangle = Triangle::new(indices);
        if triangle.has_repeated_index() {
            trace!("Dropping facet collapsed by welding: {:?}", facet.positions);
            continue;
        }
        mesh.add_triangle(triangle);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_shared_corners_are_welded() {
        let a = Facet::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let b = Facet::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0000000001, 0.0),
        );
        let mesh = combine([a, b], &Tolerances::default());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles[1].indices, [1, 3, 2]);
    }

    #[test]
    fn test_collapsed_facet_is_dropped() {
        let sliver = Facet::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-9, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let mesh = combine([sliver], &Tolerances::default());
        assert!(mesh.is_empty());
    }
}
