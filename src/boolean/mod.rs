// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean composition of closed triangle meshes
//!
//! Both operands are repaired and partitioned. Each operand's faces are cut
//! against the other operand's tree until every fragment lies in a single
//! cell, then kept or discarded according to where the fragment lies:
//!
//! | operation        | kept from A              | kept from B          |
//! |------------------|--------------------------|----------------------|
//! | union            | outside, coincident      | outside              |
//! | intersection     | inside, coincident       | inside               |
//! | difference       | outside, opposed         | inside, reversed     |
//!
//! Coplanar boundary faces are kept from one side only, so `union(A, A)`
//! returns A's faces once. The symmetric difference is the concatenation
//! of both differences.

mod combine;

pub use combine::combine;

use crate::bsp::{BspTree, FaceLocation, Facet};
use crate::config::KernelConfig;
use crate::error::{KernelError, KernelResult, Operand};
use crate::geometry::Mesh;
use crate::topology::repair;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Boolean operation on two solids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl BooleanOp {
    pub const ALL: [BooleanOp; 4] = [
        BooleanOp::Union,
        BooleanOp::Intersection,
        BooleanOp::Difference,
        BooleanOp::SymmetricDifference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
            BooleanOp::SymmetricDifference => "symmetric_difference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "union" => Some(BooleanOp::Union),
            "intersection" => Some(BooleanOp::Intersection),
            "difference" => Some(BooleanOp::Difference),
            "symmetric_difference" | "xor" => Some(BooleanOp::SymmetricDifference),
            _ => None,
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surviving facets of a boolean operation, grouped by the operand they
/// were cut from
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    pub from_first: Vec<Facet>,
    pub from_second: Vec<Facet>,
}

impl Fragments {
    pub fn len(&self) -> usize {
        self.from_first.len() + self.from_second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All facets, first operand's before second's
    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.from_first.iter().chain(self.from_second.iter())
    }

    pub fn into_mesh(self, config: &KernelConfig) -> Mesh {
        combine(
            self.from_first.into_iter().chain(self.from_second),
            &config.tolerances,
        )
    }
}

/// Repaired operands and their trees
struct Prepared {
    first: Mesh,
    second: Mesh,
    first_tree: BspTree,
    second_tree: BspTree,
}

fn prepare(a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Prepared> {
    let first = repair(a, &config.repair, &config.tolerances).mesh;
    if first.is_empty() {
        return Err(KernelError::DegenerateOperand {
            operand: Operand::First,
        });
    }
    let second = repair(b, &config.repair, &config.tolerances).mesh;
    if second.is_empty() {
        return Err(KernelError::DegenerateOperand {
            operand: Operand::Second,
        });
    }

    let first_tree = BspTree::from_mesh(&first, &config.tolerances, &config.bsp);
    let second_tree = BspTree::from_mesh(&second, &config.tolerances, &config.bsp);
    Ok(Prepared {
        first,
        second,
        first_tree,
        second_tree,
    })
}

fn mesh_facets(mesh: &Mesh) -> Vec<Facet> {
    mesh.triangles
        .iter()
        .map(|t| {
            let [a, b, c] = mesh.triangle_positions(t);
            Facet::new(a, b, c)
        })
        .collect()
}

/// Cut a mesh's faces against a tree and keep fragments in the wanted locations.
///
/// A face whose fragments all get the same decision is kept or dropped
/// whole, so planes that merely pass through a face never multiply it.
fn clip(mesh: &Mesh, tree: &BspTree, keep: impl Fn(FaceLocation) -> bool) -> Vec<Facet> {
    let mut kept = Vec::new();
    for facet in mesh_facets(mesh) {
        let fragments = tree.split_facets(vec![facet]);
        let decisions: Vec<bool> = fragments
            .iter()
            .map(|fragment| keep(tree.classify_face(fragment)))
            .collect();

        if decisions.iter().all(|&d| d) {
            if !fragments.is_empty() {
                kept.push(facet);
            }
        } else if decisions.iter().any(|&d| d) {
            kept.extend(
                fragments
                    .into_iter()
                    .zip(decisions)
                    .filter_map(|(fragment, d)| d.then_some(fragment)),
            );
        }
    }
    kept
}

fn difference_pass(a: &Mesh, b: &Mesh, a_tree: &BspTree, b_tree: &BspTree) -> (Vec<Facet>, Vec<Facet>) {
    let kept_a = clip(a, b_tree, |loc| {
        matches!(loc, FaceLocation::Outside | FaceLocation::Opposed)
    });
    let kept_b = clip(b, a_tree, |loc| loc == FaceLocation::Inside)
        .into_iter()
        .map(|facet| facet.flipped())
        .collect();
    (kept_a, kept_b)
}

/// Run an operation and return the surviving facets without welding them.
pub fn fragments(op: BooleanOp, a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Fragments> {
    let p = prepare(a, b, config)?;

    let fragments = match op {
        BooleanOp::Union => Fragments {
            from_first: clip(&p.first, &p.second_tree, |loc| {
                matches!(loc, FaceLocation::Outside | FaceLocation::Coincident)
            }),
            from_second: clip(&p.second, &p.first_tree, |loc| loc == FaceLocation::Outside),
        },
        BooleanOp::Intersection => Fragments {
            from_first: clip(&p.first, &p.second_tree, |loc| {
                matches!(loc, FaceLocation::Inside | FaceLocation::Coincident)
            }),
            from_second: clip(&p.second, &p.first_tree, |loc| loc == FaceLocation::Inside),
        },
        BooleanOp::Difference => {
            let (from_first, from_second) =
                difference_pass(&p.first, &p.second, &p.first_tree, &p.second_tree);
            Fragments {
                from_first,
                from_second,
            }
        }
        BooleanOp::SymmetricDifference => {
            let (a_outside_b, b_inside_a) =
                difference_pass(&p.first, &p.second, &p.first_tree, &p.second_tree);
            let (b_outside_a, a_inside_b) =
                difference_pass(&p.second, &p.first, &p.second_tree, &p.first_tree);
            Fragments {
                from_first: a_outside_b.into_iter().chain(a_inside_b).collect(),
                from_second: b_inside_a.into_iter().chain(b_outside_a).collect(),
            }
        }
    };

    debug!(
        "{}: operands {} + {} faces, kept {} + {} fragments",
        op,
        p.first.triangle_count(),
        p.second.triangle_count(),
        fragments.from_first.len(),
        fragments.from_second.len()
    );

    Ok(fragments)
}

/// Run an operation and weld the result into a single mesh.
///
/// Fails with [`KernelError::DegenerateOperand`] when an operand has no
/// faces left after repair. The result itself is not repaired.
pub fn compose(op: BooleanOp, a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Mesh> {
    let mesh = fragments(op, a, b, config)?.into_mesh(config);
    debug!(
        "{} result: {} vertices, {} faces",
        op,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

pub fn union(a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Mesh> {
    compose(BooleanOp::Union, a, b, config)
}

pub fn intersection(a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Mesh> {
    compose(BooleanOp::Intersection, a, b, config)
}

/// `a` minus `b`
pub fn difference(a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Mesh> {
    compose(BooleanOp::Difference, a, b, config)
}

pub fn symmetric_difference(a: &Mesh, b: &Mesh, config: &KernelConfig) -> KernelResult<Mesh> {
    compose(BooleanOp::SymmetricDifference, a, b, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn cubes() -> (Mesh, Mesh) {
        let a = Primitive::unit_cube().to_mesh();
        let b = a.translated(Vector3::new(0.5, 0.0, 0.0));
        (a, b)
    }

    #[test]
    fn test_volumes_of_overlapping_cubes() {
        let (a, b) = cubes();
        let config = KernelConfig::default();

        assert_relative_eq!(union(&a, &b, &config).unwrap().signed_volume(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(
            intersection(&a, &b, &config).unwrap().signed_volume(),
            0.5,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            difference(&a, &b, &config).unwrap().signed_volume(),
            0.5,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            symmetric_difference(&a, &b, &config).unwrap().signed_volume(),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_self_union_keeps_faces_once() {
        let a = Primitive::unit_cube().to_mesh();
        let result = union(&a, &a, &KernelConfig::default()).unwrap();
        assert_eq!(result.triangle_count(), 12);
        assert_eq!(result.vertex_count(), 8);
    }

    #[test]
    fn test_self_intersection_and_difference() {
        let a = Primitive::unit_cube().to_mesh();
        let config = KernelConfig::default();
        assert_eq!(intersection(&a, &a, &config).unwrap().triangle_count(), 12);
        assert!(difference(&a, &a, &config).unwrap().is_empty());
    }

    #[test]
    fn test_uncut_faces_are_kept_whole() {
        let outer = Primitive::unit_cube().to_mesh();
        let inner = Primitive::cuboid(Point3::new(0.25, 0.25, 0.25), Point3::new(0.75, 0.75, 0.75)).to_mesh();
        let config = KernelConfig::default();

        // The inner planes pass through every outer face without changing its fate
        let kept = fragments(BooleanOp::Union, &outer, &inner, &config).unwrap();
        assert_eq!(kept.from_first, mesh_facets(&outer));
        assert!(kept.from_second.is_empty());
        assert_eq!(union(&outer, &inner, &config).unwrap().triangle_count(), 12);

        // Faces only partly removed still come back in pieces
        let (a, b) = cubes();
        let originals = mesh_facets(&a);
        let cut = fragments(BooleanOp::Difference, &a, &b, &config).unwrap();
        assert!(cut.from_first.iter().any(|f| !originals.contains(f)));
    }

    #[test]
    fn test_disjoint_operands() {
        let a = Primitive::unit_cube().to_mesh();
        let b = a.translated(Vector3::new(5.0, 0.0, 0.0));
        let config = KernelConfig::default();

        assert_eq!(union(&a, &b, &config).unwrap().triangle_count(), 24);
        assert!(intersection(&a, &b, &config).unwrap().is_empty());
        let kept = difference(&a, &b, &config).unwrap();
        assert_eq!(kept.triangle_count(), 12);
        assert_eq!(kept.vertex_count(), 8);
        assert_relative_eq!(kept.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_operand_is_rejected() {
        let a = Primitive::unit_cube().to_mesh();
        let degenerate = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let config = KernelConfig::default();

        for op in BooleanOp::ALL {
            let err = compose(op, &a, &degenerate, &config).unwrap_err();
            assert!(matches!(
                err,
                KernelError::DegenerateOperand {
                    operand: Operand::Second
                }
            ));
            let err = compose(op, &Mesh::empty(), &a, &config).unwrap_err();
            assert!(matches!(
                err,
                KernelError::DegenerateOperand {
                    operand: Operand::First
                }
            ));
        }
    }

    #[test]
    fn test_op_names() {
        for op in BooleanOp::ALL {
            assert_eq!(BooleanOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(
            BooleanOp::parse("Symmetric-Difference"),
            Some(BooleanOp::SymmetricDifference)
        );
        assert_eq!(BooleanOp::parse("merge"), None);
    }
}
