// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena-backed BSP tree
//!
//! Nodes live in a flat vector and refer to their children by index. Every
//! traversal (build, containment, splitting) runs on an explicit stack so
//! depth is bounded by memory rather than by the call stack.

use super::plane::{FaceClass, Facet, Plane};
use crate::config::{BspOptions, PivotStrategy, Tolerances};
use crate::geometry::Mesh;
use tracing::{debug, trace};

/// Index of a node in its tree's arena
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct BspNode {
    pub plane: Plane,
    /// Facets coplanar with `plane`, the pivot included
    pub contents: Vec<Facet>,
    pub front: Option<NodeId>,
    pub back: Option<NodeId>,
}

/// Where a face lies relative to a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceLocation {
    /// Strictly inside the solid
    Inside,
    /// Strictly outside the solid
    Outside,
    /// On the solid's boundary, facing the same way as the boundary
    Coincident,
    /// On the solid's boundary, facing the opposite way
    Opposed,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Front(NodeId),
    Back(NodeId),
}

/// Binary space partition of a set of facets
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    root: Option<NodeId>,
    /// Degenerate facets left over at the root, where no plane could be built
    degenerate: Vec<Facet>,
    tolerances: Tolerances,
}

impl BspTree {
    /// Build a tree from every face of a mesh. Faces with out-of-range
    /// indices are ignored.
    pub fn from_mesh(mesh: &Mesh, tol: &Tolerances, options: &BspOptions) -> Self {
        let facets = mesh
            .triangles
            .iter()
            .filter(|t| mesh.triangle_in_range(t))
            .map(|t| {
                let [a, b, c] = mesh.triangle_positions(t);
                Facet::new(a, b, c)
            })
            .collect();
        Self::build(facets, tol, options)
    }

    /// Build a tree from a facet list. An empty list gives an empty tree.
    pub fn build(facets: Vec<Facet>, tol: &Tolerances, options: &BspOptions) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            degenerate: Vec::new(),
            tolerances: *tol,
        };
        let input_count = facets.len();
        let mut stack: Vec<(Vec<Facet>, Slot, usize)> = Vec::new();
        if !facets.is_empty() {
            stack.push((facets, Slot::Root, 1));
        }
        let mut max_depth = 0;
        let mut splits = 0;
        let mut skipped = 0;

        while let Some((facets, slot, depth)) = stack.pop() {
            let Some((pivot_index, plane)) = choose_pivot(&facets, tol, options) else {
                // Nothing left to split on: keep the remainder as coplanar content
                match slot {
                    Slot::Root => tree.degenerate.extend(facets),
                    Slot::Front(parent) | Slot::Back(parent) => {
                        tree.nodes[parent].contents.extend(facets)
                    }
                }
                continue;
            };

            max_depth = max_depth.max(depth);
            let mut contents = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();

            for (i, facet) in facets.into_iter().enumerate() {
                if i == pivot_index {
                    contents.push(facet);
                    continue;
                }
                match plane.classify_facet(&facet, tol.plane_epsilon) {
                    FaceClass::Front => front.push(facet),
                    FaceClass::Back => back.push(facet),
                    FaceClass::Coplanar => contents.push(facet),
                    FaceClass::Spanning => {
                        splits += 1;
                        let (f, b) = plane.split_facet(&facet, tol.plane_epsilon);
                        for fragment in f {
                            if keep_fragment(&fragment, tol) {
                                front.push(fragment);
                            } else {
                                skipped += 1;
                            }
                        }
                        for fragment in b {
                            if keep_fragment(&fragment, tol) {
                                back.push(fragment);
                            } else {
                                skipped += 1;
                            }
                        }
                    }
                }
            }

            let id = tree.nodes.len();
            tree.nodes.push(BspNode {
                plane,
                contents,
                front: None,
                back: None,
            });
            match slot {
                Slot::Root => tree.root = Some(id),
                Slot::Front(parent) => tree.nodes[parent].front = Some(id),
                Slot::Back(parent) => tree.nodes[parent].back = Some(id),
            }

            if !back.is_empty() {
                stack.push((back, Slot::Back(id), depth + 1));
            }
            if !front.is_empty() {
                stack.push((front, Slot::Front(id), depth + 1));
            }
        }

        debug!(
            "Built BSP tree: {} input facets, {} nodes, depth {}, {} splits, {} slivers skipped",
            input_count,
            tree.nodes.len(),
            max_depth,
            splits,
            skipped
        );

        tree
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-node path, counted in nodes
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.front.map(|child| (child, depth + 1)));
            stack.extend(node.back.map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Every facet stored in the tree, node contents first in arena order
    pub fn facets(&self) -> Vec<Facet> {
        self.nodes
            .iter()
            .flat_map(|node| node.contents.iter().copied())
            .chain(self.degenerate.iter().copied())
            .collect()
    }

    /// Is the point inside the solid this tree was built from?
    ///
    /// Points in front of a plane descend the front side and are outside
    /// when there is no front child. Every other point descends the back
    /// side and is inside when there is no back child, so points on the
    /// boundary count as inside. An empty tree contains nothing.
    pub fn contains(&self, point: &nalgebra::Point3<f64>) -> bool {
        let Some(mut current) = self.root else {
            return false;
        };
        loop {
            let node = &self.nodes[current];
            if node.plane.signed_distance(point) > self.tolerances.plane_epsilon {
                match node.front {
                    Some(child) => current = child,
                    None => return false,
                }
            } else {
                match node.back {
                    Some(child) => current = child,
                    None => return true,
                }
            }
        }
    }

    /// Locate a facet by probing just behind and just in front of its
    /// centroid along the facet normal.
    pub fn classify_face(&self, facet: &Facet) -> FaceLocation {
        let centroid = facet.centroid();
        let Some(normal) = facet.normal() else {
            return if self.contains(&centroid) {
                FaceLocation::Inside
            } else {
                FaceLocation::Outside
            };
        };
        let step = normal * self.tolerances.boundary_offset;
        let behind = self.contains(&(centroid - step));
        let ahead = self.contains(&(centroid + step));
        match (behind, ahead) {
            (true, true) => FaceLocation::Inside,
            (false, false) => FaceLocation::Outside,
            (true, false) => FaceLocation::Coincident,
            (false, true) => FaceLocation::Opposed,
        }
    }

    /// Cut facets along the tree's planes until every fragment lies in a
    /// single cell.
    ///
    /// Facets coplanar with a node are pushed through the front subtree
    /// and then through the back subtree. Slivers below the area threshold
    /// are dropped.
    pub fn split_facets(&self, facets: Vec<Facet>) -> Vec<Facet> {
        let Some(root) = self.root else {
            return facets;
        };
        let eps = self.tolerances.plane_epsilon;
        let mut output = Vec::with_capacity(facets.len());
        // (node, facet, nodes still to visit once this branch bottoms out)
        let mut stack: Vec<(NodeId, Facet, Vec<NodeId>)> = facets
            .into_iter()
            .rev()
            .map(|facet| (root, facet, Vec::new()))
            .collect();

        while let Some((id, facet, mut resume)) = stack.pop() {
            let node = &self.nodes[id];
            let next = |child: Option<NodeId>, mut resume: Vec<NodeId>| match child {
                Some(child) => Some((child, resume)),
                None => resume.pop().map(|n| (n, resume)),
            };

            match node.plane.classify_facet(&facet, eps) {
                FaceClass::Front => match next(node.front, resume) {
                    Some((n, r)) => stack.push((n, facet, r)),
                    None => output.push(facet),
                },
                FaceClass::Back => match next(node.back, resume) {
                    Some((n, r)) => stack.push((n, facet, r)),
                    None => output.push(facet),
                },
                FaceClass::Coplanar => {
                    if let Some(back) = node.back {
                        resume.push(back);
                    }
                    match next(node.front, resume) {
                        Some((n, r)) => stack.push((n, facet, r)),
                        None => output.push(facet),
                    }
                }
                FaceClass::Spanning => {
                    let (front, back) = node.plane.split_facet(&facet, eps);
                    for (fragments, child) in [(back, node.back), (front, node.front)] {
                        for fragment in fragments {
                            if !keep_fragment(&fragment, &self.tolerances) {
                                continue;
                            }
                            match next(child, resume.clone()) {
                                Some((n, r)) => stack.push((n, fragment, r)),
                                None => output.push(fragment),
                            }
                        }
                    }
                }
            }
        }

        output
    }
}

fn keep_fragment(fragment: &Facet, tol: &Tolerances) -> bool {
    let keep = fragment.cross().norm() >= tol.area_epsilon;
    if !keep {
        trace!("Skipping near-zero-area split fragment {:?}", fragment.positions);
    }
    keep
}

/// Pick the splitting facet for a node: its index and plane.
/// Returns `None` when every facet is degenerate.
fn choose_pivot(facets: &[Facet], tol: &Tolerances, options: &BspOptions) -> Option<(usize, Plane)> {
    let mut candidates = facets
        .iter()
        .enumerate()
        .filter_map(|(i, f)| Plane::from_facet(f, tol.area_epsilon).map(|plane| (i, plane)));

    match options.pivot {
        PivotStrategy::First => candidates.next(),
        PivotStrategy::LeastSplits => candidates
            .take(options.pivot_candidates.max(1))
            .map(|(i, plane)| {
                let splits = facets
                    .iter()
                    .filter(|f| plane.classify_facet(f, tol.plane_epsilon) == FaceClass::Spanning)
                    .count();
                (splits, i, plane)
            })
            .min_by_key(|&(splits, i, _)| (splits, i))
            .map(|(_, i, plane)| (i, plane)),
    }
}
