// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! BSP partitioning - splitting planes, facet classification and the tree

mod plane;
mod tree;

pub use plane::{FaceClass, Facet, Plane};
pub use tree::{BspNode, BspTree, FaceLocation, NodeId};
