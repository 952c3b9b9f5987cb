// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe B-Rep Kernel
//!
//! Topology repair and validation for triangle meshes, BSP partitioning,
//! and boolean composition (union, intersection, difference, symmetric
//! difference) of faceted solids.
//!
//! ```
//! use nalgebra::Vector3;
//! use polyframe_brep::{Kernel, Primitive};
//!
//! let kernel = Kernel::default();
//! let a = Primitive::unit_cube().to_mesh();
//! let b = a.translated(Vector3::new(0.5, 0.0, 0.0));
//!
//! let overlap = kernel.intersection(&a, &b).unwrap();
//! assert!((overlap.signed_volume() - 0.5).abs() < 1e-9);
//! ```

pub mod boolean;
pub mod bsp;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod topology;

pub use boolean::{BooleanOp, Fragments};
pub use bsp::{BspTree, FaceLocation, Facet, Plane};
pub use config::{BspOptions, KernelConfig, PivotStrategy, Tolerances, WeldKey};
pub use error::{KernelError, KernelResult, Operand};
pub use geometry::{BoundingBox, Mesh, MeshBuffers, Primitive, Triangle};
pub use kernel::Kernel;
pub use topology::{
    MeshStats, RepairFix, RepairOptions, RepairOutcome, RepairReport, TopologyIssue,
    ValidationReport,
};
