// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API
//!
//! A [`Kernel`] is an explicit, caller-owned service object. It holds a
//! configuration and nothing else, so independent kernels (or one kernel
//! shared by reference) can be used from several threads.

use crate::boolean::{self, BooleanOp, Fragments};
use crate::bsp::BspTree;
use crate::config::KernelConfig;
use crate::error::KernelResult;
use crate::geometry::Mesh;
use crate::topology::{self, RepairOptions, RepairOutcome, ValidationReport};

/// Main kernel entry point
#[derive(Debug, Clone, Default)]
pub struct Kernel {
    config: KernelConfig,
}

impl Kernel {
    /// Create a kernel with a validated configuration
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Report topological defects without modifying the mesh
    pub fn validate(&self, mesh: &Mesh) -> ValidationReport {
        topology::validate(mesh, &self.config.tolerances)
    }

    /// Repair with the configured options
    pub fn repair(&self, mesh: &Mesh) -> RepairOutcome {
        self.repair_with(mesh, &self.config.repair)
    }

    /// Repair with explicit options
    pub fn repair_with(&self, mesh: &Mesh, options: &RepairOptions) -> RepairOutcome {
        topology::repair(mesh, options, &self.config.tolerances)
    }

    /// Partition a mesh's faces. Empty input gives an empty tree.
    pub fn build_tree(&self, mesh: &Mesh) -> BspTree {
        BspTree::from_mesh(mesh, &self.config.tolerances, &self.config.bsp)
    }

    pub fn union(&self, a: &Mesh, b: &Mesh) -> KernelResult<Mesh> {
        boolean::union(a, b, &self.config)
    }

    pub fn intersection(&self, a: &Mesh, b: &Mesh) -> KernelResult<Mesh> {
        boolean::intersection(a, b, &self.config)
    }

    pub fn difference(&self, a: &Mesh, b: &Mesh) -> KernelResult<Mesh> {
        boolean::difference(a, b, &self.config)
    }

    pub fn symmetric_difference(&self, a: &Mesh, b: &Mesh) -> KernelResult<Mesh> {
        boolean::symmetric_difference(a, b, &self.config)
    }

    pub fn boolean(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> KernelResult<Mesh> {
        boolean::compose(op, a, b, &self.config)
    }

    /// Surviving facets of an operation, tagged by operand
    pub fn fragments(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> KernelResult<Fragments> {
        boolean::fragments(op, a, b, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::error::KernelError;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_rejects_invalid_config() {
        let config = KernelConfig {
            tolerances: Tolerances {
                plane_epsilon: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(Kernel::new(config), Err(KernelError::Config { .. })));
    }

    #[test]
    fn test_kernel_round_trip() {
        let kernel = Kernel::default();
        let a = Primitive::unit_cube().to_mesh();
        let b = a.translated(Vector3::new(0.5, 0.5, 0.5));

        assert!(kernel.validate(&a).is_valid);
        let tree = kernel.build_tree(&a);
        assert_eq!(tree.node_count(), 6);

        let union = kernel.union(&a, &b).unwrap();
        let via_op = kernel.boolean(BooleanOp::Union, &a, &b).unwrap();
        assert_eq!(union, via_op);
        assert!(kernel.intersection(&a, &b).unwrap().triangle_count() > 0);
    }

    #[test]
    fn test_repair_with_overrides_config() {
        let kernel = Kernel::default();
        let mut mesh = Primitive::unit_cube().to_mesh();
        mesh.triangles.pop();

        assert_eq!(kernel.repair(&mesh).mesh.triangle_count(), 12);
        let untouched = kernel.repair_with(&mesh, &RepairOptions::default().with_fill_holes(false));
        assert_eq!(untouched.mesh.triangle_count(), 11);
    }
}
