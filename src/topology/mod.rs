// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology module - edge adjacency, validation and repair

mod adjacency;
mod holes;
mod repair;
mod validate;
mod winding;

pub use adjacency::{isolated_vertices, normalize_edge, Edge, EdgeMap, EdgeUse};
pub use holes::{fill_holes, fill_loop, trace_boundaries, BoundaryLoop, BoundaryScan, HoleFillSummary};
pub use repair::{repair, RepairFix, RepairOptions, RepairOutcome, RepairReport};
pub use validate::{validate, MeshStats, TopologyIssue, ValidationReport};
pub use winding::{count_components, propagate_winding, WindingSummary};
