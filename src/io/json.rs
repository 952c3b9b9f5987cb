// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON flat-buffer meshes: `{"positions": [...], "indices": [...]}`

use crate::geometry::{Mesh, MeshBuffers};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn from_str(content: &str) -> Result<Mesh> {
    let buffers: MeshBuffers = serde_json::from_str(content).context("Invalid mesh JSON")?;
    let mesh = Mesh::from_buffers(&buffers.positions, &buffers.indices)?;
    Ok(mesh)
}

pub fn to_string(mesh: &Mesh) -> Result<String> {
    serde_json::to_string_pretty(&mesh.to_buffers()).context("Failed to serialize mesh")
}

pub fn load(path: &Path) -> Result<Mesh> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh file: {:?}", path))?;
    from_str(&content).with_context(|| format!("Failed to parse mesh file: {:?}", path))
}

pub fn save(path: &Path, mesh: &Mesh) -> Result<()> {
    fs::write(path, to_string(mesh)?)
        .with_context(|| format!("Failed to write mesh file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_json_keeps_exact_buffers() -> Result<()> {
        let cube = Primitive::unit_cube().to_mesh();
        let loaded = from_str(&to_string(&cube)?)?;
        assert_eq!(loaded, cube);
        Ok(())
    }

    #[test]
    fn test_rejects_ragged_positions() {
        let err = from_str(r#"{"positions": [0.0, 1.0], "indices": []}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid mesh buffers"));
    }
}
