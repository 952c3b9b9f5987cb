// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - loading and saving meshes for the command-line harness
//!
//! The kernel API itself never touches files.

pub mod json;
pub mod stl;

use crate::geometry::Mesh;
use anyhow::{bail, Result};
use std::path::Path;

/// On-disk mesh formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Flat position and index buffers
    Json,
    /// Binary STL on write, ASCII or binary on read
    Stl,
}

impl MeshFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(MeshFormat::Json),
            Some("stl") => Ok(MeshFormat::Stl),
            _ => bail!("Unsupported mesh file extension: {:?}", path),
        }
    }
}

pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Json => json::load(path),
        MeshFormat::Stl => stl::load(path),
    }
}

pub fn save_mesh(path: impl AsRef<Path>, mesh: &Mesh) -> Result<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Json => json::save(path, mesh),
        MeshFormat::Stl => stl::save(path, mesh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("a.JSON")).unwrap(), MeshFormat::Json);
        assert_eq!(MeshFormat::from_path(Path::new("dir/b.stl")).unwrap(), MeshFormat::Stl);
        assert!(MeshFormat::from_path(Path::new("c.obj")).is_err());
        assert!(MeshFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_save_and_load_both_formats() -> Result<()> {
        let dir = TempDir::new()?;
        let cube = Primitive::unit_cube().to_mesh();

        for name in ["cube.json", "cube.stl"] {
            let path = dir.path().join(name);
            save_mesh(&path, &cube)?;
            let loaded = load_mesh(&path)?;
            assert_eq!(loaded.triangle_count(), 12, "{}", name);
        }
        Ok(())
    }
}
