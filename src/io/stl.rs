// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::error::KernelError;
use crate::geometry::{Mesh, Triangle};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Read an STL stream. stl_io already shares identical corner positions.
pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Failed to read STL contents")?;

    if let Some(bad) = stl.vertices.iter().position(|v| [v[0], v[1], v[2]].iter().any(|c| !c.is_finite())) {
        return Err(KernelError::InvalidBuffers {
            reason: format!("STL vertex {} has a non-finite coordinate", bad),
        }
        .into());
    }

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let triangles = stl
        .faces
        .iter()
        .map(|face| Triangle::new(face.vertices))
        .collect();

    Ok(Mesh {
        vertices,
        triangles,
    })
}

/// Write binary STL with normals computed from each face's winding
pub fn write<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .filter(|tri| mesh.triangle_in_range(tri))
        .map(|tri| {
            let normal = tri.face_normal(mesh);
            let [v0, v1, v2] = mesh.triangle_positions(tri);
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                    StlVertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                    StlVertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter()).context("Failed to write STL")?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Mesh> {
    let mut file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    read(&mut file).with_context(|| format!("Failed to parse STL file: {:?}", path))
}

pub fn save(path: &Path, mesh: &Mesh) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, mesh)?;
    writer.flush().context("Failed to flush STL file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use std::io::Cursor;

    #[test]
    fn test_cube_survives_stl() -> Result<()> {
        let cube = Primitive::unit_cube().to_mesh();
        let mut buffer = Vec::new();
        write(&mut buffer, &cube)?;

        let loaded = read(&mut Cursor::new(buffer))?;
        assert_eq!(loaded.triangle_count(), 12);
        assert_eq!(loaded.vertex_count(), 8);
        assert!((loaded.signed_volume() - 1.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_rejects_non_finite_vertex() -> Result<()> {
        let mut cube = Primitive::unit_cube().to_mesh();
        cube.vertices[5].y = f64::NAN;
        let mut buffer = Vec::new();
        write(&mut buffer, &cube)?;

        let err = read(&mut Cursor::new(buffer)).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
        Ok(())
    }
}
