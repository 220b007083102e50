// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! sphere: the fixed test geometry the bridge samples an imported texture onto.

use std::f32::consts::PI;

use crate::primebuf_utils::PrimebufError;
use crate::primebuf_utils::PrimebufResult;

/// Number of slices of the sample sphere. 63 slices keep every index within
/// a 16-bit index buffer.
pub const SPHERE_SLICES: u32 = 63;

/// A procedural sphere with per-vertex texture coordinates, built once and
/// reused across frames. Kept as plain arrays because the draw call supplies
/// client-side attribute pointers.
pub struct SphereMesh {
    vertices: Vec<f32>,
    texcoords: Vec<f32>,
    indices: Vec<u16>,
}

impl SphereMesh {
    /// Builds a sphere of `slices` horizontal and vertical subdivisions.
    pub fn new(slices: u32, radius: f32) -> PrimebufResult<SphereMesh> {
        if slices < 2 {
            return Err(PrimebufError::SpecViolation("sphere needs at least 2 slices"));
        }

        let rings = slices + 1;
        let vertex_count = (rings * rings) as usize;
        checked_range!(vertex_count; <= u16::MAX as usize + 1)?;

        let mut vertices = Vec::with_capacity(3 * vertex_count);
        let mut indices = Vec::with_capacity((6 * slices * (slices - 1)) as usize);

        for j in 0..rings {
            let hor_angle = PI * j as f32 / slices as f32;
            let z = radius * hor_angle.cos();
            let ring_radius = radius * hor_angle.sin();

            for i in 0..rings {
                let ver_angle = 2.0 * PI * i as f32 / slices as f32;
                vertices.push(ring_radius * ver_angle.cos());
                vertices.push(z);
                vertices.push(ring_radius * ver_angle.sin());

                if i > 0 && j > 0 {
                    let a = (rings * j + i) as u16;
                    let b = (rings * j + i - 1) as u16;
                    let c = (rings * (j - 1) + i - 1) as u16;
                    let d = (rings * (j - 1) + i) as u16;

                    if j == slices {
                        // Bottom cap, one triangle per slice.
                        indices.extend_from_slice(&[a, d, c]);
                    } else if j == 1 {
                        // Top cap.
                        indices.extend_from_slice(&[a, c, b]);
                    } else {
                        indices.extend_from_slice(&[a, c, b, a, d, c]);
                    }
                }
            }
        }

        let mut texcoords = Vec::with_capacity(2 * vertex_count);
        for j in 0..rings {
            for i in (0..rings).rev() {
                let u = i as f32 / slices as f32;
                texcoords.push(1.0 - u);
                texcoords.push(j as f32 / slices as f32);
            }
        }

        Ok(SphereMesh {
            vertices,
            texcoords,
            indices,
        })
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn texcoords(&self) -> &[f32] {
        &self.texcoords
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of indices the draw call covers.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_counts() {
        let n = SPHERE_SLICES;
        let mesh = SphereMesh::new(n, 1.0).unwrap();

        let vertex_count = ((n + 1) * (n + 1)) as usize;
        assert_eq!(mesh.vertices().len(), 3 * vertex_count);
        assert_eq!(mesh.texcoords().len(), 2 * vertex_count);
        assert_eq!(mesh.index_count(), (6 * n * (n - 1)) as usize);
    }

    #[test]
    fn indices_in_bounds() {
        let n = SPHERE_SLICES;
        let mesh = SphereMesh::new(n, 1.0).unwrap();

        let vertex_count = ((n + 1) * (n + 1)) as u16;
        assert!(mesh.indices().iter().all(|i| *i < vertex_count));
    }

    #[test]
    fn texcoords_normalized() {
        let mesh = SphereMesh::new(SPHERE_SLICES, 1.0).unwrap();
        assert!(mesh.texcoords().iter().all(|t| (0.0..=1.0).contains(t)));
    }

    #[test]
    fn oversized_mesh_rejected() {
        assert!(SphereMesh::new(512, 1.0).is_err());
    }
}
