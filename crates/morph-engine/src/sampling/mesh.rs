//! Area-weighted surface sampling over a triangulated mesh.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;
use crate::error::{MorphError, Result};
use super::SurfaceSample;

/// Triangles with an area at or below this are never sampled.
const MIN_TRIANGLE_AREA: f32 = 1e-12;

/// Indexed triangle mesh as handed over by the asset loader.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Build from flat `[x, y, z, ...]` positions and optional flat indices.
    /// Without indices every consecutive vertex triple is one triangle.
    pub fn from_flat(positions: &[f32], indices: Option<&[u32]>) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(MorphError::InvalidMesh(format!(
                "position array length {} is not a multiple of 3",
                positions.len()
            )));
        }
        let positions: Vec<Vec3> = positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();

        let triangles: Vec<[u32; 3]> = match indices {
            Some(idx) => {
                if idx.len() % 3 != 0 {
                    return Err(MorphError::InvalidMesh(format!(
                        "index array length {} is not a multiple of 3",
                        idx.len()
                    )));
                }
                if let Some(bad) = idx.iter().find(|&&i| i as usize >= positions.len()) {
                    return Err(MorphError::InvalidMesh(format!(
                        "index {} out of range for {} vertices",
                        bad,
                        positions.len()
                    )));
                }
                idx.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
            }
            None => {
                let tri_count = positions.len() / 3;
                (0..tri_count as u32)
                    .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                    .collect()
            }
        };

        Ok(Self { positions, triangles })
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        }))
    }

    /// Apply a normalization transform in place.
    pub fn normalize(&mut self, transform: &MeshTransform) {
        let center = match self.bounds() {
            Some((lo, hi)) if transform.recenter => (lo + hi) * 0.5,
            _ => Vec3::ZERO,
        };
        let rotation = transform.rotation();
        let offset = Vec3::from(transform.offset);
        for p in &mut self.positions {
            *p = rotation * ((*p - center) * transform.scale) + offset;
        }
    }
}

/// Normalization applied to a loaded mesh before it is sampled:
/// recenter on the bounding box, uniform scale, rotate X then Y, translate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshTransform {
    pub recenter: bool,
    pub scale: f32,
    /// Euler rotation in degrees; X is applied before Y.
    pub rotation_deg: [f32; 2],
    pub offset: [f32; 3],
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            recenter: true,
            scale: 1.0,
            rotation_deg: [0.0, 0.0],
            offset: [0.0, 0.0, 0.0],
        }
    }
}

impl MeshTransform {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_deg[1].to_radians())
            * Quat::from_rotation_x(self.rotation_deg[0].to_radians())
    }
}

#[derive(Debug, Clone, Copy)]
struct SampleTriangle {
    origin: Vec3,
    edge_b: Vec3,
    edge_c: Vec3,
    normal: Vec3,
}

/// Precomputed cumulative-area table over the non-degenerate triangles.
#[derive(Debug, Clone)]
pub struct MeshSurfaceSampler {
    triangles: Vec<SampleTriangle>,
    cumulative: Vec<f32>,
    total_area: f32,
}

impl MeshSurfaceSampler {
    /// Build the sampler. Fails with `EmptySource` when no triangle has area.
    pub fn new(mesh: &TriangleMesh, name: &str) -> Result<Self> {
        let mut triangles = Vec::with_capacity(mesh.triangles.len());
        let mut cumulative = Vec::with_capacity(mesh.triangles.len());
        let mut total_area = 0.0f32;

        for &[a, b, c] in &mesh.triangles {
            let (Some(&pa), Some(&pb), Some(&pc)) = (
                mesh.positions.get(a as usize),
                mesh.positions.get(b as usize),
                mesh.positions.get(c as usize),
            ) else {
                continue;
            };
            let edge_b = pb - pa;
            let edge_c = pc - pa;
            let cross = edge_b.cross(edge_c);
            let area = cross.length() * 0.5;
            if !area.is_finite() || area <= MIN_TRIANGLE_AREA {
                continue;
            }
            total_area += area;
            cumulative.push(total_area);
            triangles.push(SampleTriangle {
                origin: pa,
                edge_b,
                edge_c,
                normal: cross.normalize(),
            });
        }

        if triangles.is_empty() {
            return Err(MorphError::EmptySource { source_name: name.to_string() });
        }

        log::debug!(
            "mesh `{}`: {} of {} triangles samplable, area {:.4}",
            name,
            triangles.len(),
            mesh.triangles.len(),
            total_area
        );

        Ok(Self { triangles, cumulative, total_area })
    }

    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Index of the triangle selected by a uniform draw in [0, 1).
    fn pick(&self, u: f32) -> usize {
        let target = u * self.total_area;
        let idx = self.cumulative.partition_point(|&c| c <= target);
        idx.min(self.triangles.len() - 1)
    }

    pub fn sample(&self, rng: &mut Rng) -> SurfaceSample {
        let tri = &self.triangles[self.pick(rng.next_f32())];
        // sqrt keeps the density uniform instead of bunching at the origin vertex.
        let su = rng.next_f32().sqrt();
        let v = rng.next_f32();
        let position = tri.origin + tri.edge_b * (su * (1.0 - v)) + tri.edge_c * (su * v);
        SurfaceSample {
            position,
            normal: Some(tri.normal),
            depth: None,
        }
    }
}
