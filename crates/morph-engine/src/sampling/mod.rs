//! Sampling sources: where candidate particle positions come from.
//!
//! Each loaded asset becomes one `SamplingStrategy`. Strategies are
//! immutable after construction; all randomness comes from the caller's `Rng`,
//! so a `Samples` iterator can be restarted by recreating it with the same seed.

pub mod mask;
pub mod mesh;

use glam::Vec3;

use crate::api::config::SourceKind;
use crate::core::rng::Rng;
use crate::error::{MorphError, Result};

pub use mask::{ImageMask, MaskParams, MaskSampler};
pub use mesh::{MeshSurfaceSampler, MeshTransform, TriangleMesh};

/// One drawn point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    /// Present for mesh sources only.
    pub normal: Option<Vec3>,
    /// Normalized depth in [0, 1) when the source synthesizes one.
    pub depth: Option<f32>,
}

/// Raw asset data delivered by the external loader.
#[derive(Debug, Clone)]
pub enum SourceData {
    Mesh(TriangleMesh),
    Mask(ImageMask),
    /// Points already projected by the loader.
    Points(Vec<Vec3>),
}

impl SourceData {
    fn label(&self) -> &'static str {
        match self {
            SourceData::Mesh(_) => "mesh",
            SourceData::Mask(_) => "mask",
            SourceData::Points(_) => "points",
        }
    }
}

/// Tagged sampling strategy, one engine for every source kind.
#[derive(Debug, Clone)]
pub enum SamplingStrategy {
    MeshSurface(MeshSurfaceSampler),
    ImageMask(MaskSampler),
    Points(Vec<Vec3>),
}

impl SamplingStrategy {
    /// Build a strategy from loaded data, applying the configured preprocessing.
    pub fn build(name: &str, kind: &SourceKind, data: SourceData) -> Result<Self> {
        match (kind, data) {
            (SourceKind::Mesh { transform }, SourceData::Mesh(mut mesh)) => {
                mesh.normalize(transform);
                Ok(SamplingStrategy::MeshSurface(MeshSurfaceSampler::new(&mesh, name)?))
            }
            (SourceKind::Mask { params }, SourceData::Mask(mask)) => Ok(
                SamplingStrategy::ImageMask(MaskSampler::new(&mask, params.clone(), name)?),
            ),
            (SourceKind::Points, SourceData::Points(points)) => {
                let points: Vec<Vec3> = points.into_iter().filter(|p| p.is_finite()).collect();
                if points.is_empty() {
                    return Err(MorphError::EmptySource { source_name: name.to_string() });
                }
                Ok(SamplingStrategy::Points(points))
            }
            (kind, data) => Err(MorphError::InvalidConfig(format!(
                "source `{}` is configured as {} but received {} data",
                name,
                kind.label(),
                data.label()
            ))),
        }
    }

    #[inline]
    pub fn sample(&self, rng: &mut Rng) -> SurfaceSample {
        match self {
            SamplingStrategy::MeshSurface(s) => s.sample(rng),
            SamplingStrategy::ImageMask(s) => s.sample(rng),
            SamplingStrategy::Points(points) => SurfaceSample {
                position: points[rng.next_int(points.len() as u32) as usize],
                normal: None,
                depth: None,
            },
        }
    }

    /// Lazy, endless sample sequence seeded with `seed`.
    pub fn samples(&self, seed: u64) -> Samples<'_> {
        Samples {
            strategy: self,
            seed,
            rng: Rng::new(seed),
        }
    }
}

/// Restartable iterator over samples of one strategy.
pub struct Samples<'a> {
    strategy: &'a SamplingStrategy,
    seed: u64,
    rng: Rng,
}

impl Samples<'_> {
    /// Rewind to the first sample.
    pub fn restart(&mut self) {
        self.rng = Rng::new(self.seed);
    }
}

impl Iterator for Samples<'_> {
    type Item = SurfaceSample;

    fn next(&mut self) -> Option<SurfaceSample> {
        Some(self.strategy.sample(&mut self.rng))
    }
}
