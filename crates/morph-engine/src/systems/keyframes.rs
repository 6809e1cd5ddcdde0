//! Keyframe shapes: one position and color per particle per shape.
//!
//! Each shape draws its own N samples; nothing ties particle `i` of one shape
//! to particle `i` of another beyond the index. Derived shapes (scatter,
//! collapse) start from an earlier shape's positions.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::api::types::Color;
use crate::core::rng::Rng;
use crate::error::{MorphError, Result};
use crate::sampling::SamplingStrategy;

/// How a shape's positions are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Direct samples from a named source, translated by `offset`.
    Sampled {
        source: String,
        #[serde(default)]
        offset: [f32; 3],
    },
    /// Base shape plus a random vector in `[-spread/2, spread/2]` per axis,
    /// translated by `offset`. With `height_scaled`, higher particles scatter further.
    Scatter {
        base: String,
        spread: [f32; 3],
        #[serde(default)]
        height_scaled: bool,
        #[serde(default)]
        offset: [f32; 3],
    },
    /// Base shape squashed horizontally and dropped to `floor - rand * drop`.
    Collapse {
        base: String,
        squash: f32,
        floor: f32,
        drop: f32,
    },
}

impl ShapeKind {
    fn base(&self) -> Option<&str> {
        match self {
            ShapeKind::Sampled { .. } => None,
            ShapeKind::Scatter { base, .. } | ShapeKind::Collapse { base, .. } => Some(base),
        }
    }
}

/// How a shape's colors are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ColorRule {
    /// Lerp between two endpoints by a random per-particle weight.
    Gradient { from: Color, to: Color },
    /// Lerp by the sample's depth, or by normalized height when the source has none.
    Depth { from: Color, to: Color },
    /// The base shape's color lerped toward `toward` by a weight in `[min, max]`.
    Tint { toward: Color, min: f32, max: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: ShapeKind,
    pub color: ColorRule,
}

/// One complete keyframe.
#[derive(Debug, Clone)]
pub struct Keyframe {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

#[derive(Debug, Clone)]
pub struct KeyframeStore {
    count: usize,
    shapes: Vec<Keyframe>,
}

/// Normalized height in [0, 1] per position; 0.5 everywhere for a flat set.
pub fn normalized_heights(positions: &[Vec3]) -> Vec<f32> {
    let (lo, hi) = positions
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let span = hi - lo;
    if !(span.is_finite() && span > f32::EPSILON) {
        return vec![0.5; positions.len()];
    }
    positions.iter().map(|p| (p.y - lo) / span).collect()
}

/// Check shape references before anything is sampled.
pub fn validate_shapes(shapes: &[ShapeConfig], source_names: &[&str]) -> Result<()> {
    if shapes.len() < 2 {
        return Err(MorphError::InvalidConfig(format!(
            "need at least 2 keyframe shapes, got {}",
            shapes.len()
        )));
    }
    for (k, shape) in shapes.iter().enumerate() {
        if shapes[..k].iter().any(|s| s.name == shape.name) {
            return Err(MorphError::InvalidConfig(format!("duplicate shape `{}`", shape.name)));
        }
        match &shape.kind {
            ShapeKind::Sampled { source, .. } => {
                if !source_names.contains(&source.as_str()) {
                    return Err(MorphError::InvalidConfig(format!(
                        "shape `{}` samples unknown source `{}`",
                        shape.name, source
                    )));
                }
                if matches!(shape.color, ColorRule::Tint { .. }) {
                    return Err(MorphError::InvalidConfig(format!(
                        "shape `{}` has no base shape to tint",
                        shape.name
                    )));
                }
            }
            ShapeKind::Scatter { base, .. } | ShapeKind::Collapse { base, .. } => {
                if !shapes[..k].iter().any(|s| &s.name == base) {
                    return Err(MorphError::InvalidConfig(format!(
                        "shape `{}` derives from `{}`, which is not an earlier shape",
                        shape.name, base
                    )));
                }
            }
        }
        if let ColorRule::Tint { min, max, .. } = shape.color {
            if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
                return Err(MorphError::InvalidConfig(format!(
                    "shape `{}` tint range [{}, {}] must lie in [0, 1]",
                    shape.name, min, max
                )));
            }
        }
    }
    Ok(())
}

impl KeyframeStore {
    /// Wrap prebuilt keyframes. Every keyframe must hold `count` entries.
    pub fn from_keyframes(count: usize, shapes: Vec<Keyframe>) -> Result<Self> {
        if count == 0 {
            return Err(MorphError::InvalidConfig("particle count must be > 0".into()));
        }
        if shapes.len() < 2 {
            return Err(MorphError::InvalidConfig(format!(
                "need at least 2 keyframes, got {}",
                shapes.len()
            )));
        }
        if let Some(bad) = shapes
            .iter()
            .find(|s| s.positions.len() != count || s.colors.len() != count)
        {
            return Err(MorphError::InvalidConfig(format!(
                "keyframe `{}` has {} positions / {} colors, expected {}",
                bad.name,
                bad.positions.len(),
                bad.colors.len(),
                count
            )));
        }
        Ok(Self { count, shapes })
    }

    /// Sample every configured shape.
    pub fn build(
        count: usize,
        shapes: &[ShapeConfig],
        sources: &HashMap<String, SamplingStrategy>,
        rng: &mut Rng,
    ) -> Result<Self> {
        let names: Vec<&str> = sources.keys().map(String::as_str).collect();
        validate_shapes(shapes, &names)?;

        let mut built: Vec<Keyframe> = Vec::with_capacity(shapes.len());
        for (k, shape) in shapes.iter().enumerate() {
            let mut rng = rng.fork(k as u64);
            let base = shape
                .kind
                .base()
                .and_then(|name| built.iter().find(|s| s.name == name));

            let mut depth: Option<Vec<f32>> = None;
            let positions: Vec<Vec3> = match (&shape.kind, base) {
                (ShapeKind::Sampled { source, offset }, _) => {
                    let strategy = sources.get(source).ok_or_else(|| {
                        MorphError::InvalidConfig(format!("source `{}` not loaded", source))
                    })?;
                    let offset = Vec3::from(*offset);
                    let mut depths = Vec::with_capacity(count);
                    let mut has_depth = true;
                    let positions = (0..count)
                        .map(|_| {
                            let s = strategy.sample(&mut rng);
                            has_depth &= s.depth.is_some();
                            depths.push(s.depth.unwrap_or(0.0));
                            s.position + offset
                        })
                        .collect();
                    if has_depth {
                        depth = Some(depths);
                    }
                    positions
                }
                (ShapeKind::Scatter { spread, height_scaled, offset, .. }, Some(base)) => {
                    let spread = Vec3::from(*spread);
                    let offset = Vec3::from(*offset);
                    let heights = normalized_heights(&base.positions);
                    base.positions
                        .iter()
                        .zip(&heights)
                        .map(|(&p, &h)| {
                            let factor = if *height_scaled { 0.5 + h } else { 1.0 };
                            p + offset + rng.centered_vec3(spread) * factor
                        })
                        .collect()
                }
                (ShapeKind::Collapse { squash, floor, drop, .. }, Some(base)) => base
                    .positions
                    .iter()
                    .map(|p| Vec3::new(p.x * squash, floor - rng.next_f32() * drop, p.z * squash))
                    .collect(),
                _ => {
                    return Err(MorphError::InvalidConfig(format!(
                        "shape `{}` has no base",
                        shape.name
                    )))
                }
            };

            let colors: Vec<Vec3> = match &shape.color {
                ColorRule::Gradient { from, to } => {
                    let (from, to) = (from.to_vec3(), to.to_vec3());
                    (0..count).map(|_| from.lerp(to, rng.next_f32())).collect()
                }
                ColorRule::Depth { from, to } => {
                    let (from, to) = (from.to_vec3(), to.to_vec3());
                    let weights = depth.unwrap_or_else(|| normalized_heights(&positions));
                    weights.iter().map(|&w| from.lerp(to, w)).collect()
                }
                ColorRule::Tint { toward, min, max } => {
                    let toward = toward.to_vec3();
                    let base = base.ok_or_else(|| {
                        MorphError::InvalidConfig(format!("shape `{}` has no base to tint", shape.name))
                    })?;
                    base.colors
                        .iter()
                        .map(|&c| c.lerp(toward, rng.range(*min, *max)))
                        .collect()
                }
            };

            log::debug!("keyframe `{}` built with {} particles", shape.name, count);
            built.push(Keyframe {
                name: shape.name.clone(),
                positions,
                colors,
            });
        }

        Self::from_keyframes(count, built)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shape(&self, k: usize) -> &Keyframe {
        &self.shapes[k]
    }

    pub fn shape_by_name(&self, name: &str) -> Option<&Keyframe> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// Position and color of particle `i` at `weight` along leg `leg`.
    #[inline]
    pub fn blend(&self, i: usize, leg: usize, weight: f32) -> (Vec3, Vec3) {
        let (a, b) = (&self.shapes[leg], &self.shapes[leg + 1]);
        (
            a.positions[i].lerp(b.positions[i], weight),
            a.colors[i].lerp(b.colors[i], weight),
        )
    }
}
