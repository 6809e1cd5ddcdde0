use serde::{Deserialize, Serialize};

use crate::api::types::Color;
use crate::error::{MorphError, Result};
use crate::renderer::camera::OrbitConfig;
use crate::sampling::{MaskParams, MeshTransform};
use crate::systems::hover::HoverParams;
use crate::systems::keyframes::{validate_shapes, ColorRule, ShapeConfig, ShapeKind};
use crate::systems::phase::{PhaseConfig, PhaseMap};
use crate::systems::wave::{WaveConfig, WaveDelay};

/// Kind of asset a source expects, plus its preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Triangulated surface, normalized before area-weighted sampling.
    Mesh {
        #[serde(default)]
        transform: MeshTransform,
    },
    /// Thresholded image projected onto a plane.
    Mask {
        #[serde(default)]
        params: MaskParams,
    },
    /// Points already projected by the loader.
    Points,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Mesh { .. } => "mesh",
            SourceKind::Mask { .. } => "mask",
            SourceKind::Points => "points",
        }
    }
}

/// A named asset the engine waits for before initializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
}

/// Static per-particle orientation and size, assigned once at init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub scale_min: f32,
    pub scale_max: f32,
    pub random_rotation: bool,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            scale_min: 1.0,
            scale_max: 1.0,
            random_rotation: true,
        }
    }
}

/// Configuration for the engine, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for every random draw (sampling, scatter, colors, orientation).
    pub seed: u64,
    /// Number of particles N (default: 100 000).
    pub particle_count: usize,
    pub sources: Vec<SourceConfig>,
    /// Keyframe shapes in morph order.
    pub shapes: Vec<ShapeConfig>,
    pub phases: PhaseConfig,
    pub wave: WaveConfig,
    pub hover: HoverParams,
    pub orientation: OrientationConfig,
    pub camera: OrbitConfig,
}

impl Default for EngineConfig {
    /// Brain → explode → fall → bulb, the scene the engine was built for.
    fn default() -> Self {
        let color = |r: u8, g: u8, b: u8| Color([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]);
        let cyan = color(0x6b, 0xe8, 0xff);
        let blue = color(0x33, 0x88, 0xff);
        let upright = |scale: f32| MeshTransform {
            recenter: true,
            scale,
            rotation_deg: [270.0, 270.0],
            offset: [0.0, 0.0, 0.0],
        };

        Self {
            seed: 42,
            particle_count: 100_000,
            sources: vec![
                SourceConfig {
                    name: "brain".into(),
                    kind: SourceKind::Mesh { transform: upright(0.8) },
                },
                SourceConfig {
                    name: "bulb".into(),
                    kind: SourceKind::Mesh { transform: upright(15.0) },
                },
            ],
            shapes: vec![
                ShapeConfig {
                    name: "brain".into(),
                    kind: ShapeKind::Sampled { source: "brain".into(), offset: [0.0, 0.55, 0.0] },
                    color: ColorRule::Gradient { from: cyan, to: blue },
                },
                ShapeConfig {
                    name: "explode".into(),
                    kind: ShapeKind::Scatter {
                        base: "brain".into(),
                        spread: [2.0, 2.0, 2.0],
                        height_scaled: false,
                        // Scatter around the raw sample, not the lifted brain.
                        offset: [0.0, -0.55, 0.0],
                    },
                    color: ColorRule::Tint { toward: blue, min: 0.0, max: 0.5 },
                },
                ShapeConfig {
                    name: "down".into(),
                    kind: ShapeKind::Collapse {
                        base: "brain".into(),
                        squash: 0.3,
                        floor: -2.3,
                        drop: 0.5,
                    },
                    color: ColorRule::Tint { toward: blue, min: 0.3, max: 0.3 },
                },
                ShapeConfig {
                    name: "bulb".into(),
                    kind: ShapeKind::Sampled { source: "bulb".into(), offset: [0.0, -1.5, 0.0] },
                    color: ColorRule::Gradient { from: blue, to: blue },
                },
            ],
            phases: PhaseConfig::default(),
            wave: WaveConfig::default(),
            hover: HoverParams::default(),
            orientation: OrientationConfig::default(),
            camera: OrbitConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every construction-time constraint.
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(MorphError::InvalidConfig("particle count must be > 0".into()));
        }
        if self.particle_count > u32::MAX as usize {
            return Err(MorphError::InvalidConfig(format!(
                "particle count {} exceeds u32 range",
                self.particle_count
            )));
        }
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(MorphError::InvalidConfig(format!("duplicate source `{}`", source.name)));
            }
        }
        let names: Vec<&str> = self.sources.iter().map(|s| s.name.as_str()).collect();
        validate_shapes(&self.shapes, &names)?;

        let phases = PhaseMap::from_config(&self.phases)?;
        if phases.keyframe_count() != self.shapes.len() {
            return Err(MorphError::InvalidPhases(format!(
                "{} boundaries chain {} keyframes, but {} shapes are configured",
                self.phases.boundaries.len(),
                phases.keyframe_count(),
                self.shapes.len()
            )));
        }
        WaveDelay::from_config(&self.wave)?;
        self.hover.validate()?;

        let o = &self.orientation;
        if !(o.scale_min.is_finite() && o.scale_max.is_finite() && o.scale_min >= 0.0 && o.scale_min <= o.scale_max) {
            return Err(MorphError::InvalidConfig(format!(
                "scale range [{}, {}] is invalid",
                o.scale_min, o.scale_max
            )));
        }
        self.camera.validate()
    }
}
