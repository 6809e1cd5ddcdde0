pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;
pub mod sampling;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::config::{EngineConfig, OrientationConfig, SourceConfig, SourceKind};
pub use api::engine::{EngineStatus, MorphEngine};
pub use api::subscriptions::{SubscriptionId, SubscriptionKind, Subscriptions};
pub use api::types::{Color, WorldPoint};
pub use core::morph::ParticleMorph;
pub use core::particles::ParticleState;
pub use core::rng::Rng;
pub use error::{MorphError, Result};
pub use renderer::instance::{ParticleBuffers, ParticleInstance};
pub use renderer::camera::{CameraUniform, OrbitCamera, OrbitConfig};
pub use input::queue::{FrameInput, InputEvent, InputState};
pub use assets::registry::SourceRegistry;
pub use bridge::protocol::ProtocolLayout;
pub use sampling::{
    ImageMask, MaskParams, MaskSampler, MeshSurfaceSampler, MeshTransform,
    SamplingStrategy, SourceData, SurfaceSample, TriangleMesh,
};
pub use systems::hover::{HoverParams, RelaxSource};
pub use systems::keyframes::{ColorRule, Keyframe, KeyframeStore, ShapeConfig, ShapeKind};
pub use systems::phase::{LegPosition, PhaseConfig, PhaseMap};
pub use systems::wave::{WaveConfig, WaveCurve, WaveDelay, WaveDirection};

pub use extensions::Easing;
