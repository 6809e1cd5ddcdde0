pub mod instance;
pub mod camera;

pub use instance::{ParticleBuffers, ParticleInstance};
pub use camera::{CameraUniform, OrbitCamera, OrbitConfig};
