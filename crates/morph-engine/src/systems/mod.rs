pub mod hover;
pub mod keyframes;
pub mod phase;
pub mod transform;
pub mod wave;
