pub mod morph;
pub mod particles;
pub mod rng;
