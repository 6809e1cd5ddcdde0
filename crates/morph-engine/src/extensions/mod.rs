// extensions/mod.rs
//
// Shaping curves shared by the phase mapper and the wave delay.
// Kept apart from the systems so configs can name a curve without
// pulling in any per-particle state.

pub mod easing;

pub use easing::Easing;
