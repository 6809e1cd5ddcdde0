//! Column storage for per-particle state. Sized once; never resized.

use glam::{Quat, Vec3};

use crate::api::config::OrientationConfig;
use crate::core::rng::Rng;
use crate::systems::keyframes::{normalized_heights, KeyframeStore};
use crate::systems::wave::WaveDelay;

#[derive(Debug, Clone)]
pub struct ParticleState {
    /// Last written position. The only state hover and relaxation act on.
    pub current: Vec<Vec3>,
    /// Morph target from the previous tick.
    pub previous_target: Vec<Vec3>,
    /// Normalized height of the first keyframe, in [0, 1].
    pub attribute: Vec<f32>,
    /// Wave delay derived from `attribute`; all zero without a wave.
    pub delay: Vec<f32>,
    pub rotation: Vec<Quat>,
    pub scale: Vec<f32>,
}

/// Uniformly distributed random rotation.
fn random_rotation(rng: &mut Rng) -> Quat {
    let (u1, u2, u3) = (rng.next_f32(), rng.next_f32(), rng.next_f32());
    let (s1, s2) = ((1.0 - u1).sqrt(), u1.sqrt());
    let (a, b) = (std::f32::consts::TAU * u2, std::f32::consts::TAU * u3);
    Quat::from_xyzw(s1 * a.sin(), s1 * a.cos(), s2 * b.sin(), s2 * b.cos()).normalize()
}

impl ParticleState {
    pub fn new(
        store: &KeyframeStore,
        wave: Option<&WaveDelay>,
        orientation: &OrientationConfig,
        rng: &mut Rng,
    ) -> Self {
        let first = &store.shape(0).positions;
        let attribute = normalized_heights(first);
        let delay = match wave {
            Some(w) => attribute.iter().map(|&a| w.delay(a)).collect(),
            None => vec![0.0; attribute.len()],
        };
        let mut state = Self {
            current: first.clone(),
            previous_target: first.clone(),
            attribute,
            delay,
            rotation: vec![Quat::IDENTITY; first.len()],
            scale: vec![1.0; first.len()],
        };
        state.rerandomize_orientation(orientation, rng);
        state
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Reassign static rotation and scale. Positions are untouched.
    pub fn rerandomize_orientation(&mut self, orientation: &OrientationConfig, rng: &mut Rng) {
        for (rot, scale) in self.rotation.iter_mut().zip(self.scale.iter_mut()) {
            *rot = if orientation.random_rotation {
                random_rotation(rng)
            } else {
                Quat::IDENTITY
            };
            *scale = rng.range(orientation.scale_min, orientation.scale_max);
        }
    }
}
