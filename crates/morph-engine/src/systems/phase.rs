//! Scroll-to-phase mapping.
//!
//! Boundaries `b_0 = 0 < b_1 < ... < b_L = 1` split progress into `L` legs;
//! leg `j` morphs keyframe `j` into keyframe `j + 1`. Legs are chained: the
//! destination of one leg is the source of the next, so only the active leg
//! matters for any given `t`.

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};
use crate::extensions::easing::Easing;

/// Serializable phase layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Leg boundaries including the leading 0 and trailing 1.
    pub boundaries: Vec<f32>,
    /// Per-leg easing. Empty means linear for every leg.
    pub easing: Vec<Easing>,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            boundaries: vec![0.0, 0.33, 0.66, 1.0],
            easing: Vec::new(),
        }
    }
}

/// Active leg and its eased weight for one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPosition {
    pub leg: usize,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub struct PhaseMap {
    boundaries: Vec<f32>,
    easing: Vec<Easing>,
}

/// Map arbitrary host input onto [0, 1]; NaN becomes 0.
#[inline]
pub fn sanitize_progress(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

impl PhaseMap {
    pub fn new(boundaries: Vec<f32>, easing: Vec<Easing>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(MorphError::InvalidPhases(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(MorphError::InvalidPhases("boundaries must be finite".into()));
        }
        if boundaries[0] != 0.0 || boundaries[boundaries.len() - 1] != 1.0 {
            return Err(MorphError::InvalidPhases(format!(
                "boundaries must start at 0 and end at 1, got {:?}",
                boundaries
            )));
        }
        if let Some(w) = boundaries.windows(2).find(|w| w[1] <= w[0]) {
            return Err(MorphError::InvalidPhases(format!(
                "boundaries must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        let legs = boundaries.len() - 1;
        let easing = match easing.len() {
            0 => vec![Easing::Linear; legs],
            n if n == legs => easing,
            n => {
                return Err(MorphError::InvalidPhases(format!(
                    "{} easing entries for {} legs",
                    n, legs
                )))
            }
        };
        Ok(Self { boundaries, easing })
    }

    pub fn from_config(config: &PhaseConfig) -> Result<Self> {
        Self::new(config.boundaries.clone(), config.easing.clone())
    }

    /// Evenly spaced linear legs.
    pub fn uniform(legs: usize) -> Self {
        let legs = legs.max(1);
        let boundaries = (0..=legs).map(|i| i as f32 / legs as f32).collect();
        Self {
            boundaries,
            easing: vec![Easing::Linear; legs],
        }
    }

    pub fn leg_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Number of keyframes this map chains together.
    pub fn keyframe_count(&self) -> usize {
        self.boundaries.len()
    }

    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    /// Raw (uneased) weight of leg `j`: 0 before it, 1 after it, linear inside.
    pub fn leg_weight(&self, leg: usize, t: f32) -> f32 {
        let t = sanitize_progress(t);
        let (start, end) = (self.boundaries[leg], self.boundaries[leg + 1]);
        if t >= end {
            1.0
        } else if t < start {
            0.0
        } else {
            (t - start) / (end - start)
        }
    }

    /// Fill `out` with every leg's raw weight. `out` must hold `leg_count()` entries.
    pub fn weights(&self, t: f32, out: &mut [f32]) {
        for (leg, w) in out.iter_mut().enumerate().take(self.leg_count()) {
            *w = self.leg_weight(leg, t);
        }
    }

    /// The active leg for `t` (boundary values belong to the following leg,
    /// `t = 1` to the last leg at full weight) and its eased weight.
    #[inline]
    pub fn locate(&self, t: f32) -> LegPosition {
        let t = sanitize_progress(t);
        let interior = &self.boundaries[1..self.boundaries.len() - 1];
        let leg = interior.partition_point(|&b| b <= t);
        let (start, end) = (self.boundaries[leg], self.boundaries[leg + 1]);
        let raw = ((t - start) / (end - start)).clamp(0.0, 1.0);
        LegPosition {
            leg,
            weight: self.easing[leg].apply(raw),
        }
    }
}
