//! Pointer repulsion and relaxation.
//!
//! Works on the shadow position only. The morph target is never touched, so
//! releasing the pointer always lets particles settle back onto the morph.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// Distances below this are treated as this for the strength falloff.
pub const MIN_DISTANCE: f32 = 1e-4;

/// Below this squared distance the offset direction is undefined and
/// `FALLBACK_DIRECTION` is used instead.
const MIN_DIRECTION_SQ: f32 = 1e-8;

pub const FALLBACK_DIRECTION: Vec3 = Vec3::Y;

/// What a released particle relaxes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxSource {
    /// This frame's (wave-delayed) morph target.
    #[default]
    CurrentTarget,
    /// The target computed on the previous frame; trails the morph by one tick.
    PreviousTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverParams {
    /// When false, particles sit exactly on the morph target every tick.
    pub enabled: bool,
    /// Influence radius around the pointer hit, world units.
    pub radius: f32,
    /// Maximum displacement per tick, reached at the hit point.
    pub push: f32,
    /// Exponential approach coefficient in (0, 1).
    pub relax_rate: f32,
    /// Multiplier on the z component of the push, in [0, 1].
    pub z_damping: f32,
    pub relax_source: RelaxSource,
}

impl Default for HoverParams {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 0.4,
            push: 0.06,
            relax_rate: 0.1,
            z_damping: 0.6,
            relax_source: RelaxSource::CurrentTarget,
        }
    }
}

impl HoverParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MorphError::DegenerateRadius(self.radius));
        }
        if !(self.push.is_finite() && self.push >= 0.0) {
            return Err(MorphError::InvalidConfig(format!(
                "hover push must be >= 0, got {}",
                self.push
            )));
        }
        if !(self.relax_rate > 0.0 && self.relax_rate < 1.0) {
            return Err(MorphError::InvalidConfig(format!(
                "relax rate must be in (0, 1), got {}",
                self.relax_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.z_damping) {
            return Err(MorphError::InvalidConfig(format!(
                "z damping must be in [0, 1], got {}",
                self.z_damping
            )));
        }
        Ok(())
    }
}

/// One relaxation step toward `target`.
#[inline]
pub fn relax(current: Vec3, target: Vec3, rate: f32) -> Vec3 {
    current + (target - current) * rate
}

/// Advance one particle by one tick.
///
/// Inside the radius the particle is pushed away from `pointer`; everywhere
/// else (and with no pointer) it relaxes toward `relax_target`.
#[inline]
pub fn perturb(current: Vec3, relax_target: Vec3, pointer: Option<Vec3>, params: &HoverParams) -> Vec3 {
    let Some(hit) = pointer else {
        return relax(current, relax_target, params.relax_rate);
    };

    let d = current - hit;
    let dist_sq = d.length_squared();
    if dist_sq >= params.radius * params.radius {
        return relax(current, relax_target, params.relax_rate);
    }

    let dist = dist_sq.sqrt().max(MIN_DISTANCE);
    let strength = (1.0 - dist / params.radius).max(0.0) * params.push;
    let dir = if dist_sq > MIN_DIRECTION_SQ {
        d / dist_sq.sqrt()
    } else {
        FALLBACK_DIRECTION
    };
    let mut offset = dir * strength;
    offset.z *= params.z_damping;
    current + offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HoverParams {
        HoverParams {
            enabled: true,
            radius: 1.0,
            push: 0.2,
            relax_rate: 0.1,
            z_damping: 0.6,
            relax_source: RelaxSource::CurrentTarget,
        }
    }

    #[test]
    fn validate_rejects_degenerate_radius() {
        for radius in [0.0, -1.0, f32::NAN] {
            let p = HoverParams { radius, ..params() };
            assert!(matches!(p.validate(), Err(MorphError::DegenerateRadius(_))));
        }
        let p = HoverParams { relax_rate: 1.0, ..params() };
        assert!(matches!(p.validate(), Err(MorphError::InvalidConfig(_))));
        assert!(params().validate().is_ok());
    }

    #[test]
    fn no_pointer_relaxes_monotonically() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let mut cur = Vec3::ZERO;
        let mut prev = cur.distance(target);
        for _ in 0..100 {
            cur = perturb(cur, target, None, &params());
            let d = cur.distance(target);
            assert!(d <= prev);
            prev = d;
        }
    }

    #[test]
    fn repulsion_pushes_away_and_is_bounded() {
        let p = params();
        let hit = Vec3::ZERO;
        for x in [0.01f32, 0.1, 0.5, 0.99] {
            let cur = Vec3::new(x, 0.0, 0.0);
            let next = perturb(cur, Vec3::ZERO, Some(hit), &p);
            assert!(next.x > cur.x, "x={} should be pushed outward", x);
            assert!((next - cur).length() <= p.push + 1e-6);
        }
    }

    #[test]
    fn pointer_on_particle_is_finite() {
        let p = params();
        let cur = Vec3::new(0.3, 0.3, 0.3);
        let next = perturb(cur, Vec3::ZERO, Some(cur), &p);
        assert!(next.is_finite());
        let offset = next - cur;
        assert!((offset.normalize() - FALLBACK_DIRECTION).length() < 1e-5);
        assert!(offset.length() <= p.push + 1e-6);
    }

    #[test]
    fn z_push_is_damped() {
        let p = params();
        let cur = Vec3::new(0.0, 0.0, 0.5);
        let next = perturb(cur, Vec3::ZERO, Some(Vec3::ZERO), &p);
        let expected = (1.0 - 0.5) * p.push * p.z_damping;
        assert!((next.z - cur.z - expected).abs() < 1e-6);
    }

    #[test]
    fn outside_radius_relaxes() {
        let p = params();
        let cur = Vec3::new(5.0, 0.0, 0.0);
        let next = perturb(cur, Vec3::ZERO, Some(Vec3::ZERO), &p);
        assert!((next - relax(cur, Vec3::ZERO, p.relax_rate)).length() < 1e-6);
    }

    #[test]
    fn release_returns_within_geometric_bound() {
        let p = params();
        let target = Vec3::new(0.2, 0.0, 0.0);
        let mut cur = target;
        for _ in 0..20 {
            cur = perturb(cur, target, Some(Vec3::new(0.25, 0.05, 0.0)), &p);
        }
        let initial = cur.distance(target);
        assert!(initial > 0.0);
        for _ in 0..50 {
            cur = perturb(cur, target, None, &p);
        }
        let bound = initial * (1.0 - p.relax_rate).powi(50) + 1e-6;
        assert!(cur.distance(target) <= bound);
    }
}
