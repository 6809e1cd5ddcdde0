//! Per-particle wave delay: staggers local progress by a static attribute so
//! the morph sweeps through the cloud instead of moving it all at once.

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};
use crate::extensions::easing::Easing;

/// Largest allowed delay. Keeps `1 - delay` away from zero so every
/// particle still finishes at `t = 1`.
pub const MAX_DELAY_LIMIT: f32 = 0.95;

/// Shape of the delay as a function of the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum WaveCurve {
    Linear,
    Power { exponent: f32 },
    Smoothstep,
}

impl WaveCurve {
    #[inline]
    fn apply(self, a: f32) -> f32 {
        match self {
            WaveCurve::Linear => a,
            WaveCurve::Power { exponent } => a.powf(exponent),
            WaveCurve::Smoothstep => Easing::Smoothstep.apply(a),
        }
    }
}

/// Which end of the attribute range moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveDirection {
    /// Low attribute (bottom) starts first.
    #[default]
    BottomUp,
    /// High attribute (top) starts first.
    TopDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub enabled: bool,
    /// Delay of the last particle to start, clamped to `MAX_DELAY_LIMIT`.
    pub max_delay: f32,
    pub curve: WaveCurve,
    pub direction: WaveDirection,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_delay: 0.4,
            curve: WaveCurve::Linear,
            direction: WaveDirection::BottomUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDelay {
    max_delay: f32,
    curve: WaveCurve,
    direction: WaveDirection,
}

impl WaveDelay {
    pub fn new(max_delay: f32, curve: WaveCurve, direction: WaveDirection) -> Result<Self> {
        if !max_delay.is_finite() || max_delay < 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "wave max_delay must be a finite value >= 0, got {}",
                max_delay
            )));
        }
        if let WaveCurve::Power { exponent } = curve {
            if !(exponent.is_finite() && exponent > 0.0) {
                return Err(MorphError::InvalidConfig(format!(
                    "wave power exponent must be > 0, got {}",
                    exponent
                )));
            }
        }
        if max_delay > MAX_DELAY_LIMIT {
            log::warn!("wave max_delay {} clamped to {}", max_delay, MAX_DELAY_LIMIT);
        }
        Ok(Self {
            max_delay: max_delay.min(MAX_DELAY_LIMIT),
            curve,
            direction,
        })
    }

    /// `None` when the wave is disabled.
    pub fn from_config(config: &WaveConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.max_delay, config.curve, config.direction).map(Some)
    }

    pub fn max_delay(&self) -> f32 {
        self.max_delay
    }

    /// Delay for a particle with normalized attribute `attribute` in [0, 1].
    /// Monotonic in the attribute and always below 1.
    #[inline]
    pub fn delay(&self, attribute: f32) -> f32 {
        let a = if attribute.is_nan() { 0.0 } else { attribute.clamp(0.0, 1.0) };
        let a = match self.direction {
            WaveDirection::BottomUp => a,
            WaveDirection::TopDown => 1.0 - a,
        };
        (self.max_delay * self.curve.apply(a)).clamp(0.0, MAX_DELAY_LIMIT)
    }
}

/// Local progress for a particle with precomputed `delay`.
/// Reaches 1 at `t = 1` for any `delay < 1`.
#[inline]
pub fn local_progress(delay: f32, t: f32) -> f32 {
    ((t - delay) / (1.0 - delay)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(curve: WaveCurve, direction: WaveDirection) -> WaveDelay {
        WaveDelay::new(0.6, curve, direction).unwrap()
    }

    #[test]
    fn disabled_config_yields_none() {
        assert!(WaveDelay::from_config(&WaveConfig::default()).unwrap().is_none());
    }

    #[test]
    fn delay_is_clamped_below_one() {
        let w = WaveDelay::new(5.0, WaveCurve::Linear, WaveDirection::BottomUp).unwrap();
        assert_eq!(w.max_delay(), MAX_DELAY_LIMIT);
        assert!(w.delay(1.0) < 1.0);
        assert!((local_progress(w.delay(1.0), 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(WaveDelay::new(-0.1, WaveCurve::Linear, WaveDirection::BottomUp).is_err());
        assert!(WaveDelay::new(0.5, WaveCurve::Power { exponent: 0.0 }, WaveDirection::BottomUp).is_err());
    }

    #[test]
    fn local_progress_is_monotonic_and_bounded() {
        let curves = [
            WaveCurve::Linear,
            WaveCurve::Power { exponent: 2.0 },
            WaveCurve::Smoothstep,
        ];
        for curve in curves {
            for direction in [WaveDirection::BottomUp, WaveDirection::TopDown] {
                let w = wave(curve, direction);
                for a in 0..=10 {
                    let d = w.delay(a as f32 / 10.0);
                    let mut prev = -1.0;
                    for step in 0..=100 {
                        let lp = local_progress(d, step as f32 / 100.0);
                        assert!((0.0..=1.0).contains(&lp));
                        assert!(lp >= prev, "{:?} {:?} a={} step={}", curve, direction, a, step);
                        prev = lp;
                    }
                    assert!((local_progress(d, 1.0) - 1.0).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn bottom_up_moves_low_particles_first() {
        let w = wave(WaveCurve::Linear, WaveDirection::BottomUp);
        let low = local_progress(w.delay(0.0), 0.3);
        let high = local_progress(w.delay(1.0), 0.3);
        assert!(low > high);
        assert_eq!(high, 0.0);

        let w = wave(WaveCurve::Linear, WaveDirection::TopDown);
        assert!(local_progress(w.delay(1.0), 0.3) > local_progress(w.delay(0.0), 0.3));
    }

    #[test]
    fn parses_tagged_curve() {
        let cfg: WaveConfig = serde_json::from_str(
            r#"{ "enabled": true, "curve": { "shape": "power", "exponent": 1.5 }, "direction": "top_down" }"#,
        )
        .unwrap();
        assert_eq!(cfg.curve, WaveCurve::Power { exponent: 1.5 });
        assert_eq!(cfg.direction, WaveDirection::TopDown);
        assert_eq!(cfg.max_delay, 0.4);
    }
}
