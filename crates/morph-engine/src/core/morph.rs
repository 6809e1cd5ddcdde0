//! An initialized particle morph: keyframes, particle columns and output buffers.

use glam::Vec3;

use crate::api::config::OrientationConfig;
use crate::core::particles::ParticleState;
use crate::core::rng::Rng;
use crate::error::{MorphError, Result};
use crate::renderer::instance::ParticleBuffers;
use crate::systems::hover::HoverParams;
use crate::systems::keyframes::KeyframeStore;
use crate::systems::phase::PhaseMap;
use crate::systems::transform::{update_particles, write_initial, MorphStep};
use crate::systems::wave::{local_progress, WaveDelay};

pub struct ParticleMorph {
    store: KeyframeStore,
    particles: ParticleState,
    buffers: ParticleBuffers,
    phases: PhaseMap,
    wave: Option<WaveDelay>,
    hover: HoverParams,
}

impl ParticleMorph {
    pub fn new(
        store: KeyframeStore,
        phases: PhaseMap,
        wave: Option<WaveDelay>,
        hover: HoverParams,
        orientation: &OrientationConfig,
        rng: &mut Rng,
    ) -> Result<Self> {
        hover.validate()?;
        if phases.keyframe_count() != store.shape_count() {
            return Err(MorphError::InvalidPhases(format!(
                "{} legs need {} keyframes, store has {}",
                phases.leg_count(),
                phases.keyframe_count(),
                store.shape_count()
            )));
        }
        let particles = ParticleState::new(&store, wave.as_ref(), orientation, rng);
        let mut buffers = ParticleBuffers::new(store.count());
        write_initial(&store, &particles, &mut buffers);

        Ok(Self {
            store,
            particles,
            buffers,
            phases,
            wave,
            hover,
        })
    }

    /// Advance one tick with the given progress and pointer hit.
    pub fn update(&mut self, progress: f32, pointer: Option<Vec3>) {
        let step = MorphStep {
            phases: &self.phases,
            wave: self.wave.as_ref(),
            hover: &self.hover,
        };
        update_particles(step, &self.store, &mut self.particles, &mut self.buffers, progress, pointer);
    }

    /// Authoritative morph target (position, color) of particle `i` at `t`.
    pub fn target_at(&self, i: usize, t: f32) -> (Vec3, Vec3) {
        let local = match &self.wave {
            Some(_) => local_progress(self.particles.delay[i], t),
            None => t,
        };
        let leg = self.phases.locate(local);
        self.store.blend(i, leg.leg, leg.weight)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    pub fn particles(&self) -> &ParticleState {
        &self.particles
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }

    pub fn rerandomize_orientation(&mut self, orientation: &OrientationConfig, seed: u64) {
        self.particles.rerandomize_orientation(orientation, &mut Rng::new(seed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::hover::RelaxSource;
    use crate::systems::keyframes::Keyframe;
    use crate::systems::wave::{WaveCurve, WaveDirection};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn keyframe(name: &str, p: Vec3, n: usize) -> Keyframe {
        Keyframe {
            name: name.into(),
            positions: vec![p; n],
            colors: vec![p; n],
        }
    }

    /// N=4, A=(0,0,0) → B=(1,0,0) → C=(1,1,0), boundaries [0, 0.5, 1].
    fn scenario(hover_enabled: bool) -> ParticleMorph {
        let store = KeyframeStore::from_keyframes(
            4,
            vec![
                keyframe("a", Vec3::ZERO, 4),
                keyframe("b", Vec3::X, 4),
                keyframe("c", Vec3::new(1.0, 1.0, 0.0), 4),
            ],
        )
        .unwrap();
        let phases = PhaseMap::new(vec![0.0, 0.5, 1.0], Vec::new()).unwrap();
        let hover = HoverParams { enabled: hover_enabled, ..HoverParams::default() };
        ParticleMorph::new(store, phases, None, hover, &OrientationConfig::default(), &mut Rng::new(1)).unwrap()
    }

    fn all_at(morph: &ParticleMorph, p: Vec3) -> bool {
        (0..morph.count()).all(|i| close(morph.buffers().position(i), p))
    }

    #[test]
    fn buffers_populated_before_first_tick() {
        let morph = scenario(true);
        assert!(all_at(&morph, Vec3::ZERO));
        assert_eq!(morph.buffers().frame(), 0);
        assert_eq!(morph.buffers().instances().len(), 4);
    }

    #[test]
    fn three_keyframe_scenario() {
        let mut morph = scenario(false);
        for (t, expected) in [
            (0.0, Vec3::ZERO),
            (0.5, Vec3::X),
            (0.75, Vec3::new(1.0, 0.5, 0.0)),
            (1.0, Vec3::new(1.0, 1.0, 0.0)),
        ] {
            morph.update(t, None);
            assert!(all_at(&morph, expected), "t={}", t);
            assert!(close(morph.target_at(0, t).0, expected));
        }
    }

    #[test]
    fn boundary_is_continuous() {
        let morph = scenario(false);
        let before = morph.target_at(2, 0.5 - 1e-6).0;
        let at = morph.target_at(2, 0.5).0;
        assert!((before - at).length() < 1e-4);
    }

    #[test]
    fn reversing_scroll_has_no_hysteresis() {
        let mut morph = scenario(false);
        morph.update(0.0, None);
        let start: Vec<Vec3> = (0..4).map(|i| morph.buffers().position(i)).collect();
        for step in 0..=20 {
            morph.update(step as f32 / 20.0, None);
        }
        for step in (0..=20).rev() {
            morph.update(step as f32 / 20.0, None);
        }
        let end: Vec<Vec3> = (0..4).map(|i| morph.buffers().position(i)).collect();
        assert_eq!(start, end);
    }

    #[test]
    fn relaxation_converges_monotonically() {
        let mut morph = scenario(true);
        let target = Vec3::new(1.0, 1.0, 0.0);
        let mut prev = f32::INFINITY;
        for _ in 0..300 {
            morph.update(1.0, None);
            let d = morph.particles().current[0].distance(target);
            assert!(d <= prev);
            prev = d;
        }
        assert!(prev < 1e-4);
    }

    #[test]
    fn pointer_displaces_then_releases() {
        let mut morph = scenario(true);
        let hit = Some(Vec3::new(0.05, 0.0, 0.0));
        let push = HoverParams::default().push;
        let mut last = morph.particles().current[0];
        for _ in 0..5 {
            morph.update(0.0, hit);
            let now = morph.particles().current[0];
            assert!(now.distance(last) <= push + 1e-6);
            last = now;
        }
        let displaced = last.length();
        assert!(displaced > 0.0);
        // The authoritative target is untouched.
        assert_eq!(morph.target_at(0, 0.0).0, Vec3::ZERO);

        for _ in 0..50 {
            morph.update(0.0, None);
        }
        let bound = displaced * (1.0 - HoverParams::default().relax_rate).powi(50) + 1e-6;
        assert!(morph.particles().current[0].length() <= bound);
    }

    #[test]
    fn previous_target_source_lags_one_tick() {
        let store = KeyframeStore::from_keyframes(
            1,
            vec![keyframe("a", Vec3::ZERO, 1), keyframe("b", Vec3::X, 1)],
        )
        .unwrap();
        let hover = HoverParams {
            relax_source: RelaxSource::PreviousTarget,
            relax_rate: 0.5,
            ..HoverParams::default()
        };
        let mut morph = ParticleMorph::new(
            store,
            PhaseMap::uniform(1),
            None,
            hover,
            &OrientationConfig::default(),
            &mut Rng::new(1),
        )
        .unwrap();
        // First tick relaxes toward the old target (origin), so nothing moves.
        morph.update(1.0, None);
        assert_eq!(morph.particles().current[0], Vec3::ZERO);
        morph.update(1.0, None);
        assert!(close(morph.particles().current[0], Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn wave_delay_staggers_targets() {
        let n = 3;
        let mut a = keyframe("a", Vec3::ZERO, n);
        a.positions = vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0)];
        let b = Keyframe {
            name: "b".into(),
            positions: a.positions.iter().map(|p| *p + Vec3::X).collect(),
            colors: vec![Vec3::ONE; n],
        };
        let store = KeyframeStore::from_keyframes(n, vec![a, b]).unwrap();
        let wave = WaveDelay::new(0.5, WaveCurve::Linear, WaveDirection::BottomUp).unwrap();
        let morph = ParticleMorph::new(
            store,
            PhaseMap::uniform(1),
            Some(wave),
            HoverParams { enabled: false, ..HoverParams::default() },
            &OrientationConfig::default(),
            &mut Rng::new(1),
        )
        .unwrap();
        let x = |i: usize, t: f32| morph.target_at(i, t).0.x;
        assert!(x(0, 0.4) > x(1, 0.4) && x(1, 0.4) > x(2, 0.4));
        for i in 0..n {
            assert!((x(i, 1.0) - 1.0).abs() < 1e-6);
            assert_eq!(x(i, 0.0), 0.0);
        }
    }

    #[test]
    fn mismatched_phase_count_rejected() {
        let store = KeyframeStore::from_keyframes(
            1,
            vec![keyframe("a", Vec3::ZERO, 1), keyframe("b", Vec3::X, 1)],
        )
        .unwrap();
        let result = ParticleMorph::new(
            store,
            PhaseMap::uniform(3),
            None,
            HoverParams::default(),
            &OrientationConfig::default(),
            &mut Rng::new(1),
        );
        assert!(matches!(result, Err(MorphError::InvalidPhases(_))));
    }
}
