//! Per-frame transform update: morph target → hover → output buffers.

use glam::Vec3;

use crate::core::particles::ParticleState;
use crate::renderer::instance::ParticleBuffers;
use crate::systems::hover::{perturb, HoverParams, RelaxSource};
use crate::systems::keyframes::KeyframeStore;
use crate::systems::phase::{sanitize_progress, PhaseMap};
use crate::systems::wave::{local_progress, WaveDelay};

/// Everything that shapes the target for a tick, borrowed from the owner.
#[derive(Debug, Clone, Copy)]
pub struct MorphStep<'a> {
    pub phases: &'a PhaseMap,
    pub wave: Option<&'a WaveDelay>,
    pub hover: &'a HoverParams,
}

/// Update every particle for one tick. Allocation-free; `particles` and
/// `buffers` must both hold `store.count()` entries.
pub fn update_particles(
    step: MorphStep<'_>,
    store: &KeyframeStore,
    particles: &mut ParticleState,
    buffers: &mut ParticleBuffers,
    progress: f32,
    pointer: Option<Vec3>,
) {
    let t = sanitize_progress(progress);
    // Without a wave every particle shares one leg position.
    let shared = step.wave.is_none().then(|| step.phases.locate(t));

    for i in 0..store.count() {
        let leg = match shared {
            Some(leg) => leg,
            None => step.phases.locate(local_progress(particles.delay[i], t)),
        };
        let (target, color) = store.blend(i, leg.leg, leg.weight);

        let position = if step.hover.enabled {
            let relax_target = match step.hover.relax_source {
                RelaxSource::CurrentTarget => target,
                RelaxSource::PreviousTarget => particles.previous_target[i],
            };
            perturb(particles.current[i], relax_target, pointer, step.hover)
        } else {
            target
        };

        particles.current[i] = position;
        particles.previous_target[i] = target;
        buffers.write(i, position, color, particles.rotation[i], particles.scale[i]);
    }
}

/// Write the resting state (first keyframe) so the buffers are complete
/// before the first tick.
pub fn write_initial(store: &KeyframeStore, particles: &ParticleState, buffers: &mut ParticleBuffers) {
    let colors = &store.shape(0).colors;
    for i in 0..store.count() {
        buffers.write(i, particles.current[i], colors[i], particles.rotation[i], particles.scale[i]);
    }
}
