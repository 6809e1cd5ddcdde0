use glam::Vec3;

use crate::api::config::EngineConfig;
use crate::api::subscriptions::{SubscriptionId, SubscriptionKind, Subscriptions};
use crate::assets::registry::SourceRegistry;
use crate::core::morph::ParticleMorph;
use crate::core::rng::Rng;
use crate::error::{MorphError, Result};
use crate::input::queue::{InputEvent, InputState};
use crate::renderer::camera::OrbitCamera;
use crate::renderer::instance::ParticleBuffers;
use crate::sampling::SourceData;
use crate::systems::keyframes::KeyframeStore;
use crate::systems::phase::PhaseMap;
use crate::systems::wave::WaveDelay;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Waiting for sources; nothing is rendered.
    Loading,
    /// Buffers populated; ticks update particles.
    Ready,
    /// Initialization failed; the engine stays inert until rebuilt.
    Failed,
    /// Torn down; no tick runs again.
    TornDown,
}

/// Owns one particle morph from asset arrival to teardown.
///
/// Input events may arrive at any time and are coalesced; `tick` reads the
/// latest snapshot once. Ticks are no-ops until every source has been
/// delivered and after teardown.
pub struct MorphEngine {
    config: EngineConfig,
    registry: SourceRegistry,
    input: InputState,
    camera: OrbitCamera,
    subscriptions: Subscriptions,
    morph: Option<ParticleMorph>,
    failure: Option<String>,
    active: bool,
}

impl MorphEngine {
    /// Validate the config and create an inert engine waiting for its sources.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "morph engine: {} particles, {} keyframes, waiting for {} source(s)",
            config.particle_count,
            config.shapes.len(),
            config.sources.len()
        );
        Ok(Self {
            registry: SourceRegistry::new(&config.sources),
            input: InputState::new(),
            camera: OrbitCamera::new(config.camera.clone()),
            subscriptions: Subscriptions::new(),
            morph: None,
            failure: None,
            active: true,
            config,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        if !self.active {
            EngineStatus::TornDown
        } else if self.failure.is_some() {
            EngineStatus::Failed
        } else if self.morph.is_some() {
            EngineStatus::Ready
        } else {
            EngineStatus::Loading
        }
    }

    /// Message of the error that made initialization fail, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Hand over loaded data for one source. Returns `Ok(true)` when this
    /// delivery completed initialization.
    pub fn provide_source(&mut self, name: &str, data: SourceData) -> Result<bool> {
        if self.status() != EngineStatus::Loading {
            log::warn!("source `{}` arrived while engine is {:?}; ignored", name, self.status());
            return Ok(false);
        }
        if let Err(err) = self.registry.insert(name, data) {
            return Err(self.fail(err));
        }
        if !self.registry.is_complete() {
            log::debug!("still waiting for {:?}", self.registry.missing());
            return Ok(false);
        }
        match self.initialize() {
            Ok(()) => Ok(true),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Record a loader failure for a source still awaited. The engine stays
    /// inert. Failures for unknown sources or outside loading are ignored.
    pub fn report_load_failure(&mut self, name: &str, reason: &str) -> Option<MorphError> {
        if self.status() != EngineStatus::Loading || !self.registry.is_expected(name) {
            log::warn!(
                "load failure for `{}` ignored while engine is {:?}: {}",
                name,
                self.status(),
                reason
            );
            return None;
        }
        Some(self.fail(MorphError::AssetLoadFailure {
            source_name: name.to_string(),
            reason: reason.to_string(),
        }))
    }

    fn fail(&mut self, err: MorphError) -> MorphError {
        log::error!("morph engine initialization failed: {}", err);
        self.failure = Some(err.to_string());
        self.registry.clear();
        err
    }

    /// One synchronous pass: keyframes, particle columns, buffers.
    fn initialize(&mut self) -> Result<()> {
        let mut rng = Rng::new(self.config.seed);
        let store = KeyframeStore::build(
            self.config.particle_count,
            &self.config.shapes,
            self.registry.strategies(),
            &mut rng,
        )?;
        let morph = ParticleMorph::new(
            store,
            PhaseMap::from_config(&self.config.phases)?,
            WaveDelay::from_config(&self.config.wave)?,
            self.config.hover.clone(),
            &self.config.orientation,
            &mut rng,
        )?;
        self.registry.clear();
        log::info!(
            "morph engine ready: {} particles across {} keyframes",
            morph.count(),
            morph.store().shape_count()
        );
        self.morph = Some(morph);
        Ok(())
    }

    /// Fold an input event into the latest-value snapshot.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.active {
            self.input.push(event);
        }
    }

    pub fn subscribe(&mut self, kind: SubscriptionKind) -> Option<SubscriptionId> {
        self.subscriptions.subscribe(kind)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Run one frame. Returns true when the particle buffers were rewritten.
    pub fn tick(&mut self) -> bool {
        if !self.active || self.failure.is_some() {
            return false;
        }
        let frame = self.input.snapshot();
        if let Some(ndc) = frame.pointer_ndc {
            self.camera.set_pointer(ndc);
        }
        self.camera.tick();

        let Some(morph) = self.morph.as_mut() else {
            return false;
        };
        morph.update(frame.progress, frame.pointer_hit);
        let progress = crate::systems::phase::sanitize_progress(frame.progress);
        morph.buffers_mut().mark_dirty(progress, self.camera.eye());
        true
    }

    /// Stop ticking, release buffers and hand back every live subscription
    /// so the host can detach its listeners.
    pub fn teardown(&mut self) -> Vec<SubscriptionId> {
        if !self.active {
            return Vec::new();
        }
        self.active = false;
        self.morph = None;
        self.registry.clear();
        let released = self.subscriptions.close();
        log::info!("morph engine torn down, {} listener(s) released", released.len());
        released
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn morph(&self) -> Option<&ParticleMorph> {
        self.morph.as_ref()
    }

    pub fn buffers(&self) -> Option<&ParticleBuffers> {
        self.morph.as_ref().map(ParticleMorph::buffers)
    }

    /// Host acknowledges it uploaded the current frame.
    pub fn acknowledge_frame(&mut self) {
        if let Some(morph) = self.morph.as_mut() {
            morph.buffers_mut().clear_dirty();
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn eye(&self) -> Vec3 {
        self.camera.eye()
    }

    /// Reassign static rotation and scale from a new seed.
    pub fn rerandomize_orientation(&mut self, seed: u64) {
        let orientation = self.config.orientation.clone();
        if let Some(morph) = self.morph.as_mut() {
            morph.rerandomize_orientation(&orientation, seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{SourceConfig, SourceKind};
    use crate::api::types::Color;
    use crate::sampling::TriangleMesh;
    use crate::systems::keyframes::{ColorRule, ShapeConfig, ShapeKind};
    use crate::systems::phase::PhaseConfig;

    fn config() -> EngineConfig {
        let white = Color([1.0, 1.0, 1.0]);
        EngineConfig {
            particle_count: 32,
            sources: vec![
                SourceConfig { name: "cube".into(), kind: SourceKind::Mesh { transform: Default::default() } },
                SourceConfig { name: "dots".into(), kind: SourceKind::Points },
            ],
            shapes: vec![
                ShapeConfig {
                    name: "cube".into(),
                    kind: ShapeKind::Sampled { source: "cube".into(), offset: [0.0; 3] },
                    color: ColorRule::Gradient { from: white, to: white },
                },
                ShapeConfig {
                    name: "dots".into(),
                    kind: ShapeKind::Sampled { source: "dots".into(), offset: [0.0; 3] },
                    color: ColorRule::Depth { from: white, to: white },
                },
            ],
            phases: PhaseConfig { boundaries: vec![0.0, 1.0], easing: Vec::new() },
            ..EngineConfig::default()
        }
    }

    fn triangle() -> SourceData {
        SourceData::Mesh(TriangleMesh::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None).unwrap())
    }

    fn ready_engine() -> MorphEngine {
        let mut engine = MorphEngine::new(config()).unwrap();
        assert!(!engine.provide_source("cube", triangle()).unwrap());
        assert!(engine.provide_source("dots", SourceData::Points(vec![Vec3::new(5.0, 5.0, 5.0)])).unwrap());
        engine
    }

    #[test]
    fn inert_until_all_sources_arrive() {
        let mut engine = MorphEngine::new(config()).unwrap();
        assert_eq!(engine.status(), EngineStatus::Loading);
        assert!(!engine.tick());
        assert!(engine.buffers().is_none());
        engine.provide_source("cube", triangle()).unwrap();
        assert_eq!(engine.status(), EngineStatus::Loading);
        assert!(!engine.tick());
    }

    #[test]
    fn ready_engine_ticks_and_marks_dirty_once() {
        let mut engine = ready_engine();
        assert_eq!(engine.status(), EngineStatus::Ready);
        let buffers = engine.buffers().unwrap();
        assert_eq!(buffers.particle_count(), 32);
        assert!(!buffers.is_dirty());

        engine.push_input(InputEvent::Progress(1.0));
        assert!(engine.tick());
        assert_eq!(engine.buffers().unwrap().frame(), 1);
        assert!(engine.buffers().unwrap().is_dirty());
        engine.acknowledge_frame();
        assert!(!engine.buffers().unwrap().is_dirty());
    }

    #[test]
    fn empty_source_leaves_engine_failed() {
        let mut engine = MorphEngine::new(config()).unwrap();
        let degenerate = TriangleMesh::from_flat(&[0.0; 9], None).unwrap();
        let err = engine.provide_source("cube", SourceData::Mesh(degenerate)).unwrap_err();
        assert!(matches!(err, MorphError::EmptySource { .. }));
        assert_eq!(engine.status(), EngineStatus::Failed);
        assert!(!engine.tick());
        // Later deliveries do not revive a failed engine.
        assert!(!engine.provide_source("dots", SourceData::Points(vec![Vec3::ONE])).unwrap());
        assert!(engine.buffers().is_none());
    }

    #[test]
    fn load_failure_is_reported() {
        let mut engine = MorphEngine::new(config()).unwrap();
        let err = engine.report_load_failure("dots", "network error");
        assert!(matches!(err, Some(MorphError::AssetLoadFailure { .. })));
        assert_eq!(engine.status(), EngineStatus::Failed);
        assert!(engine.failure().unwrap().contains("network error"));
    }

    #[test]
    fn late_load_failure_leaves_ready_engine_running() {
        let mut engine = ready_engine();
        assert!(engine.report_load_failure("dots", "late 404").is_none());
        assert!(engine.report_load_failure("unrelated", "late 404").is_none());
        assert_eq!(engine.status(), EngineStatus::Ready);
        assert!(engine.failure().is_none());
        assert!(engine.tick());
    }

    #[test]
    fn load_failure_for_unknown_source_is_ignored() {
        let mut engine = MorphEngine::new(config()).unwrap();
        assert!(engine.report_load_failure("not-configured", "x").is_none());
        assert_eq!(engine.status(), EngineStatus::Loading);
        engine.provide_source("cube", triangle()).unwrap();
        assert!(engine.provide_source("dots", SourceData::Points(vec![Vec3::ONE])).unwrap());
        assert_eq!(engine.status(), EngineStatus::Ready);
    }

    #[test]
    fn load_failure_after_teardown_is_ignored() {
        let mut engine = MorphEngine::new(config()).unwrap();
        engine.teardown();
        assert!(engine.report_load_failure("dots", "x").is_none());
        assert_eq!(engine.status(), EngineStatus::TornDown);
    }

    #[test]
    fn degenerate_radius_rejected_by_constructor() {
        let mut cfg = config();
        cfg.hover.radius = -0.5;
        assert!(matches!(MorphEngine::new(cfg), Err(MorphError::DegenerateRadius(_))));
    }

    #[test]
    fn teardown_stops_ticks_and_releases_listeners() {
        let mut engine = ready_engine();
        let a = engine.subscribe(SubscriptionKind::ScrollProgress).unwrap();
        let b = engine.subscribe(SubscriptionKind::PointerMove).unwrap();
        let released = engine.teardown();
        assert_eq!(released, vec![a, b]);
        assert_eq!(engine.status(), EngineStatus::TornDown);
        assert!(!engine.tick());
        assert!(engine.buffers().is_none());
        assert!(engine.subscribe(SubscriptionKind::PointerHit).is_none());
        assert!(engine.teardown().is_empty());
    }

    #[test]
    fn morph_reaches_destination_shape() {
        let mut engine = ready_engine();
        engine.push_input(InputEvent::Progress(0.2));
        engine.push_input(InputEvent::Progress(1.0));
        for _ in 0..400 {
            engine.tick();
        }
        let buffers = engine.buffers().unwrap();
        for i in 0..32 {
            assert!((buffers.position(i) - Vec3::new(5.0, 5.0, 5.0)).length() < 1e-3);
        }
    }

    #[test]
    fn pointer_moves_camera_independently_of_particles() {
        let mut engine = MorphEngine::new(config()).unwrap();
        engine.push_input(InputEvent::PointerMove { x: 1.0, y: 0.0 });
        engine.tick();
        assert!(engine.camera().yaw() > 0.0);
        assert_eq!(engine.status(), EngineStatus::Loading);
    }

    #[test]
    fn config_from_json() {
        let engine = MorphEngine::from_json(r#"{ "particle_count": 10 }"#).unwrap();
        assert_eq!(engine.config().particle_count, 10);
        assert_eq!(engine.status(), EngineStatus::Loading);
    }
}
