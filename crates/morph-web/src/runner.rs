use morph_engine::{
    EngineConfig, EngineStatus, ImageMask, InputEvent, MorphEngine, MorphError, Result,
    SourceData, SubscriptionId, SubscriptionKind, TriangleMesh, WorldPoint,
};

/// Status codes returned to the host by `status()`.
pub const STATUS_LOADING: u32 = 0;
pub const STATUS_READY: u32 = 1;
pub const STATUS_FAILED: u32 = 2;
pub const STATUS_TORN_DOWN: u32 = 3;

/// Host-facing wrapper around a `MorphEngine`.
///
/// wasm-bindgen cannot export the engine directly, so `lib.rs` keeps one
/// runner in a `thread_local!` and forwards each export here. Methods log
/// engine errors and hand back plain status values.
pub struct MorphRunner {
    engine: MorphEngine,
}

impl MorphRunner {
    /// Build from JSON; an empty string selects the default scene.
    pub fn from_json(config_json: &str) -> Result<Self> {
        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json(config_json)?
        };
        Ok(Self { engine: MorphEngine::new(config)? })
    }

    pub fn engine(&self) -> &MorphEngine {
        &self.engine
    }

    /// Deliver a triangulated mesh. Returns true once the engine is ready.
    pub fn load_mesh(&mut self, name: &str, positions: &[f32], indices: &[u32]) -> bool {
        let indices = (!indices.is_empty()).then_some(indices);
        match TriangleMesh::from_flat(positions, indices) {
            Ok(mesh) => self.provide(name, SourceData::Mesh(mesh)),
            Err(err) => self.reject(name, err),
        }
    }

    /// Deliver a grayscale image as a mask.
    pub fn load_mask(&mut self, name: &str, width: u32, height: u32, luma: &[u8], threshold: u8) -> bool {
        match ImageMask::from_luminance(width, height, luma, threshold) {
            Ok(mask) => self.provide(name, SourceData::Mask(mask)),
            Err(err) => self.reject(name, err),
        }
    }

    /// Deliver already projected points as flat xyz triples.
    pub fn load_points(&mut self, name: &str, xyz: &[f32]) -> bool {
        if xyz.len() % 3 != 0 {
            let err = MorphError::InvalidMesh(format!("point array length {} is not a multiple of 3", xyz.len()));
            return self.reject(name, err);
        }
        let points = xyz
            .chunks_exact(3)
            .map(|c| WorldPoint::new(c[0], c[1], c[2]))
            .collect();
        self.provide(name, SourceData::Points(points))
    }

    /// Returns true when the failure stopped initialization.
    pub fn asset_failed(&mut self, name: &str, message: &str) -> bool {
        self.engine.report_load_failure(name, message).is_some()
    }

    fn provide(&mut self, name: &str, data: SourceData) -> bool {
        self.engine.provide_source(name, data).unwrap_or(false)
    }

    /// Malformed loader output counts as a failed load.
    fn reject(&mut self, name: &str, err: MorphError) -> bool {
        self.engine.report_load_failure(name, &err.to_string());
        false
    }

    /// Returns the subscription id, or 0 for an unknown kind or after teardown.
    pub fn subscribe(&mut self, kind: u32) -> u32 {
        SubscriptionKind::from_code(kind)
            .and_then(|k| self.engine.subscribe(k))
            .map_or(0, |id| id.0)
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.engine.unsubscribe(SubscriptionId(id))
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.engine.push_input(event);
    }

    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    pub fn acknowledge_frame(&mut self) {
        self.engine.acknowledge_frame();
    }

    /// Listener ids the host must detach.
    pub fn teardown(&mut self) -> Vec<u32> {
        self.engine.teardown().into_iter().map(|id| id.0).collect()
    }

    pub fn status(&self) -> u32 {
        match self.engine.status() {
            EngineStatus::Loading => STATUS_LOADING,
            EngineStatus::Ready => STATUS_READY,
            EngineStatus::Failed => STATUS_FAILED,
            EngineStatus::TornDown => STATUS_TORN_DOWN,
        }
    }

    // ---- Pointer accessors for shared-memory reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.engine
            .buffers()
            .map_or(std::ptr::null(), |b| b.as_ptr())
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.engine
            .buffers()
            .map_or(0, |b| b.layout().buffer_total_floats as u32)
    }

    pub fn particle_count(&self) -> u32 {
        self.engine.config().particle_count as u32
    }

    /// Same wrapping counter as the buffer header.
    pub fn frame(&self) -> u32 {
        self.engine.buffers().map_or(0, |b| b.header_frame())
    }

    pub fn eye(&self) -> [f32; 3] {
        self.engine.eye().to_array()
    }
}
