//! Browser bridge for `morph-engine`.
//!
//! One engine lives in a `thread_local!` runner. The host page loads assets,
//! forwards scroll and pointer events, calls `morph_tick` from its animation
//! frame and reads the shared particle buffer through the pointer accessors.
//! Every export tolerates being called before `morph_init` or after
//! `morph_teardown`.

pub mod runner;

pub use runner::MorphRunner;

use std::cell::RefCell;

use morph_engine::InputEvent;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<MorphRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(fallback: R, f: impl FnOnce(&mut MorphRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            // Goes straight to the console: the logger is installed by morph_init.
            web_sys::console::warn_1(&JsValue::from_str(
                "morph engine not initialized; call morph_init() first",
            ));
            fallback
        }
    })
}

/// Create the engine from a JSON config (empty string for defaults).
/// Returns false and logs the reason when the config is rejected.
#[wasm_bindgen]
pub fn morph_init(config_json: &str) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    match MorphRunner::from_json(config_json) {
        Ok(runner) => {
            RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
            true
        }
        Err(err) => {
            log::error!("morph_init: {}", err);
            false
        }
    }
}

#[wasm_bindgen]
pub fn morph_load_mesh(name: &str, positions: &[f32], indices: &[u32]) -> bool {
    with_runner(false, |r| r.load_mesh(name, positions, indices))
}

#[wasm_bindgen]
pub fn morph_load_mask(name: &str, width: u32, height: u32, luma: &[u8], threshold: u8) -> bool {
    with_runner(false, |r| r.load_mask(name, width, height, luma, threshold))
}

#[wasm_bindgen]
pub fn morph_load_points(name: &str, xyz: &[f32]) -> bool {
    with_runner(false, |r| r.load_points(name, xyz))
}

/// Returns true when the failure stopped initialization.
#[wasm_bindgen]
pub fn morph_asset_failed(name: &str, message: &str) -> bool {
    with_runner(false, |r| r.asset_failed(name, message))
}

/// Register a host listener (0 scroll, 1 pointer move, 2 pointer hit).
/// Returns 0 when refused.
#[wasm_bindgen]
pub fn morph_subscribe(kind: u32) -> u32 {
    with_runner(0, |r| r.subscribe(kind))
}

#[wasm_bindgen]
pub fn morph_unsubscribe(id: u32) -> bool {
    with_runner(false, |r| r.unsubscribe(id))
}

#[wasm_bindgen]
pub fn morph_set_progress(t: f32) {
    with_runner((), |r| r.push_input(InputEvent::Progress(t)));
}

/// Pointer position in normalized device coordinates.
#[wasm_bindgen]
pub fn morph_pointer_move(x: f32, y: f32) {
    with_runner((), |r| r.push_input(InputEvent::PointerMove { x, y }));
}

/// World-space ray-cast hit on the interaction surface.
#[wasm_bindgen]
pub fn morph_pointer_hit(x: f32, y: f32, z: f32) {
    with_runner((), |r| r.push_input(InputEvent::PointerHit { x, y, z }));
}

#[wasm_bindgen]
pub fn morph_pointer_clear() {
    with_runner((), |r| r.push_input(InputEvent::PointerClear));
}

/// Returns true when the shared buffer holds a new frame.
#[wasm_bindgen]
pub fn morph_tick() -> bool {
    with_runner(false, |r| r.tick())
}

#[wasm_bindgen]
pub fn morph_frame_uploaded() {
    with_runner((), |r| r.acknowledge_frame());
}

/// Stop the engine and return the listener ids the host must detach.
#[wasm_bindgen]
pub fn morph_teardown() -> Vec<u32> {
    let released = with_runner(Vec::new(), |r| r.teardown());
    log::info!("morph_teardown: {} listener(s) to detach", released.len());
    released
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_status() -> u32 {
    RUNNER.with(|cell| cell.borrow().as_ref().map_or(runner::STATUS_LOADING, MorphRunner::status))
}

#[wasm_bindgen]
pub fn get_buffer_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.buffer_ptr())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(0, |r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_particle_count() -> u32 {
    with_runner(0, |r| r.particle_count())
}

#[wasm_bindgen]
pub fn get_frame() -> u32 {
    with_runner(0, |r| r.frame())
}

#[wasm_bindgen]
pub fn get_eye() -> Vec<f32> {
    with_runner(vec![0.0; 3], |r| r.eye().to_vec())
}
