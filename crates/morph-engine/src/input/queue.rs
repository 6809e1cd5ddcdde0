use glam::{Vec2, Vec3};

use crate::api::types::WorldPoint;

/// Input the engine understands. Generic over the host's event system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Scroll-linked timeline progress, nominally in [0, 1].
    Progress(f32),
    /// Pointer moved; normalized device coordinates in [-1, 1].
    PointerMove { x: f32, y: f32 },
    /// Ray-cast hit the displayed geometry at this world point.
    PointerHit { x: f32, y: f32, z: f32 },
    /// Ray-cast found nothing (or the pointer left the view).
    PointerClear,
}

/// The values a tick reads. Only the latest of each kind survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub progress: f32,
    pub pointer_ndc: Option<Vec2>,
    pub pointer_hit: Option<WorldPoint>,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            progress: 0.0,
            pointer_ndc: None,
            pointer_hit: None,
        }
    }
}

/// Latest-value input state. Events arriving between ticks overwrite each
/// other; nothing is buffered.
#[derive(Debug, Default)]
pub struct InputState {
    latest: FrameInput,
    pending: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event into the snapshot.
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::Progress(t) => self.latest.progress = t,
            InputEvent::PointerMove { x, y } => self.latest.pointer_ndc = Some(Vec2::new(x, y)),
            InputEvent::PointerHit { x, y, z } => {
                let hit = Vec3::new(x, y, z);
                self.latest.pointer_hit = hit.is_finite().then_some(hit);
            }
            InputEvent::PointerClear => self.latest.pointer_hit = None,
        }
        self.pending += 1;
    }

    /// Read the snapshot at the start of a tick. The snapshot persists;
    /// only the pending-event count resets.
    pub fn snapshot(&mut self) -> FrameInput {
        self.pending = 0;
        self.latest
    }

    pub fn peek(&self) -> &FrameInput {
        &self.latest
    }

    /// Events folded in since the last snapshot.
    pub fn pending(&self) -> usize {
        self.pending
    }
}
