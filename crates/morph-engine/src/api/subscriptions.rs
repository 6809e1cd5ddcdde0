//! Engine-owned registry of host listeners.
//!
//! The host attaches its scroll / pointer / ray-cast listeners and records each
//! one here. Teardown hands back every live id so the host can detach them,
//! and the registry refuses new ids afterwards.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// What a host listener feeds into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    ScrollProgress,
    PointerMove,
    PointerHit,
}

impl SubscriptionKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::ScrollProgress),
            1 => Some(Self::PointerMove),
            2 => Some(Self::PointerHit),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Subscriptions {
    next_id: u32,
    live: Vec<(SubscriptionId, SubscriptionKind)>,
    closed: bool,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns `None` once the registry is closed.
    pub fn subscribe(&mut self, kind: SubscriptionKind) -> Option<SubscriptionId> {
        if self.closed {
            log::warn!("subscription {:?} refused after teardown", kind);
            return None;
        }
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.live.push((id, kind));
        Some(id)
    }

    /// Remove one listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.live.len();
        self.live.retain(|(live, _)| *live != id);
        self.live.len() != before
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the registry and return every id the host still has attached.
    pub fn close(&mut self) -> Vec<SubscriptionId> {
        self.closed = true;
        self.live.drain(..).map(|(id, _)| id).collect()
    }
}
