//! Correlation registry: pending-resolution slots keyed by request id.
//!
//! Each intercepted request racing a companion reply against the timeout owns
//! one slot. The slot is taken from the table exactly once — by whichever of
//! `resolve` (companion reply) or `expire` (timeout) gets there first — so
//! the caller-visible response is produced exactly once per request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::asset::AssetResponse;

/// Correlation id linking an outgoing notification to its fulfillment reply.
pub type CorrelationId = u64;

/// Table of correlation id -> pending slot. One instance per gateway; never a
/// true global, so independent gateways (e.g. under test) don't interfere.
#[derive(Default)]
pub struct CorrelationRegistry {
    next_id: AtomicU64,
    slots: Mutex<HashMap<CorrelationId, oneshot::Sender<AssetResponse>>>,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next correlation id. Ids are strictly increasing for the
    /// lifetime of the registry and are never reused while a slot is pending.
    pub fn allocate(&self) -> CorrelationId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Create the pending slot for `id` and return the waiter the controller
    /// races against its timeout. Must be called before the companion is
    /// notified, so no reply can arrive for a slot that does not exist yet.
    pub fn register(&self, id: CorrelationId) -> oneshot::Receiver<AssetResponse> {
        let (tx, rx) = oneshot::channel();
        self.slots.lock().unwrap().insert(id, tx);
        rx
    }

    /// Deliver a companion reply. Returns true iff this call transitioned the
    /// slot (pending -> resolved); false means the slot was already taken or
    /// released — a late or duplicate reply, which is a normal race outcome.
    pub fn resolve(&self, id: CorrelationId, response: AssetResponse) -> bool {
        let Some(tx) = self.slots.lock().unwrap().remove(&id) else {
            return false;
        };
        if tx.send(response).is_err() {
            // Waiter already dropped (request torn down); the transition
            // still happened, there is just nobody left to observe it.
            tracing::debug!(id, "slot resolved but waiter was gone");
        }
        true
    }

    /// Timeout path: claim the slot without delivering a response. Returns
    /// true iff this call transitioned the slot (pending -> expired); false
    /// means a reply won the race first.
    pub fn expire(&self, id: CorrelationId) -> bool {
        self.slots.lock().unwrap().remove(&id).is_some()
    }

    /// Drop the slot unconditionally, whether or not it is still pending.
    pub fn release(&self, id: CorrelationId) {
        self.slots.lock().unwrap().remove(&id);
    }

    /// Number of slots currently pending.
    pub fn pending_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}
