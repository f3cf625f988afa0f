//! Context broker: best-effort delivery of notices to document contexts.
//!
//! The gateway and the companion unit cannot address each other directly;
//! notices go to whichever document context owns the intercepted request, and
//! that context relays them on. A context may be gone by the time we try
//! (torn down, cross-context request with no live handle) — absence is a
//! normal branch, not an error, and the notice is simply skipped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::channel::NeedResource;

/// Identifies one live document context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// Registry of context id -> live notice sender.
#[derive(Default)]
pub struct ContextBroker {
    next_id: AtomicU64,
    contexts: Mutex<HashMap<ContextId, mpsc::UnboundedSender<NeedResource>>>,
}

impl ContextBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new context; the returned receiver is the context's inbox.
    pub fn register(&self) -> (ContextId, mpsc::UnboundedReceiver<NeedResource>) {
        let id = ContextId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.contexts.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Drop a context (teardown). In-flight notices for it are lost; pending
    /// requests fall back to their timeout path.
    pub fn unregister(&self, id: ContextId) {
        self.contexts.lock().unwrap().remove(&id);
    }

    /// Deliver `notice` to context `id` if it is still reachable. Returns
    /// whether delivery was handed off; false means no live handle existed
    /// and the notice was skipped.
    pub fn notify(&self, id: ContextId, notice: NeedResource) -> bool {
        let sender = match self.contexts.lock().unwrap().get(&id) {
            Some(tx) => tx.clone(),
            None => {
                tracing::debug!(context = id.0, url = %notice.url, "no live context, notice skipped");
                return false;
            }
        };
        if sender.send(notice).is_err() {
            // Receiver dropped without unregistering; treat like absence.
            self.contexts.lock().unwrap().remove(&id);
            return false;
        }
        true
    }
}
