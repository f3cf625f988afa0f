//! Race strategy: suspend the request and race the companion against a timer.

use anyhow::Result;

use crate::asset::{timeout_response, AssetResponse};
use crate::gateway::{Gateway, InterceptedRequest};

impl Gateway {
    /// Allocate a correlation slot, start the timeout clock, then notify the
    /// companion — strictly in that order, so the slot and the clock exist
    /// before any reply could possibly arrive. First of {reply, timeout}
    /// wins; the registry's atomic take guarantees a single winner.
    pub(super) async fn handle_race(&self, request: &InterceptedRequest) -> Result<AssetResponse> {
        let id = self.registry.allocate();
        let mut rx = self.registry.register(id);
        let sleep = tokio::time::sleep(self.timeout);
        tokio::pin!(sleep);

        if !self.notify_companion(request, Some(id)) {
            tracing::debug!(id, url = %request.meta.url, "companion unreachable, waiting out the timeout");
        }

        let reply = tokio::select! {
            reply = &mut rx => Some(reply),
            _ = &mut sleep => None,
        };

        let response = match reply {
            Some(Ok(response)) => response,
            // Slot dropped without a send (released elsewhere): the caller
            // still gets a response, just the timeout text.
            Some(Err(_)) => timeout_response(self.timeout),
            None => {
                if self.registry.expire(id) {
                    tracing::warn!(id, url = %request.meta.url, "companion did not reply in time");
                    timeout_response(self.timeout)
                } else {
                    // The reply claimed the slot between the timer firing and
                    // this branch running; it is already in flight to us.
                    rx.await.unwrap_or_else(|_| timeout_response(self.timeout))
                }
            }
        };

        // Either branch has settled the slot; make release unconditional so
        // no slot outlives its request.
        self.registry.release(id);
        Ok(response)
    }
}
