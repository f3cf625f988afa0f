//! Response value types shared across the pipeline.

use std::time::Duration;

/// Where a response came from. Lets callers and tests tell a cache hit from a
/// companion reply or a synthesized timeout without inspecting bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    /// Direct network fetch (passthrough or cache-first fallback).
    Network,
    /// Bytes produced by the companion unit.
    Companion,
    /// Served from the persistent asset cache.
    Cache,
    /// Synthesized after the companion failed to reply in time.
    Timeout,
}

/// A complete answer to an intercepted request: body bytes plus content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub body: Vec<u8>,
    pub content_type: String,
    pub origin: ResponseOrigin,
}

impl AssetResponse {
    pub fn new(body: Vec<u8>, content_type: impl Into<String>, origin: ResponseOrigin) -> Self {
        AssetResponse {
            body,
            content_type: content_type.into(),
            origin,
        }
    }

    /// Body as text, for callers that know the asset is textual.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Synthesize the response returned when the companion did not reply in time.
/// The caller always receives *a* response; a timeout is not a hard failure.
pub fn timeout_response(waited: Duration) -> AssetResponse {
    AssetResponse::new(
        format!("Timed out after {}ms", waited.as_millis()).into_bytes(),
        "text/html",
        ResponseOrigin::Timeout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_response_names_duration() {
        let r = timeout_response(Duration::from_millis(10_000));
        assert_eq!(r.body_text(), "Timed out after 10000ms");
        assert_eq!(r.content_type, "text/html");
        assert_eq!(r.origin, ResponseOrigin::Timeout);
    }
}
