//! Fulfillment channel message contract.
//!
//! Two directions, both JSON over an asynchronous message link:
//! outbound `{"msg", "url", "requestId"}` notices asking the companion unit
//! to produce an asset, and inbound `{"assetUrl", "assetContent",
//! "contentType", "requestId"}` replies carrying the bytes. Inbound data is
//! untrusted: anything that fails to parse or lacks required fields becomes
//! [`InboundMessage::Malformed`], which callers log and drop.

use serde::{Deserialize, Serialize};

use crate::registry::CorrelationId;

/// Fixed tag carried in every outbound notice.
pub const NEED_RESOURCE_MSG: &str = "assetgate requesting data from companion";

/// Gateway -> companion: "I need this resource." A hint, not a guaranteed
/// delivery; the companion may ignore it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NeedResource {
    pub msg: String,
    /// Full URL of the intercepted request.
    pub url: String,
    /// Present in race mode only; cache-first notices are keyed by path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<CorrelationId>,
}

impl NeedResource {
    pub fn new(url: impl Into<String>, request_id: Option<CorrelationId>) -> Self {
        NeedResource {
            msg: NEED_RESOURCE_MSG.to_string(),
            url: url.into(),
            request_id,
        }
    }
}

/// Companion -> gateway: the produced bytes for one resource path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentMessage {
    /// Resource path the bytes answer (cache key).
    pub asset_url: String,
    /// Produced content. The companion posts text; stored as UTF-8 bytes.
    pub asset_content: String,
    pub content_type: String,
    /// Correlates to a pending slot when the race strategy asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<CorrelationId>,
}

/// Parse result for an inbound companion message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Fulfillment(FulfillmentMessage),
    /// Unparsable or shape-mismatched input. Never an error: logged and
    /// dropped by the receiver, so a bad message cannot crash the pipeline.
    Malformed { reason: String },
}

/// Defensively parse a raw inbound message.
pub fn parse_inbound(raw: &str) -> InboundMessage {
    match serde_json::from_str::<FulfillmentMessage>(raw) {
        Ok(msg) => InboundMessage::Fulfillment(msg),
        Err(err) => InboundMessage::Malformed {
            reason: err.to_string(),
        },
    }
}
