//! End-to-end gateway scenarios with a mock network backend and a scripted
//! companion on the other side of the broker.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::asset::{AssetResponse, ResponseOrigin};
use crate::broker::{ContextBroker, ContextId};
use crate::cache::AssetCache;
use crate::classifier::RequestMeta;
use crate::config::{GatewayConfig, Strategy};
use crate::gateway::{Gateway, InterceptedRequest};
use crate::network::{NetworkBackend, NetworkError};

/// Records every fetch and answers with a fixed body.
struct MockNetwork {
    calls: Mutex<Vec<String>>,
    body: &'static str,
    content_type: &'static str,
}

impl MockNetwork {
    fn arc(body: &'static str, content_type: &'static str) -> Arc<Self> {
        Arc::new(MockNetwork {
            calls: Mutex::new(Vec::new()),
            body,
            content_type,
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl NetworkBackend for MockNetwork {
    fn fetch(&self, url: &str) -> Result<AssetResponse, NetworkError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(AssetResponse::new(
            self.body.as_bytes().to_vec(),
            self.content_type,
            ResponseOrigin::Network,
        ))
    }
}

async fn gateway_with(
    strategy: Strategy,
    timeout_ms: u64,
    network: Arc<MockNetwork>,
    broker: Arc<ContextBroker>,
) -> Gateway {
    let cfg = GatewayConfig {
        timeout_ms,
        strategy,
        ..Default::default()
    };
    let cache = AssetCache::open_memory(&cfg.cache_namespace).await.unwrap();
    Gateway::new(&cfg, cache, broker, network)
}

/// A same-origin request with a valid referrer (classifies as local).
fn local_request(url: &str, context: Option<ContextId>) -> InterceptedRequest {
    InterceptedRequest::new(
        RequestMeta::new(url, Some("https://example.com/".to_string())),
        context,
    )
}

#[tokio::test]
async fn race_companion_reply_wins() {
    let network = MockNetwork::arc("from network", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, mut inbox) = broker.register();
    let gw = Arc::new(gateway_with(Strategy::Race, 10_000, Arc::clone(&network), broker).await);

    // Scripted companion: receive the notice, compute for 50ms, reply.
    let companion = {
        let gw = Arc::clone(&gw);
        tokio::spawn(async move {
            let notice = inbox.recv().await.unwrap();
            assert_eq!(notice.url, "https://example.com/data.csv");
            let id = notice.request_id.expect("race notices carry a correlation id");
            tokio::time::sleep(Duration::from_millis(50)).await;
            let raw = format!(
                r#"{{"assetUrl":"/data.csv","assetContent":"a,b\n1,2","contentType":"text/csv","requestId":{id}}}"#
            );
            gw.handle_companion_message(&raw).await;
        })
    };

    let response = gw
        .handle(local_request("https://example.com/data.csv", Some(ctx)))
        .await
        .unwrap();
    companion.await.unwrap();

    assert_eq!(response.body_text(), "a,b\n1,2");
    assert_eq!(response.content_type, "text/csv");
    assert_eq!(response.origin, ResponseOrigin::Companion);
    assert!(network.calls().is_empty(), "no network fetch for a companion win");
    assert_eq!(gw.registry().pending_count(), 0);
    // The reply also wrote through to the cache.
    assert!(gw.cache().get("/data.csv").await.unwrap().is_some());
}

#[tokio::test]
async fn race_timeout_synthesizes_response() {
    let network = MockNetwork::arc("unused", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, _inbox) = broker.register();
    let gw = gateway_with(Strategy::Race, 100, Arc::clone(&network), broker).await;

    let response = gw
        .handle(local_request("https://example.com/data.csv", Some(ctx)))
        .await
        .unwrap();

    assert_eq!(response.body_text(), "Timed out after 100ms");
    assert_eq!(response.content_type, "text/html");
    assert_eq!(response.origin, ResponseOrigin::Timeout);
    assert!(network.calls().is_empty());
    assert_eq!(gw.registry().pending_count(), 0, "timed-out slot must be gone");
}

#[tokio::test]
async fn race_unreachable_context_still_answers() {
    let network = MockNetwork::arc("unused", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let gw = gateway_with(Strategy::Race, 50, Arc::clone(&network), broker).await;

    // No owning context: the notice is skipped and the timeout answers.
    let response = gw
        .handle(local_request("https://example.com/data.csv", None))
        .await
        .unwrap();
    assert_eq!(response.origin, ResponseOrigin::Timeout);
}

#[tokio::test]
async fn excluded_path_passes_through_without_slot() {
    let network = MockNetwork::arc("tooling asset", "application/javascript");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, mut inbox) = broker.register();
    let gw = gateway_with(Strategy::Race, 10_000, Arc::clone(&network), broker).await;

    let response = gw
        .handle(local_request(
            "https://example.com/node_modules/lib/index.js",
            Some(ctx),
        ))
        .await
        .unwrap();

    assert_eq!(response.origin, ResponseOrigin::Network);
    assert_eq!(
        network.calls(),
        vec!["https://example.com/node_modules/lib/index.js".to_string()]
    );
    assert_eq!(gw.registry().pending_count(), 0);
    assert!(inbox.try_recv().is_err(), "passthrough must not notify the companion");
}

#[tokio::test]
async fn no_referrer_passes_through() {
    let network = MockNetwork::arc("page", "text/html");
    let broker = Arc::new(ContextBroker::new());
    let gw = gateway_with(Strategy::Race, 10_000, Arc::clone(&network), broker).await;

    let request = InterceptedRequest::new(RequestMeta::new("https://example.com/", None), None);
    let response = gw.handle(request).await.unwrap();
    assert_eq!(response.origin, ResponseOrigin::Network);
    assert_eq!(network.calls().len(), 1);
}

#[tokio::test]
async fn cache_first_miss_then_hit() {
    let network = MockNetwork::arc("stale network copy", "application/json");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, mut inbox) = broker.register();
    let gw = gateway_with(Strategy::Cachefirst, 10_000, Arc::clone(&network), broker).await;

    // First request: miss -> network fallback, companion notified by path.
    let first = gw
        .handle(local_request("https://example.com/table.json", Some(ctx)))
        .await
        .unwrap();
    assert_eq!(first.origin, ResponseOrigin::Network);
    assert_eq!(first.body_text(), "stale network copy");

    let notice = inbox.recv().await.unwrap();
    assert_eq!(notice.url, "https://example.com/table.json");
    assert!(notice.request_id.is_none(), "cache-first notices carry no correlation id");

    // Companion's later reply populates the cache for next time.
    gw.handle_companion_message(
        r#"{"assetUrl":"/table.json","assetContent":"{\"rows\":1}","contentType":"application/json"}"#,
    )
    .await;

    // Second request: served from cache, companion not notified again.
    let second = gw
        .handle(local_request("https://example.com/table.json", Some(ctx)))
        .await
        .unwrap();
    assert_eq!(second.origin, ResponseOrigin::Cache);
    assert_eq!(second.body_text(), r#"{"rows":1}"#);
    assert_eq!(second.content_type, "application/json");
    assert!(inbox.try_recv().is_err());
    assert_eq!(network.calls().len(), 1, "only the first request hit the network");
}

#[tokio::test]
async fn malformed_companion_message_is_dropped() {
    let network = MockNetwork::arc("unused", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let gw = gateway_with(Strategy::Race, 10_000, Arc::clone(&network), broker).await;

    gw.handle_companion_message("definitely not json").await;
    gw.handle_companion_message(r#"{"assetUrl":"/only-a-path"}"#).await;

    assert!(gw.cache().list_paths().await.unwrap().is_empty());
    assert_eq!(gw.registry().pending_count(), 0);
}

#[tokio::test]
async fn late_reply_after_timeout_is_inert_but_cached() {
    let network = MockNetwork::arc("unused", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, mut inbox) = broker.register();
    let gw = gateway_with(Strategy::Race, 50, Arc::clone(&network), broker).await;

    let response = gw
        .handle(local_request("https://example.com/slow.csv", Some(ctx)))
        .await
        .unwrap();
    assert_eq!(response.origin, ResponseOrigin::Timeout);

    // The companion finally answers, long after the slot expired.
    let id = inbox.recv().await.unwrap().request_id.unwrap();
    let raw = format!(
        r#"{{"assetUrl":"/slow.csv","assetContent":"late","contentType":"text/plain","requestId":{id}}}"#
    );
    gw.handle_companion_message(&raw).await;

    // No pending slot was touched, but the bytes are cached for next time.
    assert_eq!(gw.registry().pending_count(), 0);
    assert_eq!(
        gw.cache().get("/slow.csv").await.unwrap().unwrap().body,
        b"late"
    );
}

#[tokio::test]
async fn concurrent_local_requests_resolve_out_of_order() {
    let network = MockNetwork::arc("unused", "text/plain");
    let broker = Arc::new(ContextBroker::new());
    let (ctx, mut inbox) = broker.register();
    let gw = Arc::new(gateway_with(Strategy::Race, 10_000, Arc::clone(&network), broker).await);

    // Companion answers the second notice first; both callers must still get
    // their own bytes.
    let companion = {
        let gw = Arc::clone(&gw);
        tokio::spawn(async move {
            let a = inbox.recv().await.unwrap();
            let b = inbox.recv().await.unwrap();
            for notice in [b, a] {
                let path = notice.url.rsplit_once("example.com").unwrap().1.to_string();
                let id = notice.request_id.unwrap();
                let raw = format!(
                    r#"{{"assetUrl":"{path}","assetContent":"body of {path}","contentType":"text/plain","requestId":{id}}}"#
                );
                gw.handle_companion_message(&raw).await;
            }
        })
    };

    let first = gw.handle(local_request("https://example.com/one.csv", Some(ctx)));
    let second = gw.handle(local_request("https://example.com/two.csv", Some(ctx)));
    let (first, second) = tokio::join!(first, second);
    companion.await.unwrap();

    assert_eq!(first.unwrap().body_text(), "body of /one.csv");
    assert_eq!(second.unwrap().body_text(), "body of /two.csv");
    assert_eq!(gw.registry().pending_count(), 0);
}
