//! Network backend: the passthrough fetch seam.
//!
//! Uses the curl crate (libcurl) for the default backend. The trait is
//! blocking; async callers go through `spawn_blocking` (see the gateway).
//! Tests substitute their own implementation.

use std::str;
use std::time::Duration;

use crate::asset::{AssetResponse, ResponseOrigin};

/// Failure of a direct network fetch.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
}

/// Performs the direct fetch for passthrough requests and cache-first
/// fallbacks. Implementations must be callable from multiple threads.
pub trait NetworkBackend: Send + Sync {
    /// Fetch `url` and return its body and content type. Blocking.
    fn fetch(&self, url: &str) -> Result<AssetResponse, NetworkError>;
}

/// Default libcurl-backed implementation. Follows redirects; bounded
/// connect/total timeouts so a dead origin cannot hang the request path.
pub struct CurlBackend {
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for CurlBackend {
    fn default() -> Self {
        CurlBackend {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

impl CurlBackend {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        CurlBackend {
            connect_timeout,
            timeout,
        }
    }
}

impl NetworkBackend for CurlBackend {
    fn fetch(&self, url: &str) -> Result<AssetResponse, NetworkError> {
        let mut body: Vec<u8> = Vec::new();
        let mut headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(NetworkError::Http(code));
        }

        let content_type = content_type_from_headers(&headers)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Ok(AssetResponse::new(body, content_type, ResponseOrigin::Network))
    }
}

/// Pick the last `Content-Type` header (redirect chains repeat headers; the
/// final hop's value is the one that describes the body we kept).
fn content_type_from_headers(lines: &[String]) -> Option<String> {
    let mut found = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                found = Some(value.trim().to_string());
            }
        }
    }
    found
}
