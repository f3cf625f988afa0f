//! Classify intercepted requests as locally-resolvable or passthrough.
//!
//! Pure predicate over the request URL, its referrer, and a denylist of path
//! patterns. No side effects; safe to call repeatedly and concurrently.
//! Ambiguous cases (missing referrer, unparsable URL, cross-origin) always
//! fall back to passthrough so page functionality is never broken by an
//! over-eager intercept.

use crate::url_model::same_origin;

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Must be answered by the companion unit (or cache).
    Local,
    /// Left untouched; answered by a direct network fetch.
    Passthrough,
}

/// The request fields classification looks at.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Full request URL.
    pub url: String,
    /// Referrer URL, if the host environment supplied one. An empty string
    /// is treated as absent: the gateway's own re-entrant fetches carry no
    /// referrer, and intercepting them would loop forever.
    pub referrer: Option<String>,
}

impl RequestMeta {
    pub fn new(url: impl Into<String>, referrer: Option<String>) -> Self {
        RequestMeta {
            url: url.into(),
            referrer,
        }
    }
}

/// Path patterns excluded from interception: build-tooling internals,
/// framework-internal assets, and hash-fragment virtual routes.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    /// Path must not start with any of these.
    pub prefixes: Vec<String>,
    /// Path must not contain any of these.
    pub substrings: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        ExclusionRules {
            prefixes: vec![
                "/src".to_string(),
                "/hoisted.".to_string(),
                "/node_modules".to_string(),
                "/.yarn".to_string(),
                "/@fs/".to_string(),
                "/@vite".to_string(),
            ],
            substrings: vec![
                "webworker.js".to_string(),
                ".astro".to_string(),
                "/#/".to_string(),
            ],
        }
    }
}

impl ExclusionRules {
    /// Default rules plus caller-supplied extras (from config).
    pub fn with_extras(extra_prefixes: &[String], extra_substrings: &[String]) -> Self {
        let mut rules = ExclusionRules::default();
        rules.prefixes.extend(extra_prefixes.iter().cloned());
        rules
            .substrings
            .extend(extra_substrings.iter().cloned());
        rules
    }

    /// True if `path` matches any exclusion pattern.
    pub fn excludes(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.substrings.iter().any(|s| path.contains(s.as_str()))
    }
}

/// Decide whether a request must be resolved locally.
///
/// A request is `Local` only if it has a non-empty referrer, the referrer is
/// not the request URL itself, both share an origin, and the path matches no
/// exclusion rule. Everything else is `Passthrough`.
pub fn classify(request: &RequestMeta, rules: &ExclusionRules) -> Classification {
    let referrer = match request.referrer.as_deref() {
        Some(r) if !r.is_empty() => r,
        _ => return Classification::Passthrough,
    };

    // The gateway's own fetch of a passthrough resource can show up with
    // referrer == url; intercepting it again would never terminate.
    if referrer == request.url {
        return Classification::Passthrough;
    }

    if !same_origin(&request.url, referrer) {
        return Classification::Passthrough;
    }

    let path = match url::Url::parse(&request.url) {
        Ok(u) => u.path().to_string(),
        Err(_) => return Classification::Passthrough,
    };

    if rules.excludes(&path) {
        return Classification::Passthrough;
    }

    Classification::Local
}
