//! URL modeling: origin comparison and cache-key path derivation.

/// True when both URLs parse and share scheme://host:port.
///
/// Any parse failure counts as "not same origin"; the classifier treats that
/// as ambiguity and lets the request pass through.
pub fn same_origin(a: &str, b: &str) -> bool {
    let (Ok(a), Ok(b)) = (url::Url::parse(a), url::Url::parse(b)) else {
        return false;
    };
    a.origin() == b.origin()
}

/// Derives the path+query suffix of a full URL, origin stripped.
///
/// This is the resource identity used as the cache key and in companion
/// notifications (e.g. `https://host/db/table.csv?x=1` → `/db/table.csv?x=1`).
/// Returns `None` if the URL cannot be parsed.
pub fn full_url_to_path(full_url: &str) -> Option<String> {
    let parsed = url::Url::parse(full_url).ok()?;
    let mut path = parsed.path().to_string();
    if let Some(q) = parsed.query() {
        path.push('?');
        path.push_str(q);
    }
    Some(path)
}
