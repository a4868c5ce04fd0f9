//! Removal of transient streaming parameters from playback URLs.

/// Query parameters that only describe one request of a stream: byte range,
/// request sequence number and read buffer size.
pub const TRANSIENT_PARAMS: [&str; 3] = ["range", "rn", "rbuf"];

/// Returns `url` without any `range`, `rn` or `rbuf` query parameter.
///
/// Every occurrence is removed regardless of position. All other parameters
/// keep their order and exact encoding, and a fragment is preserved. When no
/// parameter is left the `?` is dropped as well. The result is a fixed point:
/// `sanitize(&sanitize(u)) == sanitize(u)`.
pub fn sanitize(url: &str) -> String {
    strip_params(url, &TRANSIENT_PARAMS)
}

/// Returns `url` without any query parameter whose key is in `keys`.
///
/// Same preservation rules as [`sanitize`].
pub fn strip_params(url: &str, keys: &[&str]) -> String {
    let (head, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let Some(q) = head.find('?') else {
        return url.to_string();
    };
    let (base, query) = (&head[..q], &head[q + 1..]);

    let kept: Vec<&str> = query.split('&').filter(|pair| !keys.contains(&param_key(pair))).collect();

    let mut out = String::with_capacity(url.len());
    out.push_str(base);
    if kept.iter().any(|p| !p.is_empty()) {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    out.push_str(fragment);
    out
}

fn param_key(pair: &str) -> &str {
    pair.split('=').next().unwrap_or(pair)
}
