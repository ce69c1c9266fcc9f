//! URL origin, domain, and link resolution helpers.

use reqwest::Url;

/// Extracts the scheme+host origin from a URL.
///
/// Given `"https://forums.redflagdeals.com/search.php?q=tv"`, returns
/// `"https://forums.redflagdeals.com"`.
#[must_use]
pub fn extract_origin(url: &str) -> String {
    Url::parse(url).map_or_else(
        |e| {
            tracing::warn!(
                url,
                error = %e,
                "could not parse URL; falling back to string split for origin extraction"
            );
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

/// Resolves a listing `href` against the source's base URL.
///
/// Absolute links pass through unchanged apart from fragment removal.
/// Returns `None` for empty, fragment-only, `mailto:` and `javascript:` links,
/// and for anything that does not resolve to an `http(s)` URL.
#[must_use]
pub fn resolve_url(raw: &str, base: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw.starts_with('#')
        || raw.starts_with("mailto:")
        || raw.starts_with("javascript:")
    {
        return None;
    }

    let mut url = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => Url::parse(base).ok()?.join(raw).ok()?,
    };

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}
