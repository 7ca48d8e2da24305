//! Bearer token extraction from inbound request headers.
//!
//! Deployment front-ends surface the credential under different names, so
//! several header sources are consulted in a fixed order.

use axum::http::HeaderMap;

/// Header sources consulted in order.
///
/// - `authorization`: the canonical header.
/// - `http_authorization`: CGI-style name forwarded verbatim by FastCGI bridges.
/// - `x-forwarded-authorization`: re-homed by proxies that strip `Authorization`.
pub const BEARER_SOURCES: [&str; 3] = [
    "authorization",
    "http_authorization",
    "x-forwarded-authorization",
];

const BEARER_SCHEME: &str = "Bearer";

/// Extract the bearer token from the first non-empty header source.
///
/// The first source whose trimmed value is non-empty is the only one
/// inspected; later sources are not consulted even when it carries another
/// scheme. Returns `None` when no source is present or when the chosen value
/// holds no `Bearer <token>` match.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = BEARER_SOURCES.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })?;

    find_bearer_token(value).map(str::to_string)
}

/// Find the first `Bearer<one whitespace><non-whitespace run>` in `value`.
///
/// The scheme word is matched case-sensitively and need not start the value.
fn find_bearer_token(value: &str) -> Option<&str> {
    value.match_indices(BEARER_SCHEME).find_map(|(start, _)| {
        let rest = value.get(start + BEARER_SCHEME.len()..)?;
        let mut chars = rest.chars();
        let separator = chars.next()?;
        if !separator.is_whitespace() {
            return None;
        }

        let after = chars.as_str();
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        after.get(..end).filter(|token| !token.is_empty())
    })
}
