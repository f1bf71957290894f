//! Conditional GET support shared by policy, manifest and file delivery.
//!
//! Entity tags are the quoted lowercase SHA-256 hex digest of the exact body
//! bytes, so identical content always yields the identical tag. `If-None-Match`
//! is compared with the weak comparison function of RFC 9110: `W/` prefixes are
//! ignored, lists are split on commas and `*` matches any current
//! representation.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

/// Cache-Control for validated content: clients may keep it but must revalidate.
pub const REVALIDATE: &str = "no-cache";

/// Cache-Control for content that must never be reused.
pub const NO_STORE: &str = "no-store";

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Strong entity tag for a body.
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", sha256_hex(body))
}

fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// True when the request's `If-None-Match` matches `etag`.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    let current = opaque_tag(etag);
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque_tag(candidate) == current)
}

/// Answer a GET for `body` honoring `If-None-Match`.
///
/// A matching validator yields 304 with an empty body and the same `ETag`;
/// otherwise 200 with the body, its content type and `ETag`.
pub fn respond(headers: &HeaderMap, body: Vec<u8>, content_type: &'static str) -> Response {
    let etag = etag_for(&body);
    let etag_value = match HeaderValue::from_str(&etag) {
        Ok(value) => value,
        // Hex digests are always valid header values.
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    if if_none_match(headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag_value),
                (header::CACHE_CONTROL, HeaderValue::from_static(REVALIDATE)),
            ],
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::ETAG, etag_value),
            (header::CACHE_CONTROL, HeaderValue::from_static(REVALIDATE)),
        ],
        Body::from(body),
    )
        .into_response()
}

/// 200 response that must not be cached and carries no validator.
pub fn uncacheable(body: impl Into<Body>, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE)),
        ],
        body.into(),
    )
        .into_response()
}
