//! API key authentication
//!
//! Intake callers present a single static key in the `x-api-key` header.
//! There are no scopes, tenants or key rotation.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Pull the API key out of the request headers.
///
/// A header that is not visible ASCII counts as absent.
pub fn api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Verify a presented API key against the configured secret.
///
/// An absent key never matches.
pub fn verify_api_key(presented: Option<&str>, expected: &str) -> bool {
    match presented {
        Some(key) => constant_time_compare(key, expected),
        None => false,
    }
}

/// Compare two strings without leaking the length of the matching prefix.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let max_len = a.len().max(b.len());

    // Distinct pad bytes so a length mismatch can never compare equal
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_verify_api_key() {
        assert!(verify_api_key(Some("s3cret"), "s3cret"));
        assert!(!verify_api_key(Some("s3cre"), "s3cret"));
        assert!(!verify_api_key(Some("s3cret!"), "s3cret"));
        assert!(!verify_api_key(Some(""), "s3cret"));
        assert!(!verify_api_key(None, "s3cret"));
    }

    #[test]
    fn test_api_key_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(api_key_from_headers(&headers), None);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("abc123"));
        assert_eq!(api_key_from_headers(&headers), Some("abc123"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(b"\xffkey").unwrap());
        assert_eq!(api_key_from_headers(&headers), None);
    }
}
