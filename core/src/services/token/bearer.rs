//! Authorization header parsing

const BEARER_SCHEME: &str = "bearer";

/// Extracts the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty token.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let (scheme, token) = header.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
