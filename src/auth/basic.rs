//! Basic HTTP authentication credentials (RFC 7617).

use base64::{engine::general_purpose::URL_SAFE, Engine as _};

/// Encodes `username:password` with the padded URL-safe base64 alphabet.
///
/// The result is the header value without the `Basic ` prefix.
///
/// # Examples
///
/// ```
/// use reqdef::auth::basic::encode_credentials;
///
/// assert_eq!(encode_credentials("alice", "secret"), "YWxpY2U6c2VjcmV0");
/// ```
pub fn encode_credentials(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    URL_SAFE.encode(credentials.as_bytes())
}
