//! Cookie header parsing and `Set-Cookie` formatting.

use axum::http::{HeaderMap, header};

/// Extracts a single cookie value from the request `Cookie` header(s).
///
/// Handles multiple cookies per header by:
/// - Splitting on semicolons
/// - Matching the exact cookie name
/// - Ignoring every other pair
///
/// Empty values are treated as absent. Browsers may send several `Cookie`
/// headers over HTTP/2, so every header instance is searched.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, "theme=dark; csrf_token=abc".parse().unwrap());
///
/// assert_eq!(read_cookie(&headers, "csrf_token").as_deref(), Some("abc"));
/// ```
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name && !value.is_empty() => {
                    Some(value.to_string())
                }
                _ => None,
            }
        })
}

/// Formats a script-readable `Set-Cookie` value scoped to `Path=/` with
/// `SameSite=Strict`.
///
/// `HttpOnly` is never set: client script must be able to read the value.
pub fn format_script_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
