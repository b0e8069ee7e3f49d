//! Structured view of the request surface the gate actually reads.

use axum::extract::ConnectInfo;
use axum::http::{Method, Request};
use std::net::SocketAddr;

use crate::error::AppError;
use crate::utils::client_ip::forwarded_client;
use crate::utils::cookies::read_cookie;
use crate::utils::path::normalize_path;

/// Cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Header client script echoes the anti-forgery token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Headers consumed by the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedHeaders {
    /// First `X-Forwarded-For` hop, else `X-Real-IP`.
    pub forwarded_client: Option<String>,
    /// `X-CSRF-Token`.
    pub csrf_token: Option<String>,
}

/// Cookies consumed by the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedCookies {
    pub csrf_token: Option<String>,
    pub session: Option<String>,
}

/// The inbound request as seen by the rate limiter, CSRF guard and
/// authorizer.
///
/// Built once per request so the rest of the chain never touches the raw
/// [`Request`].
#[derive(Debug, Clone)]
pub struct GuardRequest {
    pub method: Method,
    /// Percent-decoded, canonical path (see [`normalize_path`]).
    pub path: String,
    pub headers: ConsumedHeaders,
    pub cookies: ConsumedCookies,
    /// Peer socket address, present when the server was started with
    /// connect info.
    pub peer: Option<SocketAddr>,
}

impl GuardRequest {
    /// Captures the consumed parts of `req`.
    ///
    /// `session_cookie` is the name of the cookie the session provider reads.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPath`] if the path does not decode or
    /// contains a `..` segment.
    pub fn from_request<B>(req: &Request<B>, session_cookie: &str) -> Result<Self, AppError> {
        let headers = req.headers();
        let path = normalize_path(req.uri().path()).ok_or(AppError::InvalidPath)?;

        let csrf_header = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self {
            method: req.method().clone(),
            path,
            headers: ConsumedHeaders {
                forwarded_client: forwarded_client(headers),
                csrf_token: csrf_header,
            },
            cookies: ConsumedCookies {
                csrf_token: read_cookie(headers, CSRF_COOKIE),
                session: read_cookie(headers, session_cookie),
            },
            peer: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        })
    }

    /// GET and HEAD are safe; every other method mutates.
    pub fn is_safe_method(&self) -> bool {
        is_safe_method(&self.method)
    }
}

/// GET and HEAD are safe; every other method mutates.
pub fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    #[test]
    fn test_captures_consumed_surface() {
        let req = request(Method::POST, "/api/subjects?page=2")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-csrf-token", "tok")
            .header("cookie", "csrf_token=tok; campus_session=sess")
            .body(Body::empty())
            .unwrap();

        let guard = GuardRequest::from_request(&req, "campus_session").unwrap();

        assert_eq!(guard.method, Method::POST);
        assert_eq!(guard.path, "/api/subjects");
        assert_eq!(guard.headers.forwarded_client.as_deref(), Some("203.0.113.7"));
        assert_eq!(guard.headers.csrf_token.as_deref(), Some("tok"));
        assert_eq!(guard.cookies.csrf_token.as_deref(), Some("tok"));
        assert_eq!(guard.cookies.session.as_deref(), Some("sess"));
        assert!(guard.peer.is_none());
        assert!(!guard.is_safe_method());
    }

    #[test]
    fn test_peer_from_connect_info() {
        let mut req = request(Method::GET, "/").body(Body::empty()).unwrap();
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        let guard = GuardRequest::from_request(&req, "campus_session").unwrap();

        assert_eq!(guard.peer, Some(addr));
        assert_eq!(guard.headers, ConsumedHeaders::default());
        assert_eq!(guard.cookies, ConsumedCookies::default());
    }

    #[test]
    fn test_path_is_decoded_and_normalized() {
        let req = request(Method::GET, "/%63ampus//./grades.html")
            .body(Body::empty())
            .unwrap();

        let guard = GuardRequest::from_request(&req, "campus_session").unwrap();

        assert_eq!(guard.path, "/campus/grades.html");
    }

    #[test]
    fn test_parent_segment_rejected() {
        let req = request(Method::GET, "/public/%2e%2e/admin")
            .body(Body::empty())
            .unwrap();

        let err = GuardRequest::from_request(&req, "campus_session").unwrap_err();

        assert!(matches!(err, AppError::InvalidPath));
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::PUT));
        assert!(!is_safe_method(&Method::PATCH));
        assert!(!is_safe_method(&Method::DELETE));
        assert!(!is_safe_method(&Method::OPTIONS));
    }
}
