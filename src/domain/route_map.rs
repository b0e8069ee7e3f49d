//! Path and method classification for the gate.
//!
//! Decides, per request, which protections apply and what access level the
//! route demands. Matching is by whole path segments: `/api` covers `/api`
//! and `/api/users` but not `/apiary`.

use axum::http::Method;

use crate::domain::entities::Role;
use crate::domain::request::is_safe_method;

/// Access level a route demands from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No session needed.
    Public,
    /// Any valid session.
    Session,
    /// A valid session carrying the given role.
    Role(Role),
}

/// Protections that apply to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteClass {
    /// Framework assets and the landing page: no rate limiting, no CSRF.
    pub excluded: bool,
    /// Mutating request to the login endpoint.
    pub login_attempt: bool,
    /// Request under the API prefix.
    pub api: bool,
    /// Mutating request that must carry a valid CSRF token pair.
    pub csrf_validate: bool,
    /// Safe request that should receive a CSRF cookie if it has none.
    pub csrf_issue: bool,
    pub access: Access,
}

/// Route prefixes of the campus portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMap {
    pub api_prefix: String,
    pub login_path: String,
    /// Path segment marking auth routes (`/campus/auth/...`, `/api/auth/...`).
    pub auth_segment: String,
    pub campus_prefix: String,
    /// Sign-in and registration pages under the campus area.
    pub campus_public_prefix: String,
    pub admin_prefix: String,
    pub excluded_prefixes: Vec<String>,
}

impl Default for RouteMap {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            login_path: "/api/auth/login".to_string(),
            auth_segment: "auth".to_string(),
            campus_prefix: "/campus".to_string(),
            campus_public_prefix: "/campus/auth".to_string(),
            admin_prefix: "/admin".to_string(),
            excluded_prefixes: vec!["/_next".to_string(), "/public".to_string()],
        }
    }
}

impl RouteMap {
    /// Classifies a request by method and path.
    pub fn classify(&self, method: &Method, path: &str) -> RouteClass {
        let excluded = self.is_excluded(path);
        let safe = is_safe_method(method);
        let api = !excluded && is_under(path, &self.api_prefix);
        let auth = path.split('/').any(|segment| segment == self.auth_segment);

        RouteClass {
            excluded,
            login_attempt: !excluded && !safe && path == self.login_path,
            api,
            csrf_validate: !excluded && !safe && (api || auth),
            csrf_issue: !excluded && safe,
            access: self.access(path),
        }
    }

    /// Access level demanded by `path`.
    ///
    /// Checked in order: campus auth pages, admin area, campus area.
    pub fn access(&self, path: &str) -> Access {
        if is_under(path, &self.campus_public_prefix) {
            Access::Public
        } else if is_under(path, &self.admin_prefix) {
            Access::Role(Role::Admin)
        } else if is_under(path, &self.campus_prefix) {
            Access::Session
        } else {
            Access::Public
        }
    }

    fn is_excluded(&self, path: &str) -> bool {
        path == "/"
            || self
                .excluded_prefixes
                .iter()
                .any(|prefix| is_under(path, prefix))
    }
}

/// True if `path` equals `prefix` or continues it with a `/`.
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}
