#![allow(dead_code)]

use axum::{
    Extension, Json, Router,
    http::{Method, Uri},
};
use axum_test::TestServer;
use campus_gate::config::{Config, Environment};
use campus_gate::domain::entities::{Role, Session};
use campus_gate::infrastructure::rate_store::MemoryRateStore;
use campus_gate::infrastructure::session::SignedCookieSessions;
use campus_gate::routes::gated;
use campus_gate::state::AppState;
use campus_gate::utils::client_ip::IdentitySource;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        environment: Environment::Development,
        session_secret: SECRET.to_string(),
        session_cookie: "campus_session".to_string(),
        sign_in_path: "/campus/auth/login".to_string(),
        static_dir: "public".to_string(),
        redis_url: None,
        login_max_requests: 5,
        login_window_secs: 60,
        api_max_requests: 50,
        api_window_secs: 60,
        sweep_interval_secs: 60,
        identity_source: IdentitySource::Forwarded,
    }
}

pub fn create_test_state(config: &Config) -> (AppState, Arc<MemoryRateStore>) {
    let store = Arc::new(MemoryRateStore::new());
    let sessions = Arc::new(SignedCookieSessions::new(config.session_secret.clone()));
    let state = AppState::new(config, store.clone(), sessions);
    (state, store)
}

/// Stands in for the campus frontend and API handlers.
///
/// Echoes what reached it so tests can tell a pass-through from a rejection.
async fn downstream(
    method: Method,
    uri: Uri,
    session: Option<Extension<Session>>,
) -> Json<Value> {
    Json(json!({
        "reached": true,
        "method": method.as_str(),
        "path": uri.path(),
        "user": session.map(|Extension(s)| s.user_id),
    }))
}

pub fn create_test_server_with(config: &Config) -> (TestServer, Arc<MemoryRateStore>) {
    let (state, store) = create_test_state(config);
    let app = gated(Router::new().fallback(downstream), state);
    (TestServer::new(app).unwrap(), store)
}

/// Serves over a real socket so requests carry the peer address.
pub fn create_connected_server_with(config: &Config) -> (TestServer, Arc<MemoryRateStore>) {
    let (state, store) = create_test_state(config);
    let app = gated(Router::new().fallback(downstream), state)
        .into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder().http_transport().build(app).unwrap();
    (server, store)
}

pub fn create_test_server() -> TestServer {
    create_test_server_with(&test_config()).0
}

/// `Cookie` header value carrying a valid session for `role`.
pub fn session_cookie(user_id: &str, role: Role) -> String {
    let session = Session::new(user_id, role, Utc::now() + Duration::hours(1));
    let token = SignedCookieSessions::new(SECRET).issue(&session).unwrap();
    format!("campus_session={token}")
}
