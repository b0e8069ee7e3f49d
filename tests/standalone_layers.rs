mod common;

use axum::{Router, http::StatusCode, middleware, routing::any};
use axum_test::TestServer;
use campus_gate::api::middleware::{authorize, csrf, rate_limit, security_headers};
use campus_gate::domain::entities::Role;

async fn ok() -> &'static str {
    "ok"
}

#[tokio::test]
async fn test_api_layer_alone() {
    let mut config = common::test_config();
    config.api_max_requests = 1;
    let (state, _store) = common::create_test_state(&config);

    let app = Router::new()
        .route("/subjects", any(ok))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::api_layer))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    server.get("/subjects").await.assert_status_ok();

    let response = server.get("/subjects").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    // Security headers belong to the gate, not to this layer.
    assert!(!response.headers().contains_key("x-frame-options"));
}

#[tokio::test]
async fn test_login_layer_alone() {
    let (state, _store) = common::create_test_state(&common::test_config());

    let app = Router::new()
        .route("/login", any(ok))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::login_layer))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    for _ in 0..5 {
        server.post("/login").await.assert_status_ok();
    }
    server
        .post("/login")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_csrf_layer_alone() {
    let (state, _store) = common::create_test_state(&common::test_config());

    let app = Router::new()
        .route("/form", any(ok))
        .layer(middleware::from_fn_with_state(state.clone(), csrf::layer))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/form").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("set-cookie"));

    server
        .post("/form")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/form")
        .add_header("cookie", "csrf_token=t")
        .add_header("x-csrf-token", "t")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_authorize_layer_alone() {
    let (state, _store) = common::create_test_state(&common::test_config());

    let app = Router::new()
        .route("/admin/users", any(ok))
        .layer(middleware::from_fn_with_state(state.clone(), authorize::layer))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    server
        .get("/admin/users")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    server
        .get("/admin/users")
        .add_header("cookie", common::session_cookie("admin-1", Role::Admin))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_security_headers_layer_alone() {
    let app = Router::new()
        .route("/", any(ok))
        .layer(middleware::from_fn(security_headers::layer));
    let server = TestServer::new(app).unwrap();

    let response = server.get("/").await;

    response.assert_status_ok();
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
