mod common;

use axum::http::StatusCode;
use axum_test::TestResponse;

const EXPECTED: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains; preload",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

fn assert_security_headers(response: &TestResponse) {
    let headers = response.headers();

    for (name, value) in EXPECTED {
        assert_eq!(headers[name], value, "{name}");
    }

    let csp = headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("frame-ancestors 'none'"));
    assert!(csp.contains("object-src 'none'"));

    let permissions = headers["permissions-policy"].to_str().unwrap();
    assert!(permissions.contains("camera=()"));
    assert!(permissions.contains("browsing-topics=()"));
}

#[tokio::test]
async fn test_headers_on_success() {
    let server = common::create_test_server();

    let response = server.get("/api/subjects").await;

    response.assert_status_ok();
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_excluded_path() {
    let server = common::create_test_server();

    let response = server.get("/_next/static/chunk.js").await;

    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_rate_limit() {
    let mut config = common::test_config();
    config.api_max_requests = 1;
    let (server, _store) = common::create_test_server_with(&config);

    server.get("/api/subjects").await.assert_status_ok();
    let response = server.get("/api/subjects").await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_csrf_rejection() {
    let server = common::create_test_server();

    let response = server.post("/api/subjects").await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_redirect() {
    let server = common::create_test_server();

    let response = server.get("/admin").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_health() {
    let server = common::create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_security_headers(&response);
}
