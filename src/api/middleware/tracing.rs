//! HTTP request/response tracing middleware.
//!
//! Gate rejections are logged by the services that detect them; this layer
//! adds the per-request span and the final status line.

use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// # Logging Behavior
///
/// **On Request:**
/// - Creates a span at `INFO` level with:
///   - HTTP method
///   - URI path
///   - HTTP version
///
/// **On Response:**
/// - Logs at `INFO` level with:
///   - Status code
///   - Latency in milliseconds
///
/// # Example Logs
///
/// ```text
/// INFO request{method=POST uri=/api/auth/login version=HTTP/1.1}: started processing request
/// INFO request{method=POST uri=/api/auth/login version=HTTP/1.1}: finished processing request latency=3 ms status=429
/// ```
///
/// # Integration
///
/// Installed outermost so rejected requests are logged too:
///
/// ```rust,ignore
/// let app = Router::new()
///     .fallback_service(ServeDir::new("public"))
///     .layer(middleware::from_fn_with_state(state.clone(), gate::layer))
///     .layer(tracing::layer());
/// ```
pub fn layer()
-> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
