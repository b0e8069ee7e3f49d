use std::sync::Arc;

use crate::application::services::{Authorizer, CsrfGuard, RateLimiter};
use crate::config::Config;
use crate::domain::repositories::{RateStore, SessionProvider};
use crate::domain::route_map::RouteMap;
use crate::utils::client_ip::IdentitySource;

/// Shared state handed to every middleware and handler.
#[derive(Clone)]
pub struct AppState {
    pub rate_store: Arc<dyn RateStore>,
    pub login_limiter: Arc<RateLimiter>,
    pub api_limiter: Arc<RateLimiter>,
    pub csrf: CsrfGuard,
    pub authorizer: Arc<Authorizer>,
    pub routes: Arc<RouteMap>,
    pub identity_source: IdentitySource,
    pub session_cookie: String,
}

impl AppState {
    /// Wires the gate's services from configuration.
    ///
    /// Both limiters share `rate_store`; their keys are namespaced by scope.
    pub fn new(
        config: &Config,
        rate_store: Arc<dyn RateStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        let login_limiter = RateLimiter::new("login", config.login_policy(), rate_store.clone());
        let api_limiter = RateLimiter::new("api", config.api_policy(), rate_store.clone());

        Self {
            rate_store,
            login_limiter: Arc::new(login_limiter),
            api_limiter: Arc::new(api_limiter),
            csrf: CsrfGuard::new(config.secure_cookies()),
            authorizer: Arc::new(Authorizer::new(sessions, config.sign_in_path.clone())),
            routes: Arc::new(RouteMap::default()),
            identity_source: config.identity_source,
            session_cookie: config.session_cookie.clone(),
        }
    }
}
