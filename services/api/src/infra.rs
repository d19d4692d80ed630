use heartwise::assessment::{AuthenticatedUser, InMemoryIdentityProvider, UserId};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) const DEMO_TOKEN_VAR: &str = "HEARTWISE_DEMO_TOKEN";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn demo_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId("demo".to_string()),
        email: "demo@heartwise.local".to_string(),
    }
}

/// Bind the demo account to `token` so the in-memory deployment can be exercised over HTTP.
pub(crate) async fn seed_demo_account(
    identity: &InMemoryIdentityProvider,
    token: Option<String>,
) -> bool {
    match token.filter(|token| !token.trim().is_empty()) {
        Some(token) => {
            identity.register_with_token(demo_user(), token.trim()).await;
            true
        }
        None => false,
    }
}
