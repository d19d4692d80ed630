use crate::cli::ServeArgs;
use crate::infra::{seed_demo_account, AppState, DEMO_TOKEN_VAR};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use heartwise::assessment::{AssessmentService, InMemoryDocumentStore, InMemoryIdentityProvider};
use heartwise::config::AppConfig;
use heartwise::error::AppError;
use heartwise::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryDocumentStore::default());
    let identity = Arc::new(InMemoryIdentityProvider::default());
    if seed_demo_account(&identity, std::env::var(DEMO_TOKEN_VAR).ok()).await {
        info!("demo account enabled");
    } else {
        warn!("{DEMO_TOKEN_VAR} not set; no account can sign in to the in-memory deployment");
    }
    let assessment_service = Arc::new(AssessmentService::new(
        store,
        identity,
        config.history.clone(),
    ));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "heart risk assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
