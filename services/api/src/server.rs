use crate::cli::ServeArgs;
use crate::infra::{build_dispatch, AppState, InMemoryEvaluationRepository};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruit_ai::config::AppConfig;
use recruit_ai::error::AppError;
use recruit_ai::telemetry;
use recruit_ai::workflows::screening::ScreeningService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let dispatch = Arc::new(build_dispatch(&config.ai));
    let screening_service = Arc::new(ScreeningService::new(
        repository,
        dispatch,
        config.evaluation.clone(),
    ));

    let app = with_screening_routes(screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        threshold = config.evaluation.approval_threshold,
        ai_enabled = config.ai.enabled,
        "screening engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
