use crate::cli::ServeArgs;
use crate::infra::{build_dispatcher, AppState};
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use return_risk::config::AppConfig;
use return_risk::error::AppError;
use return_risk::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.predictor.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; fallback predictions will fail");
    }
    let dispatcher = build_dispatcher(&config.predictor)?;

    let app = with_risk_routes(dispatcher)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = %config.predictor.model,
        "return risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
