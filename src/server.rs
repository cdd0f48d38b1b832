use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::mailer::ResendMailer;
use crate::routes::{intake_router, IntakeState, Outbound};
use crate::telemetry;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
struct ServiceState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

pub async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let outbound = match config.email.delivery() {
        Some(delivery) => Some(Arc::new(Outbound {
            mailer: ResendMailer::new(delivery.api_key)?,
            from_address: delivery.from_address,
            to_address: delivery.to_address,
        })),
        None => {
            warn!("RESEND_API_KEY / FROM_EMAIL / TO_EMAIL not fully set; submissions will be rejected");
            None
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let service_state = ServiceState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = intake_router(IntakeState { outbound })
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(service_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan intake relay ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn readiness_endpoint(Extension(state): Extension<ServiceState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<ServiceState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
