use crate::cli::ServeArgs;
use crate::infra::{cors_layer, service_config, AppState, InquiryStoreBackend, TracingNotifier};
use crate::routes::with_inquiry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bluecheck::config::AppConfig;
use bluecheck::error::AppError;
use bluecheck::telemetry;
use bluecheck::workflows::inquiries::{AdminGuard, InquiryService};
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = InquiryStoreBackend::from_config(&config)?;
    let store_label = store.describe();
    let inquiry_service = Arc::new(InquiryService::new(
        Arc::new(store),
        Arc::new(TracingNotifier),
        service_config(&config),
    ));

    let guard = AdminGuard::from_config(config.inquiries.admin_token.as_deref());
    if !guard.is_enforced() {
        warn!("INQUIRY_ADMIN_TOKEN not set; dashboard endpoints are unauthenticated");
    }

    let app = with_inquiry_routes(inquiry_service, guard)
        .layer(cors_layer(&config.cors))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = %store_label, "inquiry desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
