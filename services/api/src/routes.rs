use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use bluecheck::workflows::inquiries::{
    inquiry_router, AdminGuard, InquiryNotifier, InquiryRepository, InquiryService,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) const API_BANNER: &str = "BlueCheck Inspections API is running";

pub(crate) fn with_inquiry_routes<R, N>(
    service: Arc<InquiryService<R, N>>,
    guard: AdminGuard,
) -> axum::Router
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    inquiry_router(service, guard)
        .route("/api/", get(api_root))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn api_root() -> Json<serde_json::Value> {
    Json(json!({ "message": API_BANNER }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
