use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::domain::{Inquiry, InquiryId, InquiryQuery, InquiryStatus};
use super::guard::{require_admin, AdminGuard};
use super::repository::{InquiryNotifier, InquiryRepository, RepositoryError};
use super::service::{InquiryService, InquiryServiceError};
use super::stats::InquiryStats;
use super::validation::{ValidationErrors, FIELD_BODY};

/// Router exposing the contact form intake and the dashboard endpoints.
///
/// Submission is always public; everything else sits behind `guard`.
pub fn inquiry_router<R, N>(service: Arc<InquiryService<R, N>>, guard: AdminGuard) -> Router
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let dashboard = Router::new()
        .route("/api/contact/inquiries", get(list_handler::<R, N>))
        .route(
            "/api/contact/inquiry/:inquiry_id",
            get(fetch_handler::<R, N>),
        )
        .route(
            "/api/contact/inquiry/:inquiry_id/status",
            patch(status_handler::<R, N>),
        )
        .route("/api/contact/stats", get(stats_handler::<R, N>))
        .route_layer(middleware::from_fn_with_state(guard, require_admin))
        .with_state(service.clone());

    Router::new()
        .route("/api/contact/inquiry", post(submit_handler::<R, N>))
        .with_state(service)
        .merge(dashboard)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl ListParams {
    fn into_query(self) -> Result<InquiryQuery, InquiryServiceError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(label) => Some(label.parse::<InquiryStatus>()?),
        };
        Ok(InquiryQuery {
            status,
            limit: self.limit,
        })
    }
}

const FIELD_STATUS: &str = "status";

/// Unreadable bodies are reported in the same field map as rule failures.
fn body_rejection(rejection: JsonRejection) -> InquiryServiceError {
    debug!(error = %rejection, "request body rejected");
    ValidationErrors::single(FIELD_BODY, rejection.body_text()).into()
}

pub(crate) fn status_label(body: &Value) -> Result<&str, ValidationErrors> {
    match body.get(FIELD_STATUS) {
        Some(Value::String(label)) => Ok(label.as_str()),
        None | Some(Value::Null) => Err(ValidationErrors::single(FIELD_STATUS, "status required")),
        Some(_) => Err(ValidationErrors::single(FIELD_STATUS, "status must be text")),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<InquiryService<R, N>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Inquiry>), InquiryServiceError>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let Json(body) = payload.map_err(body_rejection)?;
    let inquiry = service.submit_json(&body)?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<InquiryService<R, N>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Inquiry>>, InquiryServiceError>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let query = params.into_query()?;
    Ok(Json(service.list(query)?))
}

pub(crate) async fn fetch_handler<R, N>(
    State(service): State<Arc<InquiryService<R, N>>>,
    Path(inquiry_id): Path<String>,
) -> Result<Json<Inquiry>, InquiryServiceError>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    Ok(Json(service.get(&InquiryId(inquiry_id))?))
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<InquiryService<R, N>>>,
    Path(inquiry_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Inquiry>, InquiryServiceError>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let Json(body) = payload.map_err(body_rejection)?;
    let label = status_label(&body)?;
    let inquiry = service.update_status_label(&InquiryId(inquiry_id), label)?;
    Ok(Json(inquiry))
}

pub(crate) async fn stats_handler<R, N>(
    State(service): State<Arc<InquiryService<R, N>>>,
) -> Result<Json<InquiryStats>, InquiryServiceError>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    Ok(Json(service.stats()?))
}

impl IntoResponse for InquiryServiceError {
    fn into_response(self) -> Response {
        match self {
            InquiryServiceError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            InquiryServiceError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "inquiry not found",
                    "inquiry_id": id,
                })),
            )
                .into_response(),
            InquiryServiceError::InvalidStatus(unknown) => {
                let allowed: Vec<&str> = InquiryStatus::ALL
                    .into_iter()
                    .map(InquiryStatus::label)
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "error": unknown.to_string(),
                        "allowed": allowed,
                    })),
                )
                    .into_response()
            }
            InquiryServiceError::Repository(RepositoryError::Conflict) => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "inquiry already exists" })),
            )
                .into_response(),
            InquiryServiceError::Repository(other) => {
                error!(error = %other, "inquiry store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
