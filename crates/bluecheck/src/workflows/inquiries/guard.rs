use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Optional bearer-token check in front of the dashboard routes.
///
/// An unconfigured guard lets every request through.
#[derive(Clone, Default)]
pub struct AdminGuard {
    token: Option<Arc<str>>,
}

impl AdminGuard {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            token: Some(Arc::from(token)),
        }
    }

    pub fn from_config(token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|token| !token.is_empty()) {
            Some(token) => Self::with_token(token),
            None => Self::open(),
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.token.is_some()
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AccessDenied> {
        let Some(expected) = &self.token else {
            return Ok(());
        };

        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AccessDenied::MissingCredentials)?;

        let matches: bool = presented.as_bytes().ct_eq(expected.as_bytes()).into();
        if matches {
            Ok(())
        } else {
            Err(AccessDenied::InvalidToken)
        }
    }
}

/// Token from an `Authorization` value. The scheme name is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

impl fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGuard")
            .field("enforced", &self.is_enforced())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("admin credentials required")]
    MissingCredentials,
    #[error("admin token rejected")]
    InvalidToken,
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

/// Middleware rejecting dashboard requests that lack the configured token.
pub async fn require_admin(
    State(guard): State<AdminGuard>,
    request: Request,
    next: Next,
) -> Response {
    match guard.authorize(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(denied) => {
            warn!(
                method = %request.method(),
                path = request.uri().path(),
                reason = %denied,
                "dashboard access denied"
            );
            denied.into_response()
        }
    }
}
