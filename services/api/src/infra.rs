use axum::http::{header, HeaderValue, Method};
use bluecheck::config::{AllowedOrigins, AppConfig, CorsConfig};
use bluecheck::workflows::inquiries::{
    Inquiry, InquiryId, InquiryNotification, InquiryNotifier, InquiryRepository,
    InquiryServiceConfig, InquiryStatus, InMemoryInquiryStore, JsonFileInquiryStore, NotifyError,
    RepositoryError, StatusChange,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store selected by configuration: a JSON file when a data path is set, memory otherwise.
#[derive(Debug)]
pub(crate) enum InquiryStoreBackend {
    Memory(InMemoryInquiryStore),
    File(JsonFileInquiryStore),
}

impl InquiryStoreBackend {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, RepositoryError> {
        match &config.inquiries.data_path {
            Some(path) => Ok(Self::File(JsonFileInquiryStore::open(path)?)),
            None => {
                warn!("INQUIRY_DATA_PATH not set; inquiries are kept in memory only");
                Ok(Self::Memory(InMemoryInquiryStore::new()))
            }
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::File(store) => format!("file:{}", store.path().display()),
        }
    }

    fn inner(&self) -> &dyn InquiryRepository {
        match self {
            Self::Memory(store) => store,
            Self::File(store) => store,
        }
    }
}

impl InquiryRepository for InquiryStoreBackend {
    fn insert(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        self.inner().insert(inquiry)
    }

    fn fetch(&self, id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        self.inner().fetch(id)
    }

    fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        self.inner().list(status)
    }

    fn set_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange, RepositoryError> {
        self.inner().set_status(id, status, at)
    }

    fn snapshot(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        self.inner().snapshot()
    }
}

/// Outbox that records notifications as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingNotifier;

impl InquiryNotifier for TracingNotifier {
    fn publish(&self, notification: InquiryNotification) -> Result<(), NotifyError> {
        info!(
            template = notification.template.label(),
            inquiry_id = %notification.inquiry_id,
            recipient = %notification.recipient,
            details = ?notification.details,
            "notification queued"
        );
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<InquiryNotification>>>,
}

impl InquiryNotifier for InMemoryNotifier {
    fn publish(&self, notification: InquiryNotification) -> Result<(), NotifyError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("outbox mutex poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<InquiryNotification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn service_config(config: &AppConfig) -> InquiryServiceConfig {
    InquiryServiceConfig {
        staff_email: config.inquiries.staff_email.clone(),
        default_list_limit: config.inquiries.list_limit,
    }
}

pub(crate) fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    match &config.allowed_origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(%origin, error = %err, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            info!(origins = origins.len(), "CORS restricted to configured origins");
            layer.allow_origin(origins)
        }
    }
}
