use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::inquiries::domain::{
    Inquiry, InquiryId, InquiryStatus, InquirySubmission, InspectionType, StatusChange,
};
use crate::workflows::inquiries::repository::{
    InquiryNotification, InquiryNotifier, InquiryRepository, NotifyError, RepositoryError,
};
use crate::workflows::inquiries::store::InMemoryInquiryStore;
use crate::workflows::inquiries::{
    inquiry_router, AdminGuard, InquiryService, InquiryServiceConfig,
};

pub(super) fn submission() -> InquirySubmission {
    InquirySubmission {
        name: Some("John Smith".to_string()),
        email: Some("john.smith@example.com".to_string()),
        phone: Some("0412 345 678".to_string()),
        property_address: Some("123 Collins Street, Melbourne VIC 3000".to_string()),
        inspection_type: Some("pre-purchase".to_string()),
        preferred_date: Some("2025-11-15".to_string()),
        message: Some("Looking for a comprehensive pre-purchase inspection".to_string()),
    }
}

pub(super) fn stored_inquiry(
    id: &str,
    status: InquiryStatus,
    inspection_type: InspectionType,
    created_at: DateTime<Utc>,
) -> Inquiry {
    Inquiry {
        id: InquiryId(id.to_string()),
        name: format!("Customer {id}"),
        email: format!("{id}@example.com"),
        phone: "+61 4 1234 5678".to_string(),
        property_address: "8 Chapel Street, Windsor VIC 3181".to_string(),
        inspection_type,
        preferred_date: NaiveDate::from_ymd_opt(2025, 12, 1),
        message: None,
        status,
        created_at,
        updated_at: created_at,
    }
}

pub(super) fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<InquiryNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<InquiryNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl InquiryNotifier for MemoryNotifier {
    fn publish(&self, notification: InquiryNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl InquiryNotifier for OfflineNotifier {
    fn publish(&self, _notification: InquiryNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl InquiryRepository for UnavailableRepository {
    fn insert(&self, _inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_status(
        &self,
        _id: &InquiryId,
        _status: InquiryStatus,
        _at: DateTime<Utc>,
    ) -> Result<StatusChange, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshot(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = InquiryService<InMemoryInquiryStore, MemoryNotifier>;

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryInquiryStore>, MemoryNotifier) {
    build_service_with(InquiryServiceConfig::default())
}

pub(super) fn build_service_with(
    config: InquiryServiceConfig,
) -> (MemoryService, Arc<InMemoryInquiryStore>, MemoryNotifier) {
    let repository = Arc::new(InMemoryInquiryStore::new());
    let notifier = MemoryNotifier::default();
    let service = InquiryService::new(repository.clone(), Arc::new(notifier.clone()), config);
    (service, repository, notifier)
}

pub(super) fn router_with_service(service: MemoryService, guard: AdminGuard) -> axum::Router {
    inquiry_router(Arc::new(service), guard)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
