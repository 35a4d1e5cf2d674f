//! Contact inquiry intake, status tracking, statistics, and notifications.

pub mod domain;
pub mod guard;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Inquiry, InquiryId, InquiryQuery, InquiryStatus, InquirySubmission, InspectionType,
    NewInquiry, StatusChange, UnknownInspectionType, UnknownStatus,
};
pub use guard::{AccessDenied, AdminGuard};
pub use repository::{
    InquiryNotification, InquiryNotifier, InquiryRepository, NotificationTemplate, NotifyError,
    RepositoryError,
};
pub use router::inquiry_router;
pub use service::{InquiryService, InquiryServiceConfig, InquiryServiceError};
pub use stats::InquiryStats;
pub use store::{InMemoryInquiryStore, JsonFileInquiryStore};
pub use validation::{FieldLimits, InquiryValidator, ValidationErrors};
