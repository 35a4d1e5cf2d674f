use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Inquiry, InquiryId, InquiryStatus, StatusChange};

/// Storage abstraction so the service can be exercised against in-memory fakes.
pub trait InquiryRepository: Send + Sync {
    /// Persist a new record. Fails with [`RepositoryError::Conflict`] if the id is taken.
    fn insert(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError>;
    fn fetch(&self, id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError>;
    /// Records matching `status` (all when `None`), newest first by `created_at`.
    fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError>;
    /// Replace the status in place. `updated_at` only moves when the status actually changes.
    fn set_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange, RepositoryError>;
    /// Point-in-time copy of every record, in no particular order.
    fn snapshot(&self) -> Result<Vec<Inquiry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write inquiries to {path}: {source}", path = .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("inquiry data at {path} is unreadable: {source}", path = .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outbound hook for customer and staff e-mails (or any other delivery channel).
pub trait InquiryNotifier: Send + Sync {
    fn publish(&self, notification: InquiryNotification) -> Result<(), NotifyError>;
}

/// Message templates the desk sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    /// Confirmation to the customer that the request arrived.
    InquiryReceived,
    /// Alert to the staff inbox about a fresh request.
    NewInquiry,
    InquiryStatusChanged,
}

impl NotificationTemplate {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationTemplate::InquiryReceived => "inquiry_received",
            NotificationTemplate::NewInquiry => "new_inquiry",
            NotificationTemplate::InquiryStatusChanged => "inquiry_status_changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryNotification {
    pub template: NotificationTemplate,
    pub inquiry_id: InquiryId,
    pub recipient: String,
    pub details: BTreeMap<String, String>,
}

impl InquiryNotification {
    pub(crate) fn received(inquiry: &Inquiry) -> Self {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), inquiry.name.clone());
        details.insert(
            "inspection_type".to_string(),
            inquiry.inspection_type.label().to_string(),
        );
        if let Some(date) = inquiry.preferred_date {
            details.insert("preferred_date".to_string(), date.to_string());
        }

        Self {
            template: NotificationTemplate::InquiryReceived,
            inquiry_id: inquiry.id.clone(),
            recipient: inquiry.email.clone(),
            details,
        }
    }

    pub(crate) fn staff_alert(inquiry: &Inquiry, staff_email: &str) -> Self {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), inquiry.name.clone());
        details.insert("email".to_string(), inquiry.email.clone());
        details.insert("phone".to_string(), inquiry.phone.clone());
        details.insert(
            "property_address".to_string(),
            inquiry.property_address.clone(),
        );
        details.insert(
            "inspection_type".to_string(),
            inquiry.inspection_type.label().to_string(),
        );
        if let Some(date) = inquiry.preferred_date {
            details.insert("preferred_date".to_string(), date.to_string());
        }
        if let Some(message) = &inquiry.message {
            details.insert("message".to_string(), message.clone());
        }

        Self {
            template: NotificationTemplate::NewInquiry,
            inquiry_id: inquiry.id.clone(),
            recipient: staff_email.to_string(),
            details,
        }
    }

    pub(crate) fn status_changed(change: &StatusChange) -> Self {
        let mut details = BTreeMap::new();
        details.insert("previous".to_string(), change.previous.label().to_string());
        details.insert(
            "status".to_string(),
            change.inquiry.status.label().to_string(),
        );

        Self {
            template: NotificationTemplate::InquiryStatusChanged,
            inquiry_id: change.inquiry.id.clone(),
            recipient: change.inquiry.email.clone(),
            details,
        }
    }
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
