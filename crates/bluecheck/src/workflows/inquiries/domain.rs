use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned to an inquiry when it is stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub String);

impl InquiryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status tracked from submission through completion.
///
/// Any status may move to any other; there is no terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Scheduled,
    Completed,
    Cancelled,
}

impl InquiryStatus {
    pub const ALL: [InquiryStatus; 5] = [
        InquiryStatus::New,
        InquiryStatus::Contacted,
        InquiryStatus::Scheduled,
        InquiryStatus::Completed,
        InquiryStatus::Cancelled,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Scheduled => "scheduled",
            InquiryStatus::Completed => "completed",
            InquiryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InquiryStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == trimmed)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Raised when a status label is outside the five recognized values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized inquiry status '{0}'")]
pub struct UnknownStatus(pub String);

/// Category of inspection the customer is asking for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionType {
    #[default]
    PrePurchase,
    NewHome,
    PreHandover,
    Dilapidation,
    SafeToRent,
}

impl InspectionType {
    pub const ALL: [InspectionType; 5] = [
        InspectionType::PrePurchase,
        InspectionType::NewHome,
        InspectionType::PreHandover,
        InspectionType::Dilapidation,
        InspectionType::SafeToRent,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            InspectionType::PrePurchase => "pre-purchase",
            InspectionType::NewHome => "new-home",
            InspectionType::PreHandover => "pre-handover",
            InspectionType::Dilapidation => "dilapidation",
            InspectionType::SafeToRent => "safe-to-rent",
        }
    }
}

impl fmt::Display for InspectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InspectionType {
    type Err = UnknownInspectionType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == trimmed)
            .ok_or_else(|| UnknownInspectionType(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported inspection type '{0}'")]
pub struct UnknownInspectionType(pub String);

/// Raw contact-form payload. Every field is optional so that missing and malformed values
/// both surface as field-level validation errors. HTTP bodies are read through
/// [`InquiryValidator::validate_json`](super::validation::InquiryValidator::validate_json),
/// which also reports fields of the wrong JSON type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquirySubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_address: Option<String>,
    pub inspection_type: Option<String>,
    pub preferred_date: Option<String>,
    pub message: Option<String>,
}

/// Normalized fields that passed validation and are ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub property_address: String,
    pub inspection_type: InspectionType,
    pub preferred_date: Option<NaiveDate>,
    pub message: Option<String>,
}

impl NewInquiry {
    /// Stamp identity and timestamps onto the validated fields.
    pub fn into_inquiry(self, id: InquiryId, received_at: DateTime<Utc>) -> Inquiry {
        Inquiry {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            property_address: self.property_address,
            inspection_type: self.inspection_type,
            preferred_date: self.preferred_date,
            message: self.message,
            status: InquiryStatus::New,
            created_at: received_at,
            updated_at: received_at,
        }
    }
}

/// A stored inquiry. Only `status` (and with it `updated_at`) changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub property_address: String,
    pub inspection_type: InspectionType,
    pub preferred_date: Option<NaiveDate>,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a status update: the stored record plus the status it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: InquiryStatus,
    pub inquiry: Inquiry,
}

impl StatusChange {
    pub fn is_effective(&self) -> bool {
        self.previous != self.inquiry.status
    }
}

/// Filter accepted by the dashboard listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InquiryQuery {
    pub status: Option<InquiryStatus>,
    pub limit: Option<usize>,
}

impl InquiryQuery {
    pub fn with_status(status: InquiryStatus) -> Self {
        Self {
            status: Some(status),
            limit: None,
        }
    }
}
