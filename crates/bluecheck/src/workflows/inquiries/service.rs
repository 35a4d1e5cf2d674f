use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::domain::{
    Inquiry, InquiryId, InquiryQuery, InquirySubmission, InquiryStatus, NewInquiry,
    StatusChange, UnknownStatus,
};
use super::repository::{
    InquiryNotification, InquiryNotifier, InquiryRepository, RepositoryError,
};
use super::stats::InquiryStats;
use super::validation::{InquiryValidator, ValidationErrors};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 1000;

/// Tunables for the inquiry service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryServiceConfig {
    /// Inbox that receives a copy of every new inquiry.
    pub staff_email: Option<String>,
    pub default_list_limit: usize,
}

impl Default for InquiryServiceConfig {
    fn default() -> Self {
        Self {
            staff_email: None,
            default_list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Service composing validation, the injected store, statistics, and notifications.
pub struct InquiryService<R, N> {
    validator: InquiryValidator,
    repository: Arc<R>,
    notifier: Arc<N>,
    config: InquiryServiceConfig,
}

impl<R, N> InquiryService<R, N>
where
    R: InquiryRepository + 'static,
    N: InquiryNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: InquiryServiceConfig) -> Self {
        Self::with_validator(InquiryValidator::default(), repository, notifier, config)
    }

    pub fn with_validator(
        validator: InquiryValidator,
        repository: Arc<R>,
        notifier: Arc<N>,
        config: InquiryServiceConfig,
    ) -> Self {
        Self {
            validator,
            repository,
            notifier,
            config,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Validate and store a new inquiry, then notify the customer and staff inbox.
    pub fn submit(&self, submission: InquirySubmission) -> Result<Inquiry, InquiryServiceError> {
        let new_inquiry = self.validator.validate(submission).map_err(rejected)?;
        self.accept(new_inquiry)
    }

    /// Same as [`Self::submit`] for an untyped JSON body straight off the wire.
    pub fn submit_json(&self, body: &Value) -> Result<Inquiry, InquiryServiceError> {
        let new_inquiry = self.validator.validate_json(body).map_err(rejected)?;
        self.accept(new_inquiry)
    }

    fn accept(&self, new_inquiry: NewInquiry) -> Result<Inquiry, InquiryServiceError> {
        let inquiry = new_inquiry.into_inquiry(InquiryId::generate(), Utc::now());
        let stored = self.repository.insert(inquiry)?;

        info!(
            inquiry_id = %stored.id,
            inspection_type = %stored.inspection_type,
            "inquiry received"
        );

        self.notify(InquiryNotification::received(&stored));
        if let Some(staff_email) = &self.config.staff_email {
            self.notify(InquiryNotification::staff_alert(&stored, staff_email));
        }

        Ok(stored)
    }

    /// List inquiries newest first, optionally narrowed to one status.
    pub fn list(&self, query: InquiryQuery) -> Result<Vec<Inquiry>, InquiryServiceError> {
        let limit = query
            .limit
            .unwrap_or(self.config.default_list_limit)
            .min(MAX_LIST_LIMIT);
        let mut records = self.repository.list(query.status)?;
        records.truncate(limit);
        Ok(records)
    }

    pub fn get(&self, id: &InquiryId) -> Result<Inquiry, InquiryServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| InquiryServiceError::NotFound(id.clone()))
    }

    /// Move an inquiry to `status`. Repeating the current status is a successful no-op.
    pub fn update_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
    ) -> Result<Inquiry, InquiryServiceError> {
        let change = self
            .repository
            .set_status(id, status, Utc::now())
            .map_err(|err| match err {
                RepositoryError::NotFound => InquiryServiceError::NotFound(id.clone()),
                other => InquiryServiceError::Repository(other),
            })?;

        if change.is_effective() {
            info!(
                inquiry_id = %id,
                from = %change.previous,
                to = %status,
                "inquiry status updated"
            );
            self.notify(InquiryNotification::status_changed(&change));
        }

        let StatusChange { inquiry, .. } = change;
        Ok(inquiry)
    }

    /// Same as [`Self::update_status`] for a raw status label from the wire.
    pub fn update_status_label(
        &self,
        id: &InquiryId,
        label: &str,
    ) -> Result<Inquiry, InquiryServiceError> {
        let status = label.parse::<InquiryStatus>()?;
        self.update_status(id, status)
    }

    pub fn stats(&self) -> Result<InquiryStats, InquiryServiceError> {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<InquiryStats, InquiryServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(InquiryStats::from_snapshot(&snapshot, now))
    }

    fn notify(&self, notification: InquiryNotification) {
        let template = notification.template.label();
        let inquiry_id = notification.inquiry_id.clone();
        if let Err(err) = self.notifier.publish(notification) {
            warn!(%inquiry_id, template, error = %err, "inquiry notification failed");
        }
    }
}

fn rejected(errors: ValidationErrors) -> ValidationErrors {
    debug!(fields = errors.len(), "inquiry submission rejected");
    errors
}

/// Error raised by the inquiry service.
#[derive(Debug, thiserror::Error)]
pub enum InquiryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("inquiry {0} not found")]
    NotFound(InquiryId),
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
