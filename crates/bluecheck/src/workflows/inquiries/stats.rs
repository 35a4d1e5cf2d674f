use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{Inquiry, InquiryStatus, InspectionType};

pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Dashboard counters computed over one store snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryStats {
    pub total_inquiries: usize,
    pub status_breakdown: BTreeMap<InquiryStatus, usize>,
    pub inspection_type_breakdown: BTreeMap<InspectionType, usize>,
    pub recent_inquiries_7_days: usize,
}

impl InquiryStats {
    /// Count `records` as of `now`. Both breakdowns list every known key, zero-filled.
    pub fn from_snapshot(records: &[Inquiry], now: DateTime<Utc>) -> Self {
        let mut status_breakdown: BTreeMap<InquiryStatus, usize> =
            InquiryStatus::ALL.into_iter().map(|status| (status, 0)).collect();
        let mut inspection_type_breakdown: BTreeMap<InspectionType, usize> =
            InspectionType::ALL.into_iter().map(|kind| (kind, 0)).collect();

        let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut recent = 0;

        for inquiry in records {
            *status_breakdown.entry(inquiry.status).or_default() += 1;
            *inspection_type_breakdown
                .entry(inquiry.inspection_type)
                .or_default() += 1;
            if inquiry.created_at >= window_start && inquiry.created_at <= now {
                recent += 1;
            }
        }

        Self {
            total_inquiries: records.len(),
            status_breakdown,
            inspection_type_breakdown,
            recent_inquiries_7_days: recent,
        }
    }

    pub fn status_count(&self, status: InquiryStatus) -> usize {
        self.status_breakdown.get(&status).copied().unwrap_or_default()
    }

    pub fn inspection_type_count(&self, kind: InspectionType) -> usize {
        self.inspection_type_breakdown
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Inquiries still waiting on a first response.
    pub fn open_inquiries(&self) -> usize {
        self.status_count(InquiryStatus::New)
    }
}
