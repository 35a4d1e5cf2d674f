use super::common::*;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use crate::workflows::inquiries::domain::{InquiryStatus, InspectionType};
use crate::workflows::inquiries::stats::InquiryStats;

#[test]
fn zero_fills_every_status_and_type() {
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).single().expect("valid");
    let records = vec![
        stored_inquiry("a", InquiryStatus::New, InspectionType::PrePurchase, now),
        stored_inquiry("b", InquiryStatus::New, InspectionType::NewHome, now),
        stored_inquiry("c", InquiryStatus::Contacted, InspectionType::PrePurchase, now),
    ];

    let stats = InquiryStats::from_snapshot(&records, now);
    let payload = serde_json::to_value(&stats).expect("serializes");

    assert_eq!(
        payload,
        json!({
            "total_inquiries": 3,
            "status_breakdown": {
                "new": 2,
                "contacted": 1,
                "scheduled": 0,
                "completed": 0,
                "cancelled": 0,
            },
            "inspection_type_breakdown": {
                "pre-purchase": 2,
                "new-home": 1,
                "pre-handover": 0,
                "dilapidation": 0,
                "safe-to-rent": 0,
            },
            "recent_inquiries_7_days": 3,
        })
    );
    assert_eq!(stats.open_inquiries(), 2);
}

#[test]
fn recent_window_spans_seven_days_back_from_now() {
    let now = Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).single().expect("valid");
    let records = vec![
        stored_inquiry(
            "old",
            InquiryStatus::Completed,
            InspectionType::Dilapidation,
            now - Duration::days(8),
        ),
        stored_inquiry(
            "fresh",
            InquiryStatus::New,
            InspectionType::PreHandover,
            now - Duration::hours(1),
        ),
        stored_inquiry(
            "edge",
            InquiryStatus::Scheduled,
            InspectionType::SafeToRent,
            now - Duration::days(7),
        ),
    ];

    let stats = InquiryStats::from_snapshot(&records, now);

    assert_eq!(stats.total_inquiries, 3);
    assert_eq!(stats.recent_inquiries_7_days, 2);
}

#[test]
fn empty_snapshot_reports_zeroes() {
    let stats = InquiryStats::from_snapshot(&[], Utc::now());

    assert_eq!(stats.total_inquiries, 0);
    assert_eq!(stats.recent_inquiries_7_days, 0);
    assert_eq!(stats.status_breakdown.len(), InquiryStatus::ALL.len());
    assert!(stats.status_breakdown.values().all(|count| *count == 0));
    assert_eq!(
        stats.inspection_type_breakdown.len(),
        InspectionType::ALL.len()
    );
}
