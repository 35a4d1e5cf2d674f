use crate::infra::InMemoryNotifier;
use bluecheck::error::AppError;
use bluecheck::workflows::inquiries::{
    InMemoryInquiryStore, InquiryRepository, InquiryService, InquiryServiceConfig, InquiryStats,
    InquiryStatus, InquirySubmission, JsonFileInquiryStore,
};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Staff address that receives new-inquiry alerts during the walkthrough
    #[arg(long)]
    pub(crate) staff_email: Option<String>,
    /// Skip the rejected submission example
    #[arg(long)]
    pub(crate) skip_rejection: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// Path to the JSON inquiry store (the same file INQUIRY_DATA_PATH points at)
    #[arg(long)]
    pub(crate) data_path: PathBuf,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        staff_email,
        skip_rejection,
    } = args;

    println!("BlueCheck inquiry desk demo");
    let repository = Arc::new(InMemoryInquiryStore::new());
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = InquiryService::new(
        repository.clone(),
        notifier.clone(),
        InquiryServiceConfig {
            staff_email,
            ..InquiryServiceConfig::default()
        },
    );

    let mut received = Vec::new();
    for submission in demo_submissions() {
        match service.submit(submission) {
            Ok(inquiry) => {
                println!(
                    "- Received {} from {} ({}) -> status {}",
                    inquiry.id,
                    inquiry.name,
                    inquiry.inspection_type.label(),
                    inquiry.status
                );
                received.push(inquiry);
            }
            Err(err) => println!("  Submission rejected: {err}"),
        }
    }

    if !skip_rejection {
        let incomplete = InquirySubmission {
            name: Some("  ".to_string()),
            email: Some("not-an-email".to_string()),
            phone: Some("call me".to_string()),
            ..InquirySubmission::default()
        };
        match service.submit(incomplete) {
            Ok(inquiry) => println!("  Unexpectedly accepted {}", inquiry.id),
            Err(err) => println!("- Rejected incomplete form: {err}"),
        }
    }

    let transitions = [InquiryStatus::Contacted, InquiryStatus::Scheduled];
    for (inquiry, status) in received.iter().zip(transitions) {
        match service.update_status(&inquiry.id, status) {
            Ok(updated) => println!("- {} moved to {}", updated.id, updated.status),
            Err(err) => println!("  Status update failed: {err}"),
        }
    }

    match service.stats() {
        Ok(stats) => render_stats(&stats),
        Err(err) => println!("  Statistics unavailable: {err}"),
    }

    let stored = repository.list(None)?;
    println!("\nDashboard listing (newest first)");
    for inquiry in &stored {
        println!(
            "  - {} | {} | {} | {}",
            inquiry.created_at.format("%Y-%m-%d %H:%M"),
            inquiry.name,
            inquiry.property_address,
            inquiry.status
        );
    }

    let outbox = notifier.events();
    println!("\nNotification outbox ({} queued)", outbox.len());
    for notification in outbox {
        println!(
            "  - {} -> {} [{}]",
            notification.template.label(),
            notification.recipient,
            notification.inquiry_id
        );
    }

    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let report = stats_report(&args.data_path, Utc::now())?;
    println!("{report}");
    Ok(())
}

pub(crate) fn stats_report(path: &Path, now: DateTime<Utc>) -> Result<String, AppError> {
    let store = JsonFileInquiryStore::open(path)?;
    let stats = InquiryStats::from_snapshot(&store.snapshot()?, now);
    let rendered = serde_json::to_string_pretty(&stats).map_err(std::io::Error::from)?;
    Ok(rendered)
}

fn render_stats(stats: &InquiryStats) {
    println!("\nDashboard statistics");
    println!(
        "- {} inquiries total | {} open | {} in the last 7 days",
        stats.total_inquiries,
        stats.open_inquiries(),
        stats.recent_inquiries_7_days
    );
    println!("Status breakdown:");
    for (status, count) in &stats.status_breakdown {
        println!("  - {}: {}", status, count);
    }
    println!("Inspection types:");
    for (kind, count) in &stats.inspection_type_breakdown {
        println!("  - {}: {}", kind.label(), count);
    }
}

fn demo_submissions() -> Vec<InquirySubmission> {
    let form = |name: &str, email: &str, address: &str, kind: &str, date: Option<&str>| {
        InquirySubmission {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some("0412 345 678".to_string()),
            property_address: Some(address.to_string()),
            inspection_type: Some(kind.to_string()),
            preferred_date: date.map(str::to_string),
            message: Some("Keen to book before settlement.".to_string()),
        }
    };

    vec![
        form(
            "Priya Natarajan",
            "priya@example.com",
            "12 Rosella Court, Box Hill VIC 3128",
            "pre-purchase",
            Some("2024-03-04"),
        ),
        form(
            "Daniel Okafor",
            "daniel.okafor@example.com",
            "4/88 Station Street, Fairfield VIC 3078",
            "new-home",
            None,
        ),
        form(
            "Mei Lin",
            "mei.lin@example.com",
            "210 Sydney Road, Brunswick VIC 3056",
            "dilapidation",
            Some("2024-03-11"),
        ),
    ]
}
