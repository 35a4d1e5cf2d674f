//! Contact-inquiry backend for the BlueCheck Inspections site.
//!
//! The [`workflows::inquiries`] module owns the inquiry lifecycle: intake validation, the
//! injected store, status changes, statistics, outbound notifications, and the HTTP router
//! the marketing site and admin dashboard talk to.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
