//! OKG Audit - cross-reference validation
//!
//! The auditor runs once, after every content stage has joined, and checks
//! the global invariants the generator promises:
//! - Referential integrity across every id-bearing field
//! - Forward-only, time-ordered status timelines inside sprint windows
//! - Review comments on terminal tickets
//! - Subject token resolution for ticket-bound mail
//! - Aggregate distribution rules (spam cap, business-hours floor,
//!   manager inbox diversity)
//!
//! Findings are reported, not raised; the export bundler decides what a
//! non-empty report means under the configured [`AuditPolicy`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auditor;
pub mod report;

pub use auditor::audit;
pub use report::{AuditPolicy, AuditReport, AuditStats, Rule, Violation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
