//! OKG Calendar - the pipeline's sole timestamp authority
//!
//! Converts the configured time window + timezone + business-day flag into
//! concrete instants:
//! - Business-day math (windows, day arithmetic, sprint-sized spans)
//! - Biased instant sampling inside business hours
//! - Reply-delay sampling for thread realism
//! - Deterministic per-unit random sub-streams
//!
//! Every timestamp the pipeline emits is drawn here, so distribution
//! properties (e.g. the business-hours share) hold by construction.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod calendar;
pub mod stream;

pub use calendar::{BusinessCalendar, HoursBias, SchedulingError};
pub use stream::{range_inclusive, unit_rng, weighted_index};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
