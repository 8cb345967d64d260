//! OKG Org - org graph builder
//!
//! Turns the org section of the config into a roster:
//! - Level mix derived from fixed proportions (one manager root, always)
//! - Manager tree respecting the configured span bounds
//! - Names, geos, and skills assigned from the run's random stream
//!
//! The manager relation is acyclic and single-rooted by construction; an
//! impossible span configuration fails before any content stage runs.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod builder;
pub mod names;

pub use builder::{build, OrgError, OrgSpec, Roster};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
