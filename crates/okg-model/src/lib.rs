//! OKG Model - identifiers, entities, and the dataset aggregate
//!
//! Foundation crate for the generation pipeline:
//! - Typed, deterministically formatted identifiers per entity kind
//! - The [`IdRegistry`] that allocates them and resolves references
//! - Entity types (persons, planning items, tickets, mail)
//! - The append-only [`Dataset`] owned by a pipeline run
//! - [`ContentDigest`] for artifact integrity
//!
//! # Example
//!
//! ```rust
//! use okg_model::{IdRegistry, ProjectKey};
//!
//! let registry = IdRegistry::new();
//! let pay = ProjectKey::new("PAY").unwrap();
//! registry.register_project(&pay);
//!
//! let ticket = registry.next_ticket(&pay).unwrap();
//! assert_eq!(ticket.as_str(), "PAY-1401");
//! assert!(registry.resolve(ticket.as_str()));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dataset;
pub mod digest;
pub mod id;
pub mod mail;
pub mod person;
pub mod planning;
pub mod registry;
pub mod ticket;

pub use dataset::{Dataset, DatasetStats};
pub use digest::ContentDigest;
pub use id::{
    CommentId, EpicId, MessageId, PersonId, ProjectId, ProjectKey, SprintId, ThreadId, TicketId,
};
pub use mail::{Importance, MailCategory, MailMessage, MailRefs};
pub use person::{Geo, Level, Person};
pub use planning::{Epic, Project, Sprint};
pub use registry::{AllocationError, IdRegistry};
pub use ticket::{
    is_review_comment, Comment, CommentKind, Priority, Status, StatusChange, Ticket, TicketKind,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the OKG model
    pub use crate::{
        Dataset, IdRegistry, Level, MailCategory, MailMessage, Person, PersonId, ProjectKey,
        Status, Ticket, TicketId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
