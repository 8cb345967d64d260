//! Mail entities: messages, categories, references

use crate::id::{MessageId, PersonId, ThreadId, TicketId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse mail category
///
/// The auditor's distribution rules key off this: spam is capped globally,
/// and manager inboxes must carry a minimum non-project share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailCategory {
    /// Project work: tickets, reviews, deploys
    Work,
    /// People and process: 1:1s, planning, status
    Managerial,
    /// Corporate, HR, vendor, facilities, events
    NonProject,
    /// Unsolicited noise
    Spam,
}

/// Message importance flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Normal,
    High,
}

/// Structured references carried by a message
///
/// Every listed id must resolve in the registry or the list must be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailRefs {
    /// Referenced tickets
    pub ticket_ids: Vec<TicketId>,
    /// Referenced pull requests
    pub pr_ids: Vec<String>,
    /// Referenced documents
    pub doc_ids: Vec<String>,
}

impl MailRefs {
    /// Whether no references are carried
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticket_ids.is_empty() && self.pr_ids.is_empty() && self.doc_ids.is_empty()
    }
}

/// One email message
///
/// When the thread concerns a ticket the subject embeds its `[KEY-####]`
/// reference. Immutable after audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// Stable identifier, `MSG-001`
    pub id: MessageId,
    /// Owning thread, `MAIL-TH-001`
    pub thread_id: ThreadId,
    /// Subject line
    pub subject: String,
    /// Sender
    pub from: PersonId,
    /// Primary recipients
    pub to: Vec<PersonId>,
    /// Carbon-copy recipients
    pub cc: Vec<PersonId>,
    /// Send instant
    pub timestamp: DateTime<Utc>,
    /// Narrative body
    pub body: String,
    /// Coarse category
    pub category: MailCategory,
    /// Importance flag
    pub importance: Importance,
    /// Structured references
    pub refs: MailRefs,
}

impl MailMessage {
    /// All persons appearing on the message envelope
    #[must_use]
    pub fn participants(&self) -> Vec<&PersonId> {
        std::iter::once(&self.from)
            .chain(self.to.iter())
            .chain(self.cc.iter())
            .collect()
    }
}
