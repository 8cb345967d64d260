//! Ticket entities: lifecycle, comments, and the review-comment classifier

use crate::id::{CommentId, EpicId, PersonId, ProjectId, SprintId, TicketId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket work type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    Story,
    Bug,
    Task,
    Spike,
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Workflow status, in its fixed forward order
///
/// Transitions only ever move rightward: To Do → In Progress → In Review → Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// The full workflow, in order
    pub const ORDER: [Status; 4] = [Status::ToDo, Status::InProgress, Status::InReview, Status::Done];

    /// Position in the workflow order
    #[inline]
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Status::ToDo => 0,
            Status::InProgress => 1,
            Status::InReview => 2,
            Status::Done => 3,
        }
    }

    /// Whether this is the terminal status
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done)
    }
}

/// One entry in a ticket's status timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status entered
    pub status: Status,
    /// Instant of the transition
    pub at: DateTime<Utc>,
}

/// Comment classification assigned at scaffold time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// Ordinary discussion
    Discussion,
    /// Code-review sign-off; required on Done tickets
    Review,
}

/// A ticket comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Stable identifier, `CMT-0001`
    pub id: CommentId,
    /// Comment author
    pub author_id: PersonId,
    /// Instant posted; non-decreasing within a ticket
    pub at: DateTime<Utc>,
    /// Narrative body
    pub body: String,
    /// Scaffold classification
    pub kind: CommentKind,
}

/// Keywords that mark a comment body as a review sign-off
const REVIEW_KEYWORDS: [&str; 5] = ["code review", "lgtm", "approved", "looks good", "reviewed"];

/// Classify a comment body as a review comment
///
/// Case-insensitive keyword match; the auditor uses this rather than
/// trusting the scaffold's [`CommentKind`], so model output that dropped the
/// sign-off wording is caught.
#[must_use]
pub fn is_review_comment(body: &str) -> bool {
    let lower = body.to_lowercase();
    REVIEW_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// An issue-tracker ticket
///
/// Append-only once audited; every `*_id` must resolve in the registry and
/// every instant must fall inside the owning sprint's window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Stable identifier, `PAY-1401`
    pub id: TicketId,
    /// Owning project
    pub project_id: ProjectId,
    /// Owning epic
    pub epic_id: EpicId,
    /// Sprint the ticket is scheduled in
    pub sprint_id: SprintId,
    /// Work type
    #[serde(rename = "type")]
    pub kind: TicketKind,
    /// Narrative title
    pub title: String,
    /// Narrative description
    pub description: String,
    /// Priority
    pub priority: Priority,
    /// Estimate on the Fibonacci ladder
    pub story_points: u8,
    /// Person who filed the ticket
    pub reporter_id: PersonId,
    /// Person working the ticket
    pub assignee_id: PersonId,
    /// Status history, strictly increasing in both time and status order
    pub status_timeline: Vec<StatusChange>,
    /// Comments, ordered by instant
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Current (latest) status
    #[must_use]
    pub fn current_status(&self) -> Option<Status> {
        self.status_timeline.last().map(|c| c.status)
    }

    /// Whether the ticket reached terminal status
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.current_status().is_some_and(|s| s.is_terminal())
    }

    /// Whether any comment classifies as a review sign-off
    #[must_use]
    pub fn has_review_comment(&self) -> bool {
        self.comments.iter().any(|c| is_review_comment(&c.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rank_is_forward_ordered() {
        let ranks: Vec<u8> = Status::ORDER.iter().map(Status::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(Status::Done.is_terminal());
        assert!(!Status::InReview.is_terminal());
    }

    #[test]
    fn status_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Status::ToDo).unwrap(), "\"To Do\"");
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"In Progress\"");
        let back: Status = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(back, Status::Done);
    }

    #[test]
    fn review_comment_classifier() {
        assert!(is_review_comment("LGTM, shipping it"));
        assert!(is_review_comment("Code review done, approved with one nit"));
        assert!(is_review_comment("Looks good after the retry fix"));
        assert!(!is_review_comment("Can you rebase on main?"));
    }
}
