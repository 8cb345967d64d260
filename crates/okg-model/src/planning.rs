//! Planning entities: projects, epics, sprints

use crate::id::{EpicId, ProjectId, ProjectKey, SprintId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project owning epics, tickets, and sprints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, `PROJ-PAY`
    pub id: ProjectId,
    /// Human-readable key prefix for ticket ids
    pub key: ProjectKey,
    /// Display name
    pub name: String,
}

/// A body of work under a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    /// Stable identifier, `EPIC-PAY-01`
    pub id: EpicId,
    /// Owning project
    pub project_id: ProjectId,
    /// Short title
    pub title: String,
}

/// A sprint window under a project
///
/// Sprints are non-overlapping, contiguous per project, and aligned to the
/// business calendar: `start` falls on a business day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    /// Stable identifier, `SPRINT-1`
    pub id: SprintId,
    /// Theme name, e.g. "Foundation and Setup"
    pub name: String,
    /// Owning project
    pub project_id: ProjectId,
    /// Inclusive start instant
    pub start: DateTime<Utc>,
    /// Inclusive end instant
    pub end: DateTime<Utc>,
}

impl Sprint {
    /// Whether an instant falls inside this sprint window
    #[inline]
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sprint_contains_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 3, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 14, 12, 30, 0).unwrap();
        let sprint = Sprint {
            id: SprintId::from_raw("SPRINT-1"),
            name: "Foundation".into(),
            project_id: ProjectId::from_raw("PROJ-PAY"),
            start,
            end,
        };

        assert!(sprint.contains(start));
        assert!(sprint.contains(end));
        assert!(!sprint.contains(end + chrono::Duration::seconds(1)));
    }
}
