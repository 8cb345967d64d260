//! Person entities and the organizational level ladder

use crate::id::PersonId;
use serde::{Deserialize, Serialize};

/// Organizational level
///
/// A closed set: persona behavior (email volume, category mix, ticket
/// complexity) is keyed off this rather than open-ended role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Junior engineer
    #[serde(rename = "Jr")]
    Junior,
    /// Senior engineer
    #[serde(rename = "Sr")]
    Senior,
    /// Team lead
    #[serde(rename = "TL")]
    TeamLead,
    /// Engineering manager
    #[serde(rename = "Mgr")]
    Manager,
}

impl Level {
    /// All levels, junior first
    pub const ALL: [Level; 4] = [Level::Junior, Level::Senior, Level::TeamLead, Level::Manager];

    /// Display title used for the person's `role` field
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Level::Junior | Level::Senior => "Software Engineer",
            Level::TeamLead => "Team Lead",
            Level::Manager => "Engineering Manager",
        }
    }

    /// Whether this level owns direct reports
    #[inline]
    #[must_use]
    pub fn manages(&self) -> bool {
        matches!(self, Level::TeamLead | Level::Manager)
    }
}

/// Geographic location tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geo(pub String);

impl Geo {
    /// Location as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A member of the simulated organization
///
/// Created once by the org graph builder and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Stable identifier within the run
    pub id: PersonId,
    /// Full display name
    pub name: String,
    /// Display role title
    pub role: String,
    /// Organizational level
    pub level: Level,
    /// Location
    pub geo: Geo,
    /// Manager back-reference; `None` only for the single root
    pub manager_id: Option<PersonId>,
    /// Technical skills drawn from the industry pack
    pub skills: Vec<String>,
}

impl Person {
    /// Whether this person is the org root (no manager)
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.manager_id.is_none()
    }

    /// Whether this person holds the manager level
    #[inline]
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.level == Level::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_titles() {
        assert_eq!(Level::Junior.title(), "Software Engineer");
        assert_eq!(Level::Manager.title(), "Engineering Manager");
    }

    #[test]
    fn level_serde_short_codes() {
        let json = serde_json::to_string(&Level::TeamLead).unwrap();
        assert_eq!(json, "\"TL\"");
        let back: Level = serde_json::from_str("\"Mgr\"").unwrap();
        assert_eq!(back, Level::Manager);
    }

    #[test]
    fn manages_flag() {
        assert!(!Level::Junior.manages());
        assert!(Level::TeamLead.manages());
        assert!(Level::Manager.manages());
    }
}
