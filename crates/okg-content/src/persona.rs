//! Persona parameter tables
//!
//! Role behavior is a closed set keyed by [`Level`]: each variant carries
//! its own volume range, category mix, and ticket affinity rather than
//! open-ended per-role subclassing.

use okg_model::{Level, MailCategory, Person, Priority, TicketKind};

/// Weekly email volume range (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRange {
    pub min: u32,
    pub max: u32,
}

/// Relative category mix; order matches [`Persona::CATEGORIES`]
#[derive(Debug, Clone, Copy)]
pub struct CategoryMix {
    pub work: f64,
    pub managerial: f64,
    pub non_project: f64,
    pub spam: f64,
}

impl CategoryMix {
    /// Weights in [`Persona::CATEGORIES`] order
    #[must_use]
    pub fn weights(&self) -> [f64; 4] {
        [self.work, self.managerial, self.non_project, self.spam]
    }
}

/// Behavioral profile per organizational level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Junior,
    Senior,
    TeamLead,
    Manager,
}

impl Persona {
    /// Category order used by [`CategoryMix::weights`]
    pub const CATEGORIES: [MailCategory; 4] = [
        MailCategory::Work,
        MailCategory::Managerial,
        MailCategory::NonProject,
        MailCategory::Spam,
    ];

    /// Profile for a person
    #[inline]
    #[must_use]
    pub fn for_person(person: &Person) -> Self {
        Self::for_level(person.level)
    }

    /// Profile for a level
    #[inline]
    #[must_use]
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Junior => Persona::Junior,
            Level::Senior => Persona::Senior,
            Level::TeamLead => Persona::TeamLead,
            Level::Manager => Persona::Manager,
        }
    }

    /// Emails received per week
    #[must_use]
    pub fn weekly_volume(&self) -> VolumeRange {
        match self {
            Persona::Junior => VolumeRange { min: 25, max: 35 },
            Persona::Senior => VolumeRange { min: 22, max: 32 },
            Persona::TeamLead => VolumeRange { min: 20, max: 30 },
            Persona::Manager => VolumeRange { min: 28, max: 40 },
        }
    }

    /// Category mix for received mail
    ///
    /// Manager non-project weight sits well above the audited 20% floor so
    /// the invariant holds by construction, not by luck.
    #[must_use]
    pub fn category_mix(&self) -> CategoryMix {
        match self {
            Persona::Junior => CategoryMix {
                work: 0.68,
                managerial: 0.12,
                non_project: 0.17,
                spam: 0.03,
            },
            Persona::Senior => CategoryMix {
                work: 0.66,
                managerial: 0.14,
                non_project: 0.17,
                spam: 0.03,
            },
            Persona::TeamLead => CategoryMix {
                work: 0.55,
                managerial: 0.25,
                non_project: 0.17,
                spam: 0.03,
            },
            Persona::Manager => CategoryMix {
                work: 0.40,
                managerial: 0.28,
                non_project: 0.29,
                spam: 0.03,
            },
        }
    }

    /// Relative chance this persona is assigned a given ticket shape
    ///
    /// Juniors lean toward small, low-pressure work; leads and managers
    /// rarely take tickets at all.
    #[must_use]
    pub fn ticket_affinity(&self, kind: TicketKind, priority: Priority, story_points: u8) -> f64 {
        let base: f64 = match self {
            Persona::Junior => 0.30,
            Persona::Senior => 0.45,
            Persona::TeamLead => 0.20,
            Persona::Manager => 0.05,
        };

        let size: f64 = match (self, story_points) {
            (Persona::Junior, 0..=3) => 0.30,
            (Persona::Junior, 4..=5) => 0.10,
            (Persona::Junior, _) => -0.20,
            (Persona::Senior, 6..) => 0.15,
            _ => 0.0,
        };

        let kind_mod: f64 = match (self, kind) {
            (Persona::Junior, TicketKind::Bug | TicketKind::Task) => 0.15,
            (Persona::Junior, TicketKind::Spike) => -0.10,
            (Persona::Senior, TicketKind::Story | TicketKind::Spike) => 0.10,
            (Persona::TeamLead, TicketKind::Spike) => 0.10,
            _ => 0.0,
        };

        let pressure: f64 = match (self, priority) {
            (Persona::Junior, Priority::High) => -0.10,
            (Persona::Junior, Priority::Critical) => -0.25,
            (Persona::Senior | Persona::TeamLead, Priority::Critical) => 0.10,
            _ => 0.0,
        };

        (base + size + kind_mod + pressure).clamp(0.01, 1.0)
    }

    /// Email signature block
    #[must_use]
    pub fn signature(&self, person: &Person, company: &str) -> String {
        format!(
            "Best regards,\n{}\n{}\n{} - {}",
            person.name,
            person.role,
            company,
            person.geo.as_str()
        )
    }
}
