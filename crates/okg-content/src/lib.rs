//! OKG Content - the content stage orchestrator
//!
//! Generates tickets and mailboxes in two phases per unit:
//! - Scaffold: participants, timestamps, references, and distributions,
//!   computed deterministically from the run seed before any model call
//! - Narrative: titles, descriptions, and bodies from the language-model
//!   capability, validated, retried with a stricter prompt, and finally
//!   replaced by a deterministic template when the provider misbehaves
//!
//! The split isolates non-determinism to free text: every invariant the
//! auditor checks is decided at scaffold time.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod capability;
pub mod mail;
pub mod options;
pub mod pack;
pub mod persona;
pub mod tickets;

pub use capability::{
    narrate, ContentGenerationError, FlakyModel, LanguageModel, NarrativePolicy, PromptContext,
    ProviderError, RetryBudget, TemplateModel,
};
pub use mail::{generate_mail, plan_mail, MailScaffold};
pub use options::ContentOptions;
pub use pack::{pack_for, IndustryPack};
pub use persona::{CategoryMix, Persona, VolumeRange};
pub use tickets::{generate_tickets, plan_tickets, CommentSlot, TicketScaffold};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for content-stage tests

    use crate::options::ContentOptions;
    use crate::pack::pack_for;
    use crate::tickets::{plan_tickets, TicketScaffold};
    use chrono::NaiveDate;
    use okg_calendar::{unit_rng, BusinessCalendar};
    use okg_model::{Comment, CommentKind, IdRegistry, ProjectKey, Ticket};
    use okg_org::{build, OrgSpec, Roster};
    use okg_plan::{plan, PlanSpec, ProjectPlan};

    pub(crate) struct Fixture {
        pub(crate) registry: IdRegistry,
        pub(crate) calendar: BusinessCalendar,
        pub(crate) roster: Roster,
        pub(crate) plan: ProjectPlan,
    }

    pub(crate) fn fixture() -> Fixture {
        let registry = IdRegistry::new();
        let calendar = BusinessCalendar::new(
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
            chrono_tz::Asia::Kolkata,
            true,
        )
        .unwrap();

        let pack = pack_for("fintech");
        let mut org_rng = unit_rng(42, "org", 0);
        let roster = build(
            &registry,
            &OrgSpec {
                team_name: "Payments Core".into(),
                headcount: 9,
                geos: vec!["Bengaluru".into(), "Mumbai".into(), "Remote-IN".into()],
                span_min: 2,
                span_max: 8,
                skills_pool: pack.skills.iter().map(|s| (*s).to_owned()).collect(),
            },
            &mut org_rng,
        )
        .unwrap();

        let mut plan_rng = unit_rng(42, "plan", 0);
        let plan = plan(
            &registry,
            &calendar,
            &PlanSpec {
                project_key: ProjectKey::new("PAY").unwrap(),
                project_name: "Payment Gateway".into(),
                sprint_length_days: 10,
                epic_titles: pack.products.iter().map(|s| (*s).to_owned()).collect(),
            },
            &mut plan_rng,
        )
        .unwrap();

        Fixture {
            registry,
            calendar,
            roster,
            plan,
        }
    }

    /// Tickets assembled from scaffolds with template bodies, no model calls
    pub(crate) fn fixture_tickets(
        registry: &IdRegistry,
        calendar: &BusinessCalendar,
        roster: &Roster,
        plan: &ProjectPlan,
    ) -> Vec<Ticket> {
        let scaffolds = plan_tickets(
            registry,
            calendar,
            roster,
            plan,
            pack_for("fintech"),
            &ContentOptions::for_tests(),
        )
        .unwrap();
        scaffolds.into_iter().map(assemble_placeholder).collect()
    }

    pub(crate) fn assemble_placeholder(scaffold: TicketScaffold) -> Ticket {
        let comments = scaffold
            .comment_slots
            .iter()
            .map(|slot| Comment {
                id: slot.id.clone(),
                author_id: slot.author_id.clone(),
                at: slot.at,
                body: match slot.kind {
                    CommentKind::Review => {
                        "Code review done, looks good to merge once CI is green.".to_owned()
                    }
                    CommentKind::Discussion => {
                        "Picked this up; will update the thread once staging looks clean.".to_owned()
                    }
                },
                kind: slot.kind,
            })
            .collect();

        Ticket {
            id: scaffold.id,
            project_id: scaffold.project_id,
            epic_id: scaffold.epic_id,
            sprint_id: scaffold.sprint_id,
            kind: scaffold.kind,
            title: scaffold.topic.clone(),
            description: format!(
                "{} while meeting {}. Tests and dashboards included.",
                scaffold.topic, scaffold.constraint
            ),
            priority: scaffold.priority,
            story_points: scaffold.story_points,
            reporter_id: scaffold.reporter_id,
            assignee_id: scaffold.assignee_id,
            status_timeline: scaffold.status_timeline,
            comments,
        }
    }
}
