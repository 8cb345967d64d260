//! Ticket generation
//!
//! Two phases per ticket, like every content unit:
//! 1. Scaffold - ids, participants, sprint placement, status timeline, and
//!    comment slots, all computed from the unit's own random sub-stream.
//! 2. Narrative - title, description, and comment bodies from the language
//!    model, validated and falling back to templates.
//!
//! Every identifier is allocated during the sequential scaffold phase, so
//! the concurrent narrative fan-out cannot perturb id assignment.

use crate::capability::{narrate, LanguageModel, NarrativePolicy, PromptContext, RetryBudget};
use crate::options::ContentOptions;
use crate::pack::IndustryPack;
use crate::persona::Persona;
use okg_calendar::{unit_rng, weighted_index, BusinessCalendar, HoursBias};
use okg_model::{
    is_review_comment, AllocationError, Comment, CommentId, CommentKind, EpicId, IdRegistry,
    Person, PersonId, Priority, ProjectId, SprintId, Status, StatusChange, Ticket, TicketId,
    TicketKind,
};
use okg_org::Roster;
use okg_plan::ProjectPlan;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

const KIND_TABLE: [(TicketKind, f64); 4] = [
    (TicketKind::Story, 0.60),
    (TicketKind::Bug, 0.25),
    (TicketKind::Task, 0.12),
    (TicketKind::Spike, 0.03),
];

const PRIORITY_TABLE: [(Priority, f64); 4] = [
    (Priority::Low, 0.30),
    (Priority::Medium, 0.50),
    (Priority::High, 0.15),
    (Priority::Critical, 0.05),
];

const POINTS_TABLE: [(u8, f64); 7] = [
    (1, 0.10),
    (2, 0.20),
    (3, 0.25),
    (5, 0.25),
    (8, 0.15),
    (13, 0.04),
    (21, 0.01),
];

/// Final-status mix for sprints that have fully elapsed
const EARLY_SPRINT_STATUS: [(Status, f64); 4] = [
    (Status::Done, 0.65),
    (Status::InReview, 0.15),
    (Status::InProgress, 0.12),
    (Status::ToDo, 0.08),
];

/// Final-status mix for the window's last sprint
const LAST_SPRINT_STATUS: [(Status, f64); 4] = [
    (Status::Done, 0.25),
    (Status::InReview, 0.20),
    (Status::InProgress, 0.30),
    (Status::ToDo, 0.25),
];

/// A comment slot fixed at scaffold time; only the body is narrative
#[derive(Debug, Clone)]
pub struct CommentSlot {
    pub id: CommentId,
    pub author_id: PersonId,
    pub at: DateTime<Utc>,
    pub kind: CommentKind,
}

/// Deterministic skeleton of one ticket
#[derive(Debug, Clone)]
pub struct TicketScaffold {
    pub index: u64,
    pub id: TicketId,
    pub project_id: ProjectId,
    pub epic_id: EpicId,
    pub sprint_id: SprintId,
    pub kind: TicketKind,
    pub priority: Priority,
    pub story_points: u8,
    pub reporter_id: PersonId,
    pub assignee_id: PersonId,
    pub status_timeline: Vec<StatusChange>,
    pub comment_slots: Vec<CommentSlot>,
    /// Topic phrase driving title and description prompts
    pub topic: String,
    /// Industry constraint woven into the description
    pub constraint: String,
}

/// Plan all ticket scaffolds for the run
///
/// Sequential and deterministic: ids are allocated here, in index order.
///
/// # Errors
/// [`AllocationError`] on registry misuse - an orchestration bug.
pub fn plan_tickets(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    roster: &Roster,
    plan: &ProjectPlan,
    pack: &IndustryPack,
    options: &ContentOptions,
) -> Result<Vec<TicketScaffold>, AllocationError> {
    let mut count_rng = unit_rng(options.seed, "ticket-count", 0);
    let count = okg_calendar::range_inclusive(&mut count_rng, options.tickets_min, options.tickets_max);

    tracing::info!(count, "planning ticket scaffolds");

    let mut scaffolds = Vec::with_capacity(count as usize);
    for index in 0..u64::from(count) {
        let mut rng = unit_rng(options.seed, "ticket", index);
        scaffolds.push(plan_one(registry, calendar, roster, plan, pack, index, &mut rng)?);
    }
    Ok(scaffolds)
}

#[allow(clippy::too_many_lines)]
fn plan_one(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    roster: &Roster,
    plan: &ProjectPlan,
    pack: &IndustryPack,
    index: u64,
    rng: &mut StdRng,
) -> Result<TicketScaffold, AllocationError> {
    let sprint_idx = rng.gen_range(0..plan.sprints.len());
    let sprint = &plan.sprints[sprint_idx];
    let epic = &plan.epics[rng.gen_range(0..plan.epics.len())];

    let kind = KIND_TABLE[weighted_index(rng, &KIND_TABLE.map(|(_, w)| w))].0;
    let priority = PRIORITY_TABLE[weighted_index(rng, &PRIORITY_TABLE.map(|(_, w)| w))].0;
    let story_points = POINTS_TABLE[weighted_index(rng, &POINTS_TABLE.map(|(_, w)| w))].0;

    let assignee_id = pick_assignee(roster, kind, priority, story_points, rng);
    let reporter_id = pick_reporter(roster, rng);

    let final_status = if sprint_idx + 1 == plan.sprints.len() {
        LAST_SPRINT_STATUS[weighted_index(rng, &LAST_SPRINT_STATUS.map(|(_, w)| w))].0
    } else {
        EARLY_SPRINT_STATUS[weighted_index(rng, &EARLY_SPRINT_STATUS.map(|(_, w)| w))].0
    };

    let status_timeline = plan_timeline(calendar, sprint.start, sprint.end, final_status, rng);

    // Comments start once work has started; a ticket still in To Do keeps
    // chatter minimal.
    let comment_count = if final_status == Status::ToDo {
        1
    } else {
        rng.gen_range(1..=4)
    };
    let comments_from = status_timeline
        .get(1)
        .map_or(sprint.start, |change| change.at);
    let mut comment_slots = plan_comment_slots(
        registry,
        calendar,
        roster,
        &assignee_id,
        comments_from,
        sprint.end,
        comment_count,
        rng,
    );

    // A Done ticket must carry a review sign-off; dedicate the final slot.
    if final_status == Status::Done {
        if let Some(last) = comment_slots.last_mut() {
            last.kind = CommentKind::Review;
            last.author_id = pick_reviewer(roster, &assignee_id, rng);
        }
    }

    let topic = topic_for(kind, pack, rng);
    let constraint = pack.constraints[rng.gen_range(0..pack.constraints.len())].to_owned();

    Ok(TicketScaffold {
        index,
        id: registry.next_ticket(&plan.project.key)?,
        project_id: plan.project.id.clone(),
        epic_id: epic.id.clone(),
        sprint_id: sprint.id.clone(),
        kind,
        priority,
        story_points,
        reporter_id,
        assignee_id,
        status_timeline,
        comment_slots,
        topic,
        constraint,
    })
}

fn pick_assignee(
    roster: &Roster,
    kind: TicketKind,
    priority: Priority,
    points: u8,
    rng: &mut StdRng,
) -> PersonId {
    let weights: Vec<f64> = roster
        .persons
        .iter()
        .map(|p| Persona::for_person(p).ticket_affinity(kind, priority, points))
        .collect();
    roster.persons[weighted_index(rng, &weights)].id.clone()
}

fn pick_reporter(roster: &Roster, rng: &mut StdRng) -> PersonId {
    let weights: Vec<f64> = roster
        .persons
        .iter()
        .map(|p| match Persona::for_person(p) {
            Persona::Manager => 0.30,
            Persona::TeamLead => 0.40,
            Persona::Senior => 0.25,
            Persona::Junior => 0.05,
        })
        .collect();
    roster.persons[weighted_index(rng, &weights)].id.clone()
}

fn pick_reviewer(roster: &Roster, assignee: &PersonId, rng: &mut StdRng) -> PersonId {
    let reviewers: Vec<&Person> = roster
        .persons
        .iter()
        .filter(|p| &p.id != assignee && Persona::for_person(p) != Persona::Junior)
        .collect();
    if reviewers.is_empty() {
        return assignee.clone();
    }
    reviewers[rng.gen_range(0..reviewers.len())].id.clone()
}

/// Build a strictly increasing timeline from To Do up to `final_status`
///
/// The sprint span is cut into one segment per transition; each instant is
/// sampled inside its own segment, so ordering holds by construction.
fn plan_timeline(
    calendar: &BusinessCalendar,
    sprint_start: DateTime<Utc>,
    sprint_end: DateTime<Utc>,
    final_status: Status,
    rng: &mut StdRng,
) -> Vec<StatusChange> {
    let steps = usize::from(final_status.rank()) + 1;
    let span = sprint_end - sprint_start;
    let segment = span / i32::try_from(steps).unwrap_or(1);

    let mut timeline = Vec::with_capacity(steps);
    for (i, status) in Status::ORDER.iter().take(steps).enumerate() {
        let lo = sprint_start + segment * i32::try_from(i).unwrap_or(0);
        let hi = (lo + segment - Duration::minutes(5)).min(sprint_end);
        let at = calendar.sample_instant_between(rng, lo, hi.max(lo), HoursBias::BusinessHours);
        timeline.push(StatusChange { status: *status, at });
    }
    timeline
}

#[allow(clippy::too_many_arguments)]
fn plan_comment_slots(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    roster: &Roster,
    assignee: &PersonId,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
    count: u32,
    rng: &mut StdRng,
) -> Vec<CommentSlot> {
    let span = until - from;
    let segment = span / i32::try_from(count.max(1)).unwrap_or(1);

    (0..count)
        .map(|i| {
            let lo = from + segment * i32::try_from(i).unwrap_or(0);
            let hi = (lo + segment).min(until);
            let at = calendar.sample_instant_between(rng, lo, hi.max(lo), HoursBias::BusinessHours);

            // Half the chatter comes from the assignee, the rest from the room
            let author_id = if rng.gen_bool(0.5) {
                assignee.clone()
            } else {
                roster.persons[rng.gen_range(0..roster.persons.len())].id.clone()
            };

            CommentSlot {
                id: registry.next_comment(),
                author_id,
                at,
                kind: CommentKind::Discussion,
            }
        })
        .collect()
}

fn topic_for(kind: TicketKind, pack: &IndustryPack, rng: &mut StdRng) -> String {
    match kind {
        TicketKind::Story => format!(
            "Implement {} for {}",
            pack.features[rng.gen_range(0..pack.features.len())],
            pack.surfaces[rng.gen_range(0..pack.surfaces.len())],
        ),
        TicketKind::Bug => format!(
            "Fix {} in {}",
            pack.issues[rng.gen_range(0..pack.issues.len())],
            pack.components[rng.gen_range(0..pack.components.len())],
        ),
        TicketKind::Task => format!(
            "Configure {} for {}",
            pack.features[rng.gen_range(0..pack.features.len())],
            pack.components[rng.gen_range(0..pack.components.len())],
        ),
        TicketKind::Spike => format!(
            "Evaluate {} options for {}",
            pack.features[rng.gen_range(0..pack.features.len())],
            pack.surfaces[rng.gen_range(0..pack.surfaces.len())],
        ),
    }
}

/// Fill narrative for every scaffold and assemble the tickets
///
/// Units fan out across workers bounded by `options.max_concurrent`; the
/// collector owns the result buffer, and assembly happens in index order so
/// output is identical to a sequential run.
pub async fn generate_tickets(
    model: Arc<dyn LanguageModel>,
    scaffolds: Vec<TicketScaffold>,
    pack: &IndustryPack,
    options: &ContentOptions,
) -> Vec<Ticket> {
    let total = scaffolds.len();
    let jargon: Vec<String> = pack.jargon.iter().map(|s| (*s).to_owned()).collect();
    let (tx, mut rx) = mpsc::channel::<(u64, Ticket)>(64);
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
    let mut workers = JoinSet::new();

    for scaffold in scaffolds {
        let model = Arc::clone(&model);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        let jargon = jargon.clone();
        let budget = options.retry;
        workers.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let index = scaffold.index;
            let ticket = narrate_ticket(model.as_ref(), scaffold, &jargon, budget).await;
            let _ = tx.send((index, ticket)).await;
        });
    }
    drop(tx);

    // Single-writer collection into index-addressed slots
    let mut slots: Vec<Option<Ticket>> = (0..total).map(|_| None).collect();
    while let Some((index, ticket)) = rx.recv().await {
        slots[usize::try_from(index).unwrap_or(0)] = Some(ticket);
    }
    while workers.join_next().await.is_some() {}

    slots.into_iter().flatten().collect()
}

async fn narrate_ticket(
    model: &dyn LanguageModel,
    scaffold: TicketScaffold,
    jargon: &[String],
    budget: RetryBudget,
) -> Ticket {
    let context = PromptContext {
        unit_id: scaffold.id.as_str().to_owned(),
        hints: jargon.to_vec(),
    };

    let title_policy = NarrativePolicy::length(8, 120)
        .ban("as an AI")
        .ban("language model");
    let title_prompt = format!(
        "Write a one-line issue-tracker title for: {}. Priority {:?}, {:?}.",
        scaffold.topic, scaffold.priority, scaffold.kind
    );
    let title = narrate(model, &title_prompt, &context, &title_policy, budget, &scaffold.topic).await;

    let description_fallback = format!(
        "{}. Scope covers {} while meeting {}. Acceptance: failure paths covered by tests, \
         metrics wired into the dashboard, and a rollout note for support.",
        scaffold.topic,
        jargon.first().map_or("the agreed interfaces", String::as_str),
        scaffold.constraint,
    );
    let description_policy = NarrativePolicy::length(40, 1200)
        .ban("as an AI")
        .ban("language model");
    let description_prompt = format!(
        "Write a 2-4 sentence issue description for: {}. It must respect {}.",
        scaffold.topic, scaffold.constraint
    );
    let description = narrate(
        model,
        &description_prompt,
        &context,
        &description_policy,
        budget,
        &description_fallback,
    )
    .await;

    let comment_policy = NarrativePolicy::length(5, 600).ban("as an AI").ban("language model");
    let mut comments = Vec::with_capacity(scaffold.comment_slots.len());
    for slot in &scaffold.comment_slots {
        let (prompt, fallback) = match slot.kind {
            CommentKind::Discussion => (
                format!("Write a short work-in-progress comment on: {}.", scaffold.topic),
                "Picked this up; will update the thread once the first cut is in staging.".to_owned(),
            ),
            CommentKind::Review => (
                format!("Write a code review sign-off comment for: {}.", scaffold.topic),
                "Code review done, looks good to merge once CI is green.".to_owned(),
            ),
        };
        let mut body = narrate(model, &prompt, &context, &comment_policy, budget, &fallback).await;
        // The auditor classifies review comments by wording, not by slot
        // kind; enforce the wording before the ticket is assembled.
        if slot.kind == CommentKind::Review && !is_review_comment(&body) {
            body = fallback;
        }
        comments.push(Comment {
            id: slot.id.clone(),
            author_id: slot.author_id.clone(),
            at: slot.at,
            body,
            kind: slot.kind,
        });
    }

    Ticket {
        id: scaffold.id,
        project_id: scaffold.project_id,
        epic_id: scaffold.epic_id,
        sprint_id: scaffold.sprint_id,
        kind: scaffold.kind,
        title,
        description,
        priority: scaffold.priority,
        story_points: scaffold.story_points,
        reporter_id: scaffold.reporter_id,
        assignee_id: scaffold.assignee_id,
        status_timeline: scaffold.status_timeline,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FlakyModel, TemplateModel};
    use crate::pack::pack_for;
    use crate::test_support::{fixture, Fixture};

    fn options() -> ContentOptions {
        ContentOptions {
            tickets_min: 8,
            tickets_max: 8,
            ..ContentOptions::for_tests()
        }
    }

    #[test]
    fn scaffolds_are_deterministic() {
        let run = || {
            let Fixture { registry, calendar, roster, plan } = fixture();
            let scaffolds = plan_tickets(
                &registry,
                &calendar,
                &roster,
                &plan,
                pack_for("fintech"),
                &options(),
            )
            .unwrap();
            scaffolds
                .iter()
                .map(|s| (s.id.as_str().to_owned(), s.assignee_id.as_str().to_owned(), s.topic.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn timelines_are_strictly_increasing_and_in_sprint() {
        let Fixture { registry, calendar, roster, plan } = fixture();
        let scaffolds =
            plan_tickets(&registry, &calendar, &roster, &plan, pack_for("fintech"), &options())
                .unwrap();

        for scaffold in &scaffolds {
            let sprint = plan
                .sprints
                .iter()
                .find(|s| s.id == scaffold.sprint_id)
                .unwrap();
            for pair in scaffold.status_timeline.windows(2) {
                assert!(pair[0].at < pair[1].at, "timeline not increasing");
                assert!(pair[1].status.rank() > pair[0].status.rank());
            }
            for change in &scaffold.status_timeline {
                assert!(sprint.contains(change.at), "transition outside sprint");
            }
            for slot in &scaffold.comment_slots {
                assert!(sprint.contains(slot.at), "comment outside sprint");
            }
        }
    }

    #[test]
    fn done_tickets_get_review_slot() {
        let Fixture { registry, calendar, roster, plan } = fixture();
        let scaffolds =
            plan_tickets(&registry, &calendar, &roster, &plan, pack_for("fintech"), &options())
                .unwrap();

        for scaffold in scaffolds {
            let done = scaffold
                .status_timeline
                .last()
                .is_some_and(|c| c.status == Status::Done);
            if done {
                assert!(
                    scaffold.comment_slots.iter().any(|s| s.kind == CommentKind::Review),
                    "{} is Done without a review slot",
                    scaffold.id
                );
            }
        }
    }

    #[tokio::test]
    async fn narrative_assembly_preserves_scaffold() {
        let Fixture { registry, calendar, roster, plan } = fixture();
        let opts = options();
        let scaffolds =
            plan_tickets(&registry, &calendar, &roster, &plan, pack_for("fintech"), &opts).unwrap();
        let expected: Vec<String> = scaffolds.iter().map(|s| s.id.as_str().to_owned()).collect();

        let tickets =
            generate_tickets(TemplateModel::shared(), scaffolds, pack_for("fintech"), &opts).await;

        let got: Vec<String> = tickets.iter().map(|t| t.id.as_str().to_owned()).collect();
        assert_eq!(got, expected);
        for ticket in &tickets {
            assert!(!ticket.title.is_empty());
            assert!(ticket.description.len() >= 40);
        }
    }

    #[tokio::test]
    async fn empty_model_output_falls_back_and_keeps_review_rule() {
        let Fixture { registry, calendar, roster, plan } = fixture();
        let opts = options();
        let scaffolds =
            plan_tickets(&registry, &calendar, &roster, &plan, pack_for("fintech"), &opts).unwrap();

        // The model returns empty strings forever: every field must fall
        // back to its template and Done tickets must still classify.
        let model: Arc<dyn LanguageModel> = Arc::new(FlakyModel::new(u32::MAX, "unused"));
        let tickets = generate_tickets(model, scaffolds, pack_for("fintech"), &opts).await;

        for ticket in &tickets {
            assert!(!ticket.description.is_empty());
            if ticket.is_done() {
                assert!(ticket.has_review_comment(), "{} lost its review comment", ticket.id);
            }
        }
    }
}
