//! Mailbox generation
//!
//! Mailboxes are planned per person per week from persona volume tables.
//! Category distribution is made structural rather than statistical:
//! - spam can only land on a sparse index stripe, keeping the global share
//!   under the audit cap by construction;
//! - off-hours sampling is only enabled on another sparse stripe, keeping
//!   business-hours share comfortably above the audit floor;
//! - managers get a fixed non-project stripe that clears the inbox-diversity
//!   floor before any sampling runs.
//!
//! As with tickets, all ids and envelopes are fixed during the sequential
//! planning pass; the concurrent phase only fills bodies.

use crate::capability::{narrate, LanguageModel, NarrativePolicy, PromptContext, RetryBudget};
use crate::options::ContentOptions;
use crate::persona::Persona;
use okg_calendar::{range_inclusive, unit_rng, weighted_index, BusinessCalendar, HoursBias};
use okg_model::{
    IdRegistry, Importance, MailCategory, MailMessage, MailRefs, MessageId, Person, PersonId,
    Priority, ThreadId, Ticket, TicketId,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

const MANAGERIAL_SUBJECTS: [&str; 6] = [
    "1:1 agenda",
    "Sprint status check-in",
    "Quarterly goals draft",
    "On-call roster update",
    "Hiring loop feedback needed",
    "Team capacity planning",
];

const NON_PROJECT_SUBJECTS: [&str; 7] = [
    "Townhall recording now available",
    "HR policy refresh - action needed",
    "Vendor invoice approval",
    "Facilities: weekend maintenance window",
    "Security awareness training reminder",
    "Team offsite logistics",
    "Benefits enrollment window open",
];

const SPAM_SUBJECTS: [&str; 4] = [
    "Exclusive offer just for you",
    "Your account needs verification",
    "Congratulations, you were selected",
    "Final notice: claim your reward",
];

/// Only every 25th unit may carry spam; the global share stays under 4%
const SPAM_STRIDE: u64 = 25;
/// Only every 8th unit may sample outside strict business hours
const OFF_HOURS_STRIDE: u64 = 8;
/// Every 4th manager message is forced non-project
const MANAGER_NON_PROJECT_STRIDE: u64 = 4;

/// Deterministic skeleton of one mail message
#[derive(Debug, Clone)]
pub struct MailScaffold {
    pub index: u64,
    pub id: MessageId,
    pub thread_id: ThreadId,
    /// Mailbox this message lands in (primary recipient)
    pub owner: PersonId,
    pub subject: String,
    pub from: PersonId,
    pub to: Vec<PersonId>,
    pub cc: Vec<PersonId>,
    pub timestamp: DateTime<Utc>,
    pub category: MailCategory,
    pub importance: Importance,
    pub refs: MailRefs,
    /// Topic phrase driving the body prompt
    pub topic: String,
}

/// Plan every mailbox scaffold for the run
///
/// Sequential and deterministic; allocates message and thread ids in index
/// order. Tickets must already exist - work mail references them.
pub fn plan_mail(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    persons: &[Person],
    tickets: &[Ticket],
    options: &ContentOptions,
) -> Vec<MailScaffold> {
    let weeks: Vec<Vec<NaiveDate>> = calendar.days().chunks(5).map(<[NaiveDate]>::to_vec).collect();
    let mut scaffolds = Vec::new();
    let mut threads: HashMap<(PersonId, TicketId), (ThreadId, DateTime<Utc>)> = HashMap::new();
    let mut index: u64 = 0;

    for (person_idx, person) in persons.iter().enumerate() {
        let persona = Persona::for_person(person);

        // Weekly volumes first, so stripe rules can see the person total
        let volumes: Vec<u32> = weeks
            .iter()
            .enumerate()
            .map(|(week_idx, _)| {
                let mut rng = unit_rng(
                    options.seed,
                    "mail-volume",
                    ((person_idx as u64) << 16) | week_idx as u64,
                );
                let range = options.emails_per_week.unwrap_or_else(|| persona.weekly_volume());
                range_inclusive(&mut rng, range.min, range.max)
            })
            .collect();
        let person_total: u64 = volumes.iter().map(|v| u64::from(*v)).sum();

        let mut person_msg: u64 = 0;
        for (week_idx, week) in weeks.iter().enumerate() {
            for _ in 0..volumes[week_idx] {
                let mut rng = unit_rng(options.seed, "mail", index);
                let scaffold = plan_one(
                    registry,
                    calendar,
                    persons,
                    tickets,
                    person,
                    persona,
                    week,
                    &mut threads,
                    PlanSlot {
                        index,
                        person_msg,
                        person_total,
                    },
                    &mut rng,
                );
                scaffolds.push(scaffold);
                index += 1;
                person_msg += 1;
            }
        }
    }

    tracing::info!(messages = scaffolds.len(), "planned mailbox scaffolds");
    scaffolds
}

/// Position of one message in the plan
#[derive(Debug, Clone, Copy)]
struct PlanSlot {
    index: u64,
    person_msg: u64,
    person_total: u64,
}

#[allow(clippy::too_many_arguments)]
fn plan_one(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    persons: &[Person],
    tickets: &[Ticket],
    owner: &Person,
    persona: Persona,
    week: &[NaiveDate],
    threads: &mut HashMap<(PersonId, TicketId), (ThreadId, DateTime<Utc>)>,
    slot: PlanSlot,
    rng: &mut StdRng,
) -> MailScaffold {
    let category = pick_category(persona, slot, rng);

    let bias = if slot.index % OFF_HOURS_STRIDE == 3 {
        HoursBias::Natural
    } else {
        HoursBias::BusinessHours
    };
    let day = week[rng.gen_range(0..week.len())];
    let timestamp = calendar.sample_instant(rng, day, bias);

    match category {
        MailCategory::Work => {
            plan_work(registry, calendar, persons, tickets, owner, threads, slot.index, timestamp, rng)
        }
        MailCategory::Managerial => plan_managerial(registry, persons, owner, slot.index, timestamp, rng),
        MailCategory::NonProject => {
            plan_broadcast(registry, persons, owner, MailCategory::NonProject, slot.index, timestamp, rng)
        }
        MailCategory::Spam => {
            plan_broadcast(registry, persons, owner, MailCategory::Spam, slot.index, timestamp, rng)
        }
    }
}

fn pick_category(persona: Persona, slot: PlanSlot, rng: &mut StdRng) -> MailCategory {
    // Manager stripe first: the diversity floor wins over everything else
    if persona == Persona::Manager
        && (slot.person_msg % MANAGER_NON_PROJECT_STRIDE == 1 || slot.person_total == 1)
    {
        return MailCategory::NonProject;
    }

    if slot.index % SPAM_STRIDE == 7 && rng.gen_bool(0.6) {
        return MailCategory::Spam;
    }

    // Spam is handled above; sample only the first three categories
    let mix = persona.category_mix();
    let weights = [mix.work, mix.managerial, mix.non_project];
    Persona::CATEGORIES[weighted_index(rng, &weights)]
}

#[allow(clippy::too_many_arguments)]
fn plan_work(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    persons: &[Person],
    tickets: &[Ticket],
    owner: &Person,
    threads: &mut HashMap<(PersonId, TicketId), (ThreadId, DateTime<Utc>)>,
    index: u64,
    timestamp: DateTime<Utc>,
    rng: &mut StdRng,
) -> MailScaffold {
    let ticket_bound = !tickets.is_empty() && rng.gen_bool(0.7);
    if !ticket_bound {
        let subject = "Build pipeline status".to_owned();
        return MailScaffold {
            index,
            id: registry.next_message(),
            thread_id: registry.next_thread(),
            owner: owner.id.clone(),
            subject: subject.clone(),
            from: pick_sender(persons, &owner.id, rng),
            to: vec![owner.id.clone()],
            cc: Vec::new(),
            timestamp,
            category: MailCategory::Work,
            importance: Importance::Normal,
            refs: MailRefs::default(),
            topic: subject,
        };
    }

    let involving: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| t.assignee_id == owner.id || t.reporter_id == owner.id)
        .collect();
    let ticket = if involving.is_empty() {
        &tickets[rng.gen_range(0..tickets.len())]
    } else {
        involving[rng.gen_range(0..involving.len())]
    };

    let urgent = matches!(ticket.priority, Priority::High | Priority::Critical);
    let short_title: String = ticket.title.chars().take(48).collect();
    let key = (owner.id.clone(), ticket.id.clone());
    let (thread_id, subject, timestamp) = match threads.get(&key) {
        Some((thread_id, last)) => {
            // Prefer a realistic reply delay; when that lands outside
            // business hours, fall back to the sampled in-hours instant.
            let delayed = *last + calendar.reply_delay(rng, urgent);
            let at = if calendar.is_business_hours(delayed) {
                delayed
            } else {
                timestamp.max(*last + Duration::minutes(5))
            };
            (thread_id.clone(), format!("Re: [{}] {short_title}", ticket.id), at)
        }
        None => (
            registry.next_thread(),
            format!("[{}] {short_title}", ticket.id),
            timestamp,
        ),
    };
    threads.insert(key, (thread_id.clone(), timestamp));

    let from = if ticket.assignee_id == owner.id {
        if ticket.reporter_id == owner.id {
            pick_sender(persons, &owner.id, rng)
        } else {
            ticket.reporter_id.clone()
        }
    } else {
        ticket.assignee_id.clone()
    };

    let cc = if rng.gen_bool(0.3) {
        owner.manager_id.iter().cloned().collect()
    } else {
        Vec::new()
    };

    let importance = match ticket.priority {
        Priority::High | Priority::Critical => Importance::High,
        Priority::Medium => Importance::Normal,
        Priority::Low => {
            if rng.gen_bool(0.3) {
                Importance::Low
            } else {
                Importance::Normal
            }
        }
    };

    MailScaffold {
        index,
        id: registry.next_message(),
        thread_id,
        owner: owner.id.clone(),
        subject,
        from,
        to: vec![owner.id.clone()],
        cc,
        timestamp,
        category: MailCategory::Work,
        importance,
        refs: MailRefs {
            ticket_ids: vec![ticket.id.clone()],
            ..MailRefs::default()
        },
        topic: ticket.title.clone(),
    }
}

fn plan_managerial(
    registry: &IdRegistry,
    persons: &[Person],
    owner: &Person,
    index: u64,
    timestamp: DateTime<Utc>,
    rng: &mut StdRng,
) -> MailScaffold {
    let from = owner
        .manager_id
        .clone()
        .unwrap_or_else(|| pick_sender(persons, &owner.id, rng));
    let subject = MANAGERIAL_SUBJECTS[rng.gen_range(0..MANAGERIAL_SUBJECTS.len())].to_owned();
    let importance = if rng.gen_bool(0.2) {
        Importance::High
    } else {
        Importance::Normal
    };

    MailScaffold {
        index,
        id: registry.next_message(),
        thread_id: registry.next_thread(),
        owner: owner.id.clone(),
        subject: subject.clone(),
        from,
        to: vec![owner.id.clone()],
        cc: Vec::new(),
        timestamp,
        category: MailCategory::Managerial,
        importance,
        refs: MailRefs::default(),
        topic: subject,
    }
}

fn plan_broadcast(
    registry: &IdRegistry,
    persons: &[Person],
    owner: &Person,
    category: MailCategory,
    index: u64,
    timestamp: DateTime<Utc>,
    rng: &mut StdRng,
) -> MailScaffold {
    let (subject, importance) = if category == MailCategory::Spam {
        (SPAM_SUBJECTS[rng.gen_range(0..SPAM_SUBJECTS.len())].to_owned(), Importance::Low)
    } else {
        let subject = NON_PROJECT_SUBJECTS[rng.gen_range(0..NON_PROJECT_SUBJECTS.len())].to_owned();
        let importance = if rng.gen_bool(0.3) { Importance::Low } else { Importance::Normal };
        (subject, importance)
    };

    MailScaffold {
        index,
        id: registry.next_message(),
        thread_id: registry.next_thread(),
        owner: owner.id.clone(),
        subject: subject.clone(),
        from: pick_sender(persons, &owner.id, rng),
        to: vec![owner.id.clone()],
        cc: Vec::new(),
        timestamp,
        category,
        importance,
        refs: MailRefs::default(),
        topic: subject,
    }
}

fn pick_sender(persons: &[Person], owner: &PersonId, rng: &mut StdRng) -> PersonId {
    let others: Vec<&Person> = persons.iter().filter(|p| &p.id != owner).collect();
    if others.is_empty() {
        return owner.clone();
    }
    others[rng.gen_range(0..others.len())].id.clone()
}

/// Fill bodies and assemble the messages, owner-tagged, in index order
pub async fn generate_mail(
    model: Arc<dyn LanguageModel>,
    scaffolds: Vec<MailScaffold>,
    persons: &[Person],
    options: &ContentOptions,
) -> Vec<(PersonId, MailMessage)> {
    let total = scaffolds.len();
    let signatures: HashMap<PersonId, String> = persons
        .iter()
        .map(|p| {
            let persona = Persona::for_person(p);
            (p.id.clone(), persona.signature(p, &options.company_name))
        })
        .collect();
    let signatures = Arc::new(signatures);

    let (tx, mut rx) = mpsc::channel::<(u64, PersonId, MailMessage)>(64);
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
    let mut workers = JoinSet::new();

    for scaffold in scaffolds {
        let model = Arc::clone(&model);
        let semaphore = Arc::clone(&semaphore);
        let signatures = Arc::clone(&signatures);
        let tx = tx.clone();
        let budget = options.retry;
        workers.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let index = scaffold.index;
            let owner = scaffold.owner.clone();
            let signature = signatures.get(&scaffold.from).cloned().unwrap_or_default();
            let message = narrate_message(model.as_ref(), scaffold, &signature, budget).await;
            let _ = tx.send((index, owner, message)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<(PersonId, MailMessage)>> = (0..total).map(|_| None).collect();
    while let Some((index, owner, message)) = rx.recv().await {
        slots[usize::try_from(index).unwrap_or(0)] = Some((owner, message));
    }
    while workers.join_next().await.is_some() {}

    slots.into_iter().flatten().collect()
}

async fn narrate_message(
    model: &dyn LanguageModel,
    scaffold: MailScaffold,
    signature: &str,
    budget: RetryBudget,
) -> MailMessage {
    let context = PromptContext {
        unit_id: scaffold.id.as_str().to_owned(),
        hints: vec![scaffold.topic.clone()],
    };

    let policy = NarrativePolicy::length(10, 2000).ban("as an AI").ban("language model");
    let (prompt, fallback) = body_prompt_and_fallback(&scaffold, signature);
    let body = narrate(model, &prompt, &context, &policy, budget, &fallback).await;

    MailMessage {
        id: scaffold.id,
        thread_id: scaffold.thread_id,
        subject: scaffold.subject,
        from: scaffold.from,
        to: scaffold.to,
        cc: scaffold.cc,
        timestamp: scaffold.timestamp,
        body,
        category: scaffold.category,
        importance: scaffold.importance,
        refs: scaffold.refs,
    }
}

fn body_prompt_and_fallback(scaffold: &MailScaffold, signature: &str) -> (String, String) {
    match scaffold.category {
        MailCategory::Work => (
            format!("Write a short work email body about: {}.", scaffold.topic),
            format!(
                "Quick update on {}: the latest changes are in staging and I am watching the \
                 dashboards before a wider rollout.\n\n{signature}",
                scaffold.topic
            ),
        ),
        MailCategory::Managerial => (
            format!("Write a short people-management email body about: {}.", scaffold.topic),
            format!(
                "Sharing notes ahead of our next sync - agenda and timings below.\n\n{signature}"
            ),
        ),
        MailCategory::NonProject => (
            format!("Write a short internal corporate email body about: {}.", scaffold.topic),
            format!("Details below; please take the relevant action this week.\n\n{signature}"),
        ),
        MailCategory::Spam => (
            format!("Write a short promotional email body titled: {}.", scaffold.topic),
            "Limited-time offer for preferred members. Click through to claim before the window \
             closes. Unsubscribe at any time."
                .to_owned(),
        ),
    }
}
