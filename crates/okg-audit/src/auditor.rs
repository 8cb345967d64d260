//! The cross-reference validator
//!
//! Runs after all content stages have joined. Read-only: findings are
//! collected into a report, never raised as errors, and every rule runs
//! independently so one entity can surface multiple violations.

use crate::report::{AuditReport, AuditStats, Rule, Violation};
use okg_calendar::BusinessCalendar;
use okg_model::{Dataset, IdRegistry, MailCategory, MailMessage, Person, Ticket};
use once_cell::sync::Lazy;
use regex::Regex;

/// Global spam cap
const SPAM_CAP: f64 = 0.05;
/// Business-hours floor across all mail
const BUSINESS_HOURS_FLOOR: f64 = 0.85;
/// Non-project floor for manager inboxes
const MANAGER_NON_PROJECT_FLOOR: f64 = 0.20;

/// `[KEY-####]` ticket tokens inside subjects
static SUBJECT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z]{2,6}-\d+)\]").expect("valid token pattern"));

/// Audit the complete dataset against the global invariants
#[must_use]
pub fn audit(dataset: &Dataset, registry: &IdRegistry, calendar: &BusinessCalendar) -> AuditReport {
    let mut violations = Vec::new();

    check_org_shape(dataset, registry, &mut violations);
    for ticket in dataset.tickets() {
        check_ticket(dataset, registry, ticket, &mut violations);
    }

    let mut total_mail = 0usize;
    let mut spam = 0usize;
    let mut in_hours = 0usize;
    for (_, mailbox) in dataset.mailboxes() {
        for message in mailbox {
            check_message(dataset, registry, message, &mut violations);
            total_mail += 1;
            if message.category == MailCategory::Spam {
                spam += 1;
            }
            if calendar.is_business_hours(message.timestamp) {
                in_hours += 1;
            }
        }
    }

    check_aggregates(total_mail, spam, in_hours, &mut violations);
    for manager in dataset.managers() {
        check_manager_inbox(dataset, manager, &mut violations);
    }
    check_export_ordering(dataset, &mut violations);

    #[allow(clippy::cast_precision_loss)]
    let stats = AuditStats {
        tickets_checked: dataset.tickets().count(),
        messages_checked: total_mail,
        spam_ratio: if total_mail == 0 { 0.0 } else { spam as f64 / total_mail as f64 },
        business_hours_ratio: if total_mail == 0 {
            1.0
        } else {
            in_hours as f64 / total_mail as f64
        },
    };

    tracing::info!(
        violations = violations.len(),
        spam_ratio = stats.spam_ratio,
        business_hours_ratio = stats.business_hours_ratio,
        "audit complete"
    );

    AuditReport { violations, stats }
}

fn check_org_shape(dataset: &Dataset, registry: &IdRegistry, out: &mut Vec<Violation>) {
    let roots: Vec<&Person> = dataset.persons().filter(|p| p.is_root()).collect();
    if dataset.persons().count() > 0 && roots.len() != 1 {
        out.push(Violation::new(
            "dataset",
            Rule::OrgShape,
            format!("expected exactly one root, found {}", roots.len()),
        ));
    }

    let headcount = dataset.persons().count();
    for person in dataset.persons() {
        if let Some(manager_id) = &person.manager_id {
            if !registry.resolve(manager_id.as_str()) || dataset.person(manager_id).is_none() {
                out.push(Violation::new(
                    person.id.as_str(),
                    Rule::ReferentialIntegrity,
                    format!("manager {manager_id} does not resolve"),
                ));
                continue;
            }
            // Walk up; exceeding the headcount means a cycle
            let mut current = person;
            let mut hops = 0;
            while let Some(next_id) = &current.manager_id {
                match dataset.person(next_id) {
                    Some(next) => current = next,
                    None => break,
                }
                hops += 1;
                if hops > headcount {
                    out.push(Violation::new(
                        person.id.as_str(),
                        Rule::OrgShape,
                        "manager chain does not reach a root",
                    ));
                    break;
                }
            }
        }
    }
}

fn check_ticket(dataset: &Dataset, registry: &IdRegistry, ticket: &Ticket, out: &mut Vec<Violation>) {
    let mut require = |id: &str, what: &str| {
        if !registry.resolve(id) {
            out.push(Violation::new(
                ticket.id.as_str(),
                Rule::ReferentialIntegrity,
                format!("{what} {id} does not resolve"),
            ));
        }
    };
    require(ticket.project_id.as_str(), "project");
    require(ticket.epic_id.as_str(), "epic");
    require(ticket.sprint_id.as_str(), "sprint");
    require(ticket.reporter_id.as_str(), "reporter");
    require(ticket.assignee_id.as_str(), "assignee");
    for comment in &ticket.comments {
        require(comment.author_id.as_str(), "comment author");
    }

    for pair in ticket.status_timeline.windows(2) {
        if pair[1].at <= pair[0].at {
            out.push(Violation::new(
                ticket.id.as_str(),
                Rule::Chronology,
                format!("transition at {} not after {}", pair[1].at, pair[0].at),
            ));
        }
        if pair[1].status.rank() <= pair[0].status.rank() {
            out.push(Violation::new(
                ticket.id.as_str(),
                Rule::StatusOrder,
                format!("{:?} does not advance {:?}", pair[1].status, pair[0].status),
            ));
        }
    }

    for pair in ticket.comments.windows(2) {
        if pair[1].at < pair[0].at {
            out.push(Violation::new(
                ticket.id.as_str(),
                Rule::Chronology,
                format!("comment {} precedes its predecessor", pair[1].id),
            ));
        }
    }

    if let Some(sprint) = dataset.sprint(&ticket.sprint_id) {
        for change in &ticket.status_timeline {
            if !sprint.contains(change.at) {
                out.push(Violation::new(
                    ticket.id.as_str(),
                    Rule::SprintWindow,
                    format!("transition at {} outside {}", change.at, sprint.id),
                ));
            }
        }
        for comment in &ticket.comments {
            if !sprint.contains(comment.at) {
                out.push(Violation::new(
                    ticket.id.as_str(),
                    Rule::SprintWindow,
                    format!("comment {} outside {}", comment.id, sprint.id),
                ));
            }
        }
    }

    if ticket.is_done() && !ticket.has_review_comment() {
        out.push(Violation::new(
            ticket.id.as_str(),
            Rule::ReviewComment,
            "terminal ticket has no review comment",
        ));
    }
}

fn check_message(
    dataset: &Dataset,
    registry: &IdRegistry,
    message: &MailMessage,
    out: &mut Vec<Violation>,
) {
    let mut require = |id: &str, what: &str| {
        if !registry.resolve(id) {
            out.push(Violation::new(
                message.id.as_str(),
                Rule::ReferentialIntegrity,
                format!("{what} {id} does not resolve"),
            ));
        }
    };
    require(message.from.as_str(), "sender");
    for to in &message.to {
        require(to.as_str(), "recipient");
    }
    for cc in &message.cc {
        require(cc.as_str(), "cc");
    }
    for ticket_id in &message.refs.ticket_ids {
        require(ticket_id.as_str(), "ticket ref");
    }

    // Every subject token must point at a real ticket
    for capture in SUBJECT_TOKEN.captures_iter(&message.subject) {
        let token = &capture[1];
        if dataset.tickets().all(|t| t.id.as_str() != token) {
            out.push(Violation::new(
                message.id.as_str(),
                Rule::SubjectReference,
                format!("subject token [{token}] resolves to no ticket"),
            ));
        }
    }

    // A ticket-bound thread must announce the ticket in its subject
    for ticket_id in &message.refs.ticket_ids {
        if !message.subject.contains(&format!("[{ticket_id}]")) {
            out.push(Violation::new(
                message.id.as_str(),
                Rule::SubjectReference,
                format!("references {ticket_id} but subject lacks [{ticket_id}]"),
            ));
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_aggregates(total: usize, spam: usize, in_hours: usize, out: &mut Vec<Violation>) {
    if total == 0 {
        return;
    }
    let spam_ratio = spam as f64 / total as f64;
    if spam_ratio > SPAM_CAP {
        out.push(Violation::new(
            "dataset",
            Rule::SpamShare,
            format!("spam share {:.1}% exceeds {:.0}%", spam_ratio * 100.0, SPAM_CAP * 100.0),
        ));
    }
    let hours_ratio = in_hours as f64 / total as f64;
    if hours_ratio < BUSINESS_HOURS_FLOOR {
        out.push(Violation::new(
            "dataset",
            Rule::BusinessHoursShare,
            format!(
                "business-hours share {:.1}% below {:.0}%",
                hours_ratio * 100.0,
                BUSINESS_HOURS_FLOOR * 100.0
            ),
        ));
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_manager_inbox(dataset: &Dataset, manager: &Person, out: &mut Vec<Violation>) {
    let mailbox = dataset.mailbox(&manager.id);
    if mailbox.is_empty() {
        return;
    }
    let non_project = mailbox
        .iter()
        .filter(|m| m.category == MailCategory::NonProject)
        .count();
    let ratio = non_project as f64 / mailbox.len() as f64;
    if ratio < MANAGER_NON_PROJECT_FLOOR {
        out.push(Violation::new(
            manager.id.as_str(),
            Rule::ManagerInboxDiversity,
            format!(
                "non-project share {:.1}% below {:.0}%",
                ratio * 100.0,
                MANAGER_NON_PROJECT_FLOOR * 100.0
            ),
        ));
    }
}

fn check_export_ordering(dataset: &Dataset, out: &mut Vec<Violation>) {
    let ids: Vec<&str> = dataset.tickets().map(|t| t.id.as_str()).collect();
    for pair in ids.windows(2) {
        if pair[0] >= pair[1] {
            out.push(Violation::new(
                "dataset",
                Rule::ExportOrdering,
                format!("ticket order breaks at {} -> {}", pair[0], pair[1]),
            ));
            break;
        }
    }
}
