//! The append-only dataset aggregate
//!
//! One [`Dataset`] is exclusively owned by a pipeline run. Stages read the
//! sections produced before them and append to their own; nothing is ever
//! removed or rewritten. Insertion order equals allocation order, which is
//! what keeps exports deterministically ordered.

use crate::id::{EpicId, PersonId, ProjectId, SprintId, TicketId};
use crate::mail::MailMessage;
use crate::person::Person;
use crate::planning::{Epic, Project, Sprint};
use crate::ticket::Ticket;
use indexmap::IndexMap;
use serde::Serialize;

/// Aggregate of everything a run has generated so far
#[derive(Debug, Default)]
pub struct Dataset {
    persons: IndexMap<PersonId, Person>,
    projects: IndexMap<ProjectId, Project>,
    epics: IndexMap<EpicId, Epic>,
    sprints: IndexMap<SprintId, Sprint>,
    tickets: IndexMap<TicketId, Ticket>,
    mailboxes: IndexMap<PersonId, Vec<MailMessage>>,
}

impl Dataset {
    /// Create an empty dataset
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a person
    pub fn add_person(&mut self, person: Person) {
        self.persons.insert(person.id.clone(), person);
    }

    /// Append a project
    pub fn add_project(&mut self, project: Project) {
        self.projects.insert(project.id.clone(), project);
    }

    /// Append an epic
    pub fn add_epic(&mut self, epic: Epic) {
        self.epics.insert(epic.id.clone(), epic);
    }

    /// Append a sprint
    pub fn add_sprint(&mut self, sprint: Sprint) {
        self.sprints.insert(sprint.id.clone(), sprint);
    }

    /// Append a ticket
    pub fn add_ticket(&mut self, ticket: Ticket) {
        self.tickets.insert(ticket.id.clone(), ticket);
    }

    /// Append a mail message to its recipient-owner's mailbox
    pub fn add_mail(&mut self, owner: PersonId, message: MailMessage) {
        self.mailboxes.entry(owner).or_default().push(message);
    }

    /// Look up a person
    #[must_use]
    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.persons.get(id)
    }

    /// Look up a ticket
    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.get(id)
    }

    /// Look up a sprint
    #[must_use]
    pub fn sprint(&self, id: &SprintId) -> Option<&Sprint> {
        self.sprints.get(id)
    }

    /// All persons in allocation order
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    /// All projects in allocation order
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// All epics in allocation order
    pub fn epics(&self) -> impl Iterator<Item = &Epic> {
        self.epics.values()
    }

    /// All sprints in allocation order
    pub fn sprints(&self) -> impl Iterator<Item = &Sprint> {
        self.sprints.values()
    }

    /// All tickets in allocation order
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    /// Mailbox for a person; empty if none generated
    #[must_use]
    pub fn mailbox(&self, owner: &PersonId) -> &[MailMessage] {
        self.mailboxes.get(owner).map_or(&[], Vec::as_slice)
    }

    /// All mailboxes in owner allocation order
    pub fn mailboxes(&self) -> impl Iterator<Item = (&PersonId, &[MailMessage])> {
        self.mailboxes.iter().map(|(id, msgs)| (id, msgs.as_slice()))
    }

    /// All mail messages across every mailbox
    pub fn all_mail(&self) -> impl Iterator<Item = &MailMessage> {
        self.mailboxes.values().flatten()
    }

    /// Persons holding the manager level
    pub fn managers(&self) -> impl Iterator<Item = &Person> {
        self.persons.values().filter(|p| p.is_manager())
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            persons: self.persons.len(),
            projects: self.projects.len(),
            epics: self.epics.len(),
            sprints: self.sprints.len(),
            tickets: self.tickets.len(),
            mail_messages: self.mailboxes.values().map(Vec::len).sum(),
        }
    }
}

/// Entity counts for log lines and the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub persons: usize,
    pub projects: usize,
    pub epics: usize,
    pub sprints: usize,
    pub tickets: usize,
    pub mail_messages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PersonId;
    use crate::person::{Geo, Level};

    fn person(id: &str, level: Level) -> Person {
        Person {
            id: PersonId::from_raw(id),
            name: "Test Person".into(),
            role: level.title().into(),
            level,
            geo: Geo("Bengaluru".into()),
            manager_id: None,
            skills: vec![],
        }
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut dataset = Dataset::new();
        dataset.add_person(person("PER-0002", Level::Senior));
        dataset.add_person(person("PER-0001", Level::Junior));

        let ids: Vec<&str> = dataset.persons().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["PER-0002", "PER-0001"]);
    }

    #[test]
    fn managers_filter() {
        let mut dataset = Dataset::new();
        dataset.add_person(person("PER-0001", Level::Manager));
        dataset.add_person(person("PER-0002", Level::Junior));

        let managers: Vec<&str> = dataset.managers().map(|p| p.id.as_str()).collect();
        assert_eq!(managers, vec!["PER-0001"]);
    }

    #[test]
    fn empty_mailbox_is_empty_slice() {
        let dataset = Dataset::new();
        assert!(dataset.mailbox(&PersonId::from_raw("PER-0001")).is_empty());
    }

    #[test]
    fn stats_count_all_sections() {
        let mut dataset = Dataset::new();
        dataset.add_person(person("PER-0001", Level::Junior));
        let stats = dataset.stats();
        assert_eq!(stats.persons, 1);
        assert_eq!(stats.tickets, 0);
        assert_eq!(stats.mail_messages, 0);
    }
}
