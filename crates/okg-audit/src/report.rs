//! Audit report types

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// The closed set of audited rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Every referenced id resolves in the registry and dataset
    ReferentialIntegrity,
    /// Status timelines only move forward through the fixed order
    StatusOrder,
    /// Event instants are ordered in time
    Chronology,
    /// Ticket instants fall inside the owning sprint window
    SprintWindow,
    /// Done tickets carry a review comment
    ReviewComment,
    /// Subject ticket tokens resolve; referenced tickets appear in subjects
    SubjectReference,
    /// Global spam share stays under the cap
    SpamShare,
    /// Business-hours share stays above the floor
    BusinessHoursShare,
    /// Manager inboxes keep the non-project share floor
    ManagerInboxDiversity,
    /// Dataset sections iterate in export order
    ExportOrdering,
    /// Manager relation is acyclic and single-rooted
    OrgShape,
}

impl Rule {
    /// Stable identifier for report output
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::ReferentialIntegrity => "referential_integrity",
            Rule::StatusOrder => "status_order",
            Rule::Chronology => "chronology",
            Rule::SprintWindow => "sprint_window",
            Rule::ReviewComment => "review_comment",
            Rule::SubjectReference => "subject_reference",
            Rule::SpamShare => "spam_share",
            Rule::BusinessHoursShare => "business_hours_share",
            Rule::ManagerInboxDiversity => "manager_inbox_diversity",
            Rule::ExportOrdering => "export_ordering",
            Rule::OrgShape => "org_shape",
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit finding
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Offending entity, or `dataset` for aggregate rules
    pub entity_id: String,
    /// Violated rule
    pub rule: Rule,
    /// Human-readable specifics
    pub detail: String,
}

impl Violation {
    /// Build a finding
    #[must_use]
    pub fn new(entity_id: impl Into<String>, rule: Rule, detail: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            rule,
            detail: detail.into(),
        }
    }
}

/// Aggregate measurements taken while auditing
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AuditStats {
    pub tickets_checked: usize,
    pub messages_checked: usize,
    /// Spam share of all mail, 0..=1
    pub spam_ratio: f64,
    /// Business-hours share of all mail, 0..=1
    pub business_hours_ratio: f64,
}

/// The auditor's output: findings plus measurements
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub violations: Vec<Violation>,
    pub stats: AuditStats,
}

impl AuditReport {
    /// Whether the dataset passed every rule
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Findings for one rule
    pub fn of_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// Text rendering for the CLI
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Dataset Audit Report ===\n\n");
        out.push_str(&format!("Tickets checked:  {}\n", self.stats.tickets_checked));
        out.push_str(&format!("Messages checked: {}\n", self.stats.messages_checked));
        out.push_str(&format!("Spam share:       {:.1}%\n", self.stats.spam_ratio * 100.0));
        out.push_str(&format!(
            "Business hours:   {:.1}%\n",
            self.stats.business_hours_ratio * 100.0
        ));
        out.push_str(&format!("Violations:       {}\n", self.violations.len()));

        if !self.violations.is_empty() {
            out.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                out.push_str(&format!("{}. [{}] {}: {}\n", i + 1, v.rule, v.entity_id, v.detail));
            }
        }
        out
    }
}

/// What a non-empty report means for export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPolicy {
    /// Violations block export
    HardFail,
    /// Violations are logged; export proceeds
    WarnAndContinue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_passes() {
        let report = AuditReport::default();
        assert!(report.passed());
        assert!(report.generate_text().contains("Violations:       0"));
    }

    #[test]
    fn findings_are_filterable_by_rule() {
        let mut report = AuditReport::default();
        report
            .violations
            .push(Violation::new("PAY-1401", Rule::ReviewComment, "Done without review"));
        report
            .violations
            .push(Violation::new("MSG-001", Rule::SubjectReference, "token unresolved"));

        assert!(!report.passed());
        assert_eq!(report.of_rule(Rule::ReviewComment).count(), 1);
        assert_eq!(report.of_rule(Rule::SpamShare).count(), 0);
    }

    #[test]
    fn text_report_lists_violations() {
        let mut report = AuditReport::default();
        report
            .violations
            .push(Violation::new("PAY-1401", Rule::Chronology, "comment precedes opener"));
        let text = report.generate_text();
        assert!(text.contains("chronology"));
        assert!(text.contains("PAY-1401"));
    }
}
