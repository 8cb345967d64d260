//! The pipeline orchestrator
//!
//! Strictly staged and acyclic: Org -> Planning -> Tickets -> Emails ->
//! Audit -> Export. One [`Dataset`] is owned for the run's lifetime; every
//! stage reads what came before and appends only its own section. The
//! auditor and exporter run behind a full barrier, after all content work
//! has joined.

use crate::config::{ConfigError, GenerationConfig};
use okg_audit::{audit, AuditReport};
use okg_calendar::{unit_rng, BusinessCalendar, SchedulingError};
use okg_content::{
    generate_mail, generate_tickets, pack_for, plan_mail, plan_tickets, ContentOptions,
    LanguageModel, RetryBudget, VolumeRange,
};
use okg_export::{export, ExportError, Manifest};
use okg_model::{AllocationError, Dataset, DatasetStats, IdRegistry, ProjectKey, Ticket};
use okg_org::{OrgError, OrgSpec};
use okg_plan::{PlanError, PlanSpec};
use std::path::Path;
use std::sync::Arc;

/// Umbrella error for a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration - aborts before any stage
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Impossible calendar window
    #[error("scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// Org graph construction failed
    #[error("org error: {0}")]
    Org(#[from] OrgError),

    /// Planning failed
    #[error("planning error: {0}")]
    Plan(#[from] PlanError),

    /// Registry misuse - an orchestration bug
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// Audit found violations under a hard-fail policy
    #[error("audit blocked export with {} violations", report.violations.len())]
    AuditBlocked {
        /// The full report, for rendering at the CLI
        report: AuditReport,
    },

    /// Export failed
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Entity counts
    pub stats: DatasetStats,
    /// Audit findings (empty on a dry run)
    pub report: AuditReport,
    /// Manifest, absent on dry runs
    pub manifest: Option<Manifest>,
}

/// Concurrent narrative workers during content fan-out
const MAX_CONCURRENT_UNITS: usize = 8;

/// Owns one generation run end to end
pub struct Pipeline {
    config: GenerationConfig,
    model: Arc<dyn LanguageModel>,
}

impl Pipeline {
    /// Build a pipeline over a config and a language-model capability
    #[must_use]
    pub fn new(config: GenerationConfig, model: Arc<dyn LanguageModel>) -> Self {
        Self { config, model }
    }

    /// Run the staged pipeline
    ///
    /// `dry_run` stops after planning: config, org, and plan are exercised
    /// but no content is generated and nothing is written.
    ///
    /// # Errors
    /// [`PipelineError`] per the error taxonomy; content-generation
    /// failures are absorbed inside the content stage and never surface.
    pub async fn run(&self, out_dir: &Path, dry_run: bool) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        let config = &self.config;
        let seed = config.seed;
        let pack = pack_for(&config.industry);

        let calendar = BusinessCalendar::new(
            config.time_window.start,
            config.time_window.end,
            config.timezone(),
            config.time_window.business_days_only,
        )?;

        let registry = IdRegistry::new();
        let mut dataset = Dataset::new();

        // Stage: org graph
        tracing::info!(team = %config.org.team_name, "stage: org graph");
        let mut org_rng = unit_rng(seed, "org", 0);
        let roster = okg_org::build(
            &registry,
            &OrgSpec {
                team_name: config.org.team_name.clone(),
                headcount: config.org.headcount,
                geos: config.org.geo.clone(),
                span_min: config.org.manager_span.min as usize,
                span_max: config.org.manager_span.max as usize,
                skills_pool: pack.skills.iter().map(|s| (*s).to_owned()).collect(),
            },
            &mut org_rng,
        )?;
        for person in &roster.persons {
            dataset.add_person(person.clone());
        }

        // Stage: planning
        tracing::info!(project = %config.project.key, "stage: planning");
        let key = ProjectKey::new(config.project.key.clone())
            .map_err(|e| ConfigError::Invalid(vec![format!("project: {e}")]))?;
        let mut plan_rng = unit_rng(seed, "plan", 0);
        let plan = okg_plan::plan(
            &registry,
            &calendar,
            &PlanSpec {
                project_key: key,
                project_name: config.project.name.clone(),
                sprint_length_days: config.project.sprint_length_days,
                epic_titles: pack.products.iter().map(|s| (*s).to_owned()).collect(),
            },
            &mut plan_rng,
        )?;
        dataset.add_project(plan.project.clone());
        for epic in &plan.epics {
            dataset.add_epic(epic.clone());
        }
        for sprint in &plan.sprints {
            dataset.add_sprint(sprint.clone());
        }

        if dry_run {
            tracing::info!("dry run: stopping after planning");
            return Ok(RunSummary {
                stats: dataset.stats(),
                report: AuditReport::default(),
                manifest: None,
            });
        }

        let options = ContentOptions {
            seed,
            company_name: config.company.name.clone(),
            tickets_min: config.volumes.tickets_in_window.min,
            tickets_max: config.volumes.tickets_in_window.max,
            emails_per_week: config.volumes.emails_per_person_per_week.map(|r| VolumeRange {
                min: r.min,
                max: r.max,
            }),
            retry: RetryBudget::default(),
            max_concurrent: MAX_CONCURRENT_UNITS,
        };

        // Stage: tickets
        tracing::info!("stage: tickets");
        let ticket_scaffolds = plan_tickets(&registry, &calendar, &roster, &plan, pack, &options)?;
        let tickets =
            generate_tickets(Arc::clone(&self.model), ticket_scaffolds, pack, &options).await;
        for ticket in tickets {
            dataset.add_ticket(ticket);
        }

        // Stage: emails
        tracing::info!("stage: emails");
        let ticket_view: Vec<Ticket> = dataset.tickets().cloned().collect();
        let mail_scaffolds =
            plan_mail(&registry, &calendar, &roster.persons, &ticket_view, &options);
        let messages =
            generate_mail(Arc::clone(&self.model), mail_scaffolds, &roster.persons, &options).await;
        for (owner, message) in messages {
            dataset.add_mail(owner, message);
        }

        // Stage: audit (full barrier behind content)
        tracing::info!("stage: audit");
        let report = audit(&dataset, &registry, &calendar);
        for violation in &report.violations {
            tracing::warn!(
                entity = %violation.entity_id,
                rule = %violation.rule,
                detail = %violation.detail,
                "audit violation"
            );
        }

        // Stage: export
        tracing::info!("stage: export");
        let manifest = match export(
            &dataset,
            &report,
            config.audit.policy.into(),
            &config.outputs,
            out_dir,
            seed,
        ) {
            Ok(manifest) => Some(manifest),
            Err(ExportError::IncompleteDataset { .. }) => {
                return Err(PipelineError::AuditBlocked { report });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(RunSummary {
            stats: dataset.stats(),
            report,
            manifest,
        })
    }
}
