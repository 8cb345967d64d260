//! End-to-end pipeline tests over the deterministic template capability
//!
//! No network, no live provider: the stub model makes full runs cheap and
//! reproducible, which is exactly how downstream fixture consumers run.

use okg_audit::Rule;
use okg_content::{FlakyModel, LanguageModel, TemplateModel};
use okg_core::{GenerationConfig, Pipeline, PipelineError};
use std::sync::Arc;

fn config(headcount: usize, span: (u32, u32), tickets: (u32, u32), end: &str) -> GenerationConfig {
    let yaml = format!(
        r"
industry: fintech_saas
company:
  name: VistaraPay
  mission: Payments infrastructure for Indian SMEs
time_window:
  start: 2025-03-03
  end: {end}
  timezone: Asia/Kolkata
  business_days_only: true
org:
  team_name: Payments Core
  headcount: {headcount}
  geo: [Bengaluru, Mumbai, Remote-IN]
  manager_span: {{ min: {}, max: {} }}
project:
  key: PAY
  name: Payment Gateway
  sprint_length_days: 10
volumes:
  tickets_in_window: {{ min: {}, max: {} }}
  emails_per_person_per_week: {{ min: 4, max: 6 }}
audit:
  policy: hard_fail
seed: 42
outputs: [jira, email]
",
        span.0, span.1, tickets.0, tickets.1
    );
    serde_yaml::from_str(&yaml).expect("test config parses")
}

/// Thirty tickets over a five-week business-day window audit clean
#[tokio::test]
async fn five_week_window_thirty_tickets_audits_clean() {
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(8, (2, 8), (30, 30), "2025-04-04"), TemplateModel::shared());

    let summary = pipeline.run(out.path(), false).await.unwrap();

    assert!(summary.report.passed(), "{}", summary.report.generate_text());
    assert_eq!(summary.report.of_rule(Rule::Chronology).count(), 0);
    assert_eq!(summary.stats.tickets, 30);
    assert!(summary.stats.mail_messages > 0);

    let manifest = summary.manifest.expect("export ran");
    manifest.verify(out.path()).unwrap();
}

#[tokio::test]
async fn same_seed_reproduces_identical_artifacts() {
    let run = |dir: std::path::PathBuf| async move {
        let pipeline =
            Pipeline::new(config(8, (2, 8), (12, 16), "2025-04-04"), TemplateModel::shared());
        let summary = pipeline.run(&dir, false).await.unwrap();
        serde_json::to_string(&summary.manifest.expect("export ran")).unwrap()
    };

    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = run(a.path().to_path_buf()).await;
    let second = run(b.path().to_path_buf()).await;

    // Identical manifests imply identical digests for every artifact
    assert_eq!(first, second);
}

#[tokio::test]
async fn dry_run_stops_after_planning() {
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(8, (2, 8), (12, 16), "2025-04-04"), TemplateModel::shared());

    let summary = pipeline.run(out.path(), true).await.unwrap();

    assert!(summary.manifest.is_none());
    assert!(summary.stats.persons > 0);
    assert!(summary.stats.sprints > 0);
    assert_eq!(summary.stats.tickets, 0);
    assert_eq!(summary.stats.mail_messages, 0);
    assert!(!out.path().join("manifest.json").exists());
}

/// A three-person roster cannot satisfy a 6-8 manager span
#[tokio::test]
async fn unsatisfiable_span_fails_before_content() {
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(3, (6, 8), (12, 16), "2025-04-04"), TemplateModel::shared());

    let result = pipeline.run(out.path(), false).await;

    assert!(matches!(result, Err(PipelineError::Org(_))));
    assert!(!out.path().join("jira.json").exists());
}

/// A provider that only ever returns empty strings: every narrative field
/// falls back to its template and the dataset still audits clean
#[tokio::test]
async fn exhausted_retries_fall_back_and_still_pass_audit() {
    let out = tempfile::tempdir().unwrap();
    let model: Arc<dyn LanguageModel> = Arc::new(FlakyModel::new(u32::MAX, "unused"));
    let pipeline = Pipeline::new(config(8, (2, 8), (10, 12), "2025-04-04"), model);

    let summary = pipeline.run(out.path(), false).await.unwrap();
    assert!(summary.report.passed(), "{}", summary.report.generate_text());
}

#[tokio::test]
async fn window_shorter_than_a_sprint_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    // One business week against 10-day sprints
    let pipeline = Pipeline::new(config(8, (2, 8), (10, 12), "2025-03-07"), TemplateModel::shared());

    let result = pipeline.run(out.path(), false).await;
    assert!(matches!(result, Err(PipelineError::Plan(_))));
}
