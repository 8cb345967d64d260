//! OKG Plan - planning stage
//!
//! Derives the project, its epics, and the sprint schedule from the roster's
//! config and the business calendar. Sprints partition the window into
//! contiguous, non-overlapping spans of whole business days, with the first
//! sprint aligned to a business day.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use okg_calendar::BusinessCalendar;
use okg_model::{AllocationError, Epic, IdRegistry, Project, ProjectKey, Sprint};
use rand::rngs::StdRng;
use rand::Rng;

/// Sprint theme names, cycled in order
const SPRINT_THEMES: [&str; 5] = [
    "Foundation and Setup",
    "Core Development",
    "Integration and Testing",
    "Hardening and Polish",
    "Launch Readiness",
];

/// Inputs for the planning stage
#[derive(Debug, Clone)]
pub struct PlanSpec {
    /// Project key, e.g. `PAY`
    pub project_key: ProjectKey,
    /// Project display name
    pub project_name: String,
    /// Sprint length in business days
    pub sprint_length_days: u32,
    /// Candidate epic titles (industry pack products)
    pub epic_titles: Vec<String>,
}

/// Planning failures - fatal, the window cannot host the plan
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Window shorter than a single sprint
    #[error("window holds {days_available} business days, shorter than one {sprint_length_days}-day sprint")]
    InvalidWindow {
        days_available: usize,
        sprint_length_days: u32,
    },

    /// Sprint length of zero days
    #[error("sprint length must be at least one day")]
    ZeroLengthSprint,

    /// Registry misuse - an orchestration bug
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocationError),
}

/// The planning stage output
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    /// The single project of this run
    pub project: Project,
    /// Epics under the project, 2-4 of them
    pub epics: Vec<Epic>,
    /// Sprint schedule, chronological
    pub sprints: Vec<Sprint>,
}

/// Derive project, epics, and sprints
///
/// # Errors
/// [`PlanError::InvalidWindow`] when the window is shorter than one sprint;
/// [`PlanError::Allocation`] on registry misuse.
pub fn plan(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    spec: &PlanSpec,
    rng: &mut StdRng,
) -> Result<ProjectPlan, PlanError> {
    if spec.sprint_length_days == 0 {
        return Err(PlanError::ZeroLengthSprint);
    }

    let days = calendar.days();
    if days.len() < spec.sprint_length_days as usize {
        return Err(PlanError::InvalidWindow {
            days_available: days.len(),
            sprint_length_days: spec.sprint_length_days,
        });
    }

    let project = Project {
        id: registry.register_project(&spec.project_key),
        key: spec.project_key.clone(),
        name: spec.project_name.clone(),
    };

    let epics = derive_epics(registry, &project, &spec.epic_titles, rng)?;
    let sprints = partition_sprints(registry, calendar, &project, spec.sprint_length_days);

    tracing::info!(
        project = %project.id,
        epics = epics.len(),
        sprints = sprints.len(),
        "planning complete"
    );

    Ok(ProjectPlan {
        project,
        epics,
        sprints,
    })
}

fn derive_epics(
    registry: &IdRegistry,
    project: &Project,
    titles: &[String],
    rng: &mut StdRng,
) -> Result<Vec<Epic>, PlanError> {
    let want = if titles.len() <= 2 {
        titles.len().max(1)
    } else {
        rng.gen_range(2..=titles.len().min(4))
    };

    let mut epics = Vec::with_capacity(want);
    for i in 0..want {
        let title = titles
            .get(i % titles.len().max(1))
            .cloned()
            .unwrap_or_else(|| format!("{} Workstream", project.name));
        epics.push(Epic {
            id: registry.next_epic(&project.key)?,
            project_id: project.id.clone(),
            title,
        });
    }
    Ok(epics)
}

fn partition_sprints(
    registry: &IdRegistry,
    calendar: &BusinessCalendar,
    project: &Project,
    length_days: u32,
) -> Vec<Sprint> {
    let (window_start, window_end) = calendar.window();
    let mut sprints = Vec::new();

    let Some(mut start_date) = calendar.align_forward(window_start) else {
        return sprints;
    };

    let mut theme = SPRINT_THEMES.iter().cycle();
    loop {
        let end_date = calendar.add_business_days(start_date, length_days - 1);
        if end_date > window_end {
            break;
        }

        let n = sprints.len() + 1;
        let name = theme.next().map_or_else(String::new, |t| format!("Sprint {n} - {t}"));
        sprints.push(Sprint {
            id: registry.next_sprint(),
            name,
            project_id: project.id.clone(),
            start: calendar.instant(start_date, 9, 0, 0),
            end: calendar.instant(end_date, 18, 0, 0),
        });

        match calendar.align_forward(calendar.add_business_days(end_date, 1)) {
            Some(next) => start_date = next,
            None => break,
        }
    }

    sprints
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use okg_calendar::unit_rng;

    fn calendar(start: (i32, u32, u32), end: (i32, u32, u32)) -> BusinessCalendar {
        BusinessCalendar::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            chrono_tz::Asia::Kolkata,
            true,
        )
        .unwrap()
    }

    fn spec() -> PlanSpec {
        PlanSpec {
            project_key: ProjectKey::new("PAY").unwrap(),
            project_name: "Payment Gateway".into(),
            sprint_length_days: 10,
            epic_titles: vec![
                "Digital Payment Gateway".into(),
                "KYC Verification Platform".into(),
                "Fraud Detection Engine".into(),
                "SME Banking API Suite".into(),
            ],
        }
    }

    #[test]
    fn sprints_are_contiguous_and_disjoint() {
        let registry = IdRegistry::new();
        // Six business weeks: exactly three 10-business-day sprints
        let cal = calendar((2025, 3, 3), (2025, 4, 11));
        let mut rng = unit_rng(42, "plan", 0);
        let plan = plan(&registry, &cal, &spec(), &mut rng).unwrap();

        assert_eq!(plan.sprints.len(), 3);
        for pair in plan.sprints.windows(2) {
            assert!(pair[0].end < pair[1].start, "sprints overlap");
        }
        // First sprint starts on a business day at opening time
        let first_local = plan.sprints[0].start.with_timezone(&cal.timezone());
        assert!(cal.is_business_day(first_local.date_naive()));
    }

    #[test]
    fn sprint_ids_and_themes_are_sequential() {
        let registry = IdRegistry::new();
        let cal = calendar((2025, 3, 3), (2025, 4, 11));
        let mut rng = unit_rng(42, "plan", 1);
        let plan = plan(&registry, &cal, &spec(), &mut rng).unwrap();

        assert_eq!(plan.sprints[0].id.as_str(), "SPRINT-1");
        assert!(plan.sprints[0].name.starts_with("Sprint 1 - Foundation"));
        assert!(plan.sprints[1].name.starts_with("Sprint 2 - Core"));
    }

    #[test]
    fn short_window_is_rejected() {
        let registry = IdRegistry::new();
        // One business week cannot host a 10-day sprint
        let cal = calendar((2025, 3, 3), (2025, 3, 7));
        let mut rng = unit_rng(42, "plan", 2);
        let result = plan(&registry, &cal, &spec(), &mut rng);
        assert!(matches!(
            result,
            Err(PlanError::InvalidWindow { days_available: 5, sprint_length_days: 10 })
        ));
    }

    #[test]
    fn epic_count_within_bounds() {
        let registry = IdRegistry::new();
        let cal = calendar((2025, 3, 3), (2025, 4, 11));
        let mut rng = unit_rng(42, "plan", 3);
        let plan = plan(&registry, &cal, &spec(), &mut rng).unwrap();

        assert!(plan.epics.len() >= 2 && plan.epics.len() <= 4);
        assert!(plan.epics[0].id.as_str().starts_with("EPIC-PAY-"));
        for epic in &plan.epics {
            assert_eq!(epic.project_id, plan.project.id);
        }
    }

    #[test]
    fn plan_is_reproducible() {
        let run = || {
            let registry = IdRegistry::new();
            let cal = calendar((2025, 3, 3), (2025, 4, 11));
            let mut rng = unit_rng(42, "plan", 4);
            let plan = plan(&registry, &cal, &spec(), &mut rng).unwrap();
            (
                plan.epics.iter().map(|e| e.title.clone()).collect::<Vec<_>>(),
                plan.sprints.iter().map(|s| (s.start, s.end)).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(), run());
    }
}
