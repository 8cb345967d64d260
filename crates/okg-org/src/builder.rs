//! Roster construction and the manager tree
//!
//! Level mix is proportional (one manager root always); the manager tree
//! attaches team leads to the root and individual contributors to the
//! supervisor with the lowest span and remaining capacity, after every
//! supervisor has been brought up to the span minimum.

use crate::names::NamePool;
use okg_model::{Geo, IdRegistry, Level, Person, PersonId};
use rand::rngs::StdRng;
use rand::Rng;

/// Proportional level mix for the non-root headcount
const LEVEL_MIX: [(Level, f64); 3] = [
    (Level::Junior, 0.30),
    (Level::Senior, 0.45),
    (Level::TeamLead, 0.20),
];

/// Skill count ranges per level
fn skill_range(level: Level) -> (usize, usize) {
    match level {
        Level::Junior => (3, 5),
        Level::Senior => (5, 7),
        Level::TeamLead => (6, 8),
        Level::Manager => (5, 7),
    }
}

/// Inputs for roster construction
#[derive(Debug, Clone)]
pub struct OrgSpec {
    /// Team display name
    pub team_name: String,
    /// Total roster size, including the manager root
    pub headcount: usize,
    /// Geographic locations to distribute across
    pub geos: Vec<String>,
    /// Minimum direct reports per supervisor
    pub span_min: usize,
    /// Maximum direct reports per supervisor
    pub span_max: usize,
    /// Technical skills pool (from the industry pack)
    pub skills_pool: Vec<String>,
}

/// Org construction failures - fatal, checked before any content stage
#[derive(Debug, thiserror::Error)]
pub enum OrgError {
    /// No manager tree satisfies the span bounds for this headcount
    #[error("manager span {min}-{max} unsatisfiable for headcount {headcount}: {detail}")]
    UnsatisfiableSpan {
        min: usize,
        max: usize,
        headcount: usize,
        detail: String,
    },

    /// Roster must contain at least one person
    #[error("headcount must be at least 1")]
    EmptyRoster,
}

/// The constructed roster
#[derive(Debug, Clone)]
pub struct Roster {
    /// All persons, allocation order (root first)
    pub persons: Vec<Person>,
    /// The single top-level person without a manager
    pub root: PersonId,
}

impl Roster {
    /// Persons at a given level
    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &Person> {
        self.persons.iter().filter(move |p| p.level == level)
    }

    /// Direct reports of a supervisor
    pub fn reports_of<'a>(&'a self, manager: &'a PersonId) -> impl Iterator<Item = &'a Person> {
        self.persons
            .iter()
            .filter(move |p| p.manager_id.as_ref() == Some(manager))
    }
}

/// Build the roster and manager tree
///
/// # Errors
/// [`OrgError::UnsatisfiableSpan`] when the span bounds admit no tree for
/// the requested headcount; [`OrgError::EmptyRoster`] for a zero headcount.
pub fn build(registry: &IdRegistry, spec: &OrgSpec, rng: &mut StdRng) -> Result<Roster, OrgError> {
    if spec.headcount == 0 {
        return Err(OrgError::EmptyRoster);
    }

    let level_counts = split_levels(spec.headcount - 1);
    let team_leads = level_counts[2];
    let contributors = level_counts[0] + level_counts[1];
    check_spans(spec, team_leads, contributors)?;

    tracing::debug!(
        team = %spec.team_name,
        juniors = level_counts[0],
        seniors = level_counts[1],
        team_leads,
        "building roster"
    );

    let mut names = NamePool::new();
    let mut persons = Vec::with_capacity(spec.headcount);

    // Allocation order fixes the id assignment: root manager first, then
    // team leads, seniors, juniors.
    let mut ordered_levels = vec![Level::Manager];
    ordered_levels.extend(std::iter::repeat(Level::TeamLead).take(team_leads));
    ordered_levels.extend(std::iter::repeat(Level::Senior).take(level_counts[1]));
    ordered_levels.extend(std::iter::repeat(Level::Junior).take(level_counts[0]));

    for level in ordered_levels {
        let id = registry.next_person();
        persons.push(Person {
            id,
            name: names.draw(rng),
            role: level.title().to_owned(),
            level,
            geo: draw_geo(&spec.geos, rng),
            manager_id: None,
            skills: draw_skills(&spec.skills_pool, level, rng),
        });
    }

    let root = persons[0].id.clone();
    attach_reports(&mut persons, spec, team_leads);

    Ok(Roster { persons, root })
}

/// Split a non-root headcount across Junior/Senior/TeamLead by largest remainder
fn split_levels(rest: usize) -> [usize; 3] {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut counts: Vec<(usize, usize, f64)> = LEVEL_MIX
        .iter()
        .enumerate()
        .map(|(i, (_, w))| {
            let raw = w / 0.95 * rest as f64;
            (i, raw as usize, raw.fract())
        })
        .collect();

    let assigned: usize = counts.iter().map(|(_, c, _)| c).sum();
    let mut remainder = rest - assigned;

    counts.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    for entry in &mut counts {
        if remainder == 0 {
            break;
        }
        entry.1 += 1;
        remainder -= 1;
    }

    let mut result = [0usize; 3];
    for (i, c, _) in counts {
        result[i] = c;
    }
    result
}

/// Verify a span-conforming tree exists before allocating anything
fn check_spans(spec: &OrgSpec, team_leads: usize, contributors: usize) -> Result<(), OrgError> {
    let fail = |detail: String| OrgError::UnsatisfiableSpan {
        min: spec.span_min,
        max: spec.span_max,
        headcount: spec.headcount,
        detail,
    };

    if spec.headcount == 1 {
        // Solo root, no manager relation to bound
        return Ok(());
    }
    if team_leads > spec.span_max {
        return Err(fail(format!(
            "{team_leads} team leads exceed the root's maximum span"
        )));
    }

    // Root must reach span_min counting its team leads; each team lead
    // must reach span_min from the contributor pool.
    let root_needed = spec.span_min.saturating_sub(team_leads);
    let lead_needed = team_leads * spec.span_min;
    if root_needed + lead_needed > contributors {
        return Err(fail(format!(
            "need {} reports to reach the minimum span, only {contributors} available",
            root_needed + lead_needed
        )));
    }

    let capacity = (spec.span_max - team_leads) + team_leads * spec.span_max;
    if contributors > capacity {
        return Err(fail(format!(
            "{contributors} reports exceed total supervisor capacity {capacity}"
        )));
    }

    Ok(())
}

/// Wire up `manager_id` for every non-root person
///
/// Supervisors are the root plus every team lead. Phase one brings each
/// supervisor up to the span minimum; phase two hands leftovers to the
/// lowest-span supervisor with remaining capacity.
fn attach_reports(persons: &mut [Person], spec: &OrgSpec, team_leads: usize) {
    let root_id = persons[0].id.clone();
    let lead_ids: Vec<PersonId> = persons[1..=team_leads].iter().map(|p| p.id.clone()).collect();

    for lead in 1..=team_leads {
        persons[lead].manager_id = Some(root_id.clone());
    }

    // supervisor loads: index 0 = root (already carrying its team leads)
    let mut supervisors: Vec<(PersonId, usize)> = Vec::with_capacity(1 + team_leads);
    supervisors.push((root_id, team_leads));
    supervisors.extend(lead_ids.into_iter().map(|id| (id, 0)));

    // Below-minimum supervisors win; ties break toward the lower load,
    // then toward allocation order.
    let rank = |load: usize| (u8::from(load >= spec.span_min), load);

    for person in persons.iter_mut().skip(1 + team_leads) {
        let mut best: Option<usize> = None;
        for (i, (_, load)) in supervisors.iter().enumerate() {
            if *load >= spec.span_max {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => rank(*load) < rank(supervisors[b].1),
            };
            if better {
                best = Some(i);
            }
        }
        if let Some(i) = best {
            person.manager_id = Some(supervisors[i].0.clone());
            supervisors[i].1 += 1;
        }
    }
}

fn draw_geo(geos: &[String], rng: &mut StdRng) -> Geo {
    if geos.is_empty() {
        return Geo("Remote".to_owned());
    }
    Geo(geos[rng.gen_range(0..geos.len())].clone())
}

fn draw_skills(pool: &[String], level: Level, rng: &mut StdRng) -> Vec<String> {
    if pool.is_empty() {
        return Vec::new();
    }
    let (lo, hi) = skill_range(level);
    let count = rng.gen_range(lo..=hi).min(pool.len());

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    // Partial Fisher-Yates: only the prefix we take needs shuffling
    for i in 0..count {
        let j = rng.gen_range(i..indices.len());
        indices.swap(i, j);
    }
    indices[..count].iter().map(|&i| pool[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use okg_calendar::unit_rng;

    fn spec(headcount: usize, span_min: usize, span_max: usize) -> OrgSpec {
        OrgSpec {
            team_name: "Payments Core".into(),
            headcount,
            geos: vec!["Bengaluru".into(), "Mumbai".into(), "Remote-IN".into()],
            span_min,
            span_max,
            skills_pool: vec![
                "Rust".into(),
                "PostgreSQL".into(),
                "Kubernetes".into(),
                "Payment APIs".into(),
                "Kafka".into(),
                "React".into(),
                "AWS".into(),
                "Fraud Detection".into(),
            ],
        }
    }

    #[test]
    fn roster_is_single_rooted() {
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 0);
        let roster = build(&registry, &spec(9, 2, 8), &mut rng).unwrap();

        assert_eq!(roster.persons.len(), 9);
        let roots: Vec<&Person> = roster.persons.iter().filter(|p| p.is_root()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, roster.root);
        assert_eq!(roots[0].level, Level::Manager);
    }

    #[test]
    fn manager_tree_is_acyclic() {
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 1);
        let roster = build(&registry, &spec(12, 2, 8), &mut rng).unwrap();

        for person in &roster.persons {
            // walk up; must reach the root within roster size steps
            let mut current = person;
            let mut hops = 0;
            while let Some(manager_id) = &current.manager_id {
                current = roster
                    .persons
                    .iter()
                    .find(|p| &p.id == manager_id)
                    .expect("manager resolves");
                hops += 1;
                assert!(hops <= roster.persons.len(), "cycle detected");
            }
            assert_eq!(current.id, roster.root);
        }
    }

    #[test]
    fn span_bounds_hold() {
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 2);
        let spec = spec(10, 2, 5);
        let roster = build(&registry, &spec, &mut rng).unwrap();

        for person in &roster.persons {
            let reports = roster.reports_of(&person.id).count();
            if reports > 0 {
                assert!(reports >= spec.span_min, "{} has {reports} reports", person.id);
                assert!(reports <= spec.span_max, "{} has {reports} reports", person.id);
            }
        }
    }

    #[test]
    fn tiny_roster_with_wide_span_fails() {
        // Scenario: span 6-8 with only 3 people cannot form a tree
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 3);
        let result = build(&registry, &spec(3, 6, 8), &mut rng);
        assert!(matches!(result, Err(OrgError::UnsatisfiableSpan { min: 6, max: 8, .. })));
        // Nothing allocated before the failure check
        assert_eq!(registry.issued_count(), 0);
    }

    #[test]
    fn zero_headcount_fails() {
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 4);
        assert!(matches!(build(&registry, &spec(0, 1, 8), &mut rng), Err(OrgError::EmptyRoster)));
    }

    #[test]
    fn roster_is_reproducible() {
        let run = || {
            let registry = IdRegistry::new();
            let mut rng = unit_rng(42, "org", 5);
            let roster = build(&registry, &spec(9, 2, 8), &mut rng).unwrap();
            roster
                .persons
                .iter()
                .map(|p| (p.id.as_str().to_owned(), p.name.clone(), p.level))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn skills_respect_level_ranges() {
        let registry = IdRegistry::new();
        let mut rng = unit_rng(42, "org", 6);
        let roster = build(&registry, &spec(9, 2, 8), &mut rng).unwrap();

        for person in &roster.persons {
            let (lo, hi) = skill_range(person.level);
            assert!(person.skills.len() >= lo && person.skills.len() <= hi);
        }
    }
}
