//! Run configuration
//!
//! Mirrors the YAML config consumed by the CLI. Validation is itemized:
//! every problem in the file is reported at once, and a failing config
//! aborts before any stage allocates anything.

use chrono::NaiveDate;
use chrono_tz::Tz;
use okg_audit::AuditPolicy;
use okg_export::OutputKind;
use okg_model::ProjectKey;
use serde::Deserialize;
use std::path::Path;

/// Configuration failures - fatal, pre-stage
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for the schema
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Schema-valid config with impossible values
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// An inclusive integer range in the config
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MinMax {
    pub min: u32,
    pub max: u32,
}

/// Company profile fed into prompts and signatures
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// The generation time window
#[derive(Debug, Clone, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timezone: String,
    #[serde(default = "default_true")]
    pub business_days_only: bool,
}

/// Org-chart shape
#[derive(Debug, Clone, Deserialize)]
pub struct OrgConfig {
    pub team_name: String,
    pub headcount: usize,
    #[serde(default)]
    pub geo: Vec<String>,
    /// Level codes in play; empty means the full ladder
    #[serde(default)]
    pub levels: Vec<String>,
    pub manager_span: MinMax,
}

/// Project shape
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub key: String,
    pub name: String,
    pub sprint_length_days: u32,
}

/// Content volumes
#[derive(Debug, Clone, Deserialize)]
pub struct VolumesConfig {
    pub tickets_in_window: MinMax,
    /// Overrides the persona weekly volume tables when present
    #[serde(default)]
    pub emails_per_person_per_week: Option<MinMax>,
}

/// Audit behavior
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_policy")]
    pub policy: PolicyName,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
        }
    }
}

/// Audit policy spelled the way the YAML spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    HardFail,
    WarnAndContinue,
}

impl From<PolicyName> for AuditPolicy {
    fn from(name: PolicyName) -> Self {
        match name {
            PolicyName::HardFail => AuditPolicy::HardFail,
            PolicyName::WarnAndContinue => AuditPolicy::WarnAndContinue,
        }
    }
}

/// The full run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub industry: String,
    pub company: CompanyProfile,
    pub time_window: TimeWindow,
    pub org: OrgConfig,
    pub project: ProjectConfig,
    pub volumes: VolumesConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub outputs: Vec<OutputKind>,
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    42
}

fn default_policy() -> PolicyName {
    PolicyName::HardFail
}

impl GenerationConfig {
    /// Load and validate a YAML config file
    ///
    /// # Errors
    /// [`ConfigError`] for unreadable, unparsable, or invalid files.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value constraints, reporting every problem at once
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] listing each violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.time_window.end < self.time_window.start {
            errors.push(format!(
                "time_window: end {} precedes start {}",
                self.time_window.end, self.time_window.start
            ));
        }
        if self.time_window.timezone.parse::<Tz>().is_err() {
            errors.push(format!("time_window: unknown timezone {:?}", self.time_window.timezone));
        }
        if self.org.headcount == 0 {
            errors.push("org: headcount must be at least 1".to_owned());
        }
        if self.org.manager_span.min == 0 {
            errors.push("org: manager_span.min must be at least 1".to_owned());
        }
        if self.org.manager_span.min > self.org.manager_span.max {
            errors.push(format!(
                "org: manager_span min {} exceeds max {}",
                self.org.manager_span.min, self.org.manager_span.max
            ));
        }
        for level in &self.org.levels {
            if !matches!(level.as_str(), "Jr" | "Sr" | "TL" | "Mgr") {
                errors.push(format!("org: unknown level code {level:?}"));
            }
        }
        if let Err(e) = ProjectKey::new(self.project.key.clone()) {
            errors.push(format!("project: {e}"));
        }
        if self.project.sprint_length_days == 0 {
            errors.push("project: sprint_length_days must be at least 1".to_owned());
        }
        if self.volumes.tickets_in_window.min > self.volumes.tickets_in_window.max {
            errors.push("volumes: tickets_in_window min exceeds max".to_owned());
        }
        if let Some(emails) = self.volumes.emails_per_person_per_week {
            if emails.min > emails.max {
                errors.push("volumes: emails_per_person_per_week min exceeds max".to_owned());
            }
        }
        if self.outputs.is_empty() {
            errors.push("outputs: at least one of jira, email is required".to_owned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Parsed timezone; call only after validation
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.time_window.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}
