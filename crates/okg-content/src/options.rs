//! Knobs for the content stage

use crate::capability::RetryBudget;
use crate::persona::VolumeRange;

/// Content-stage parameters derived from the run config
#[derive(Debug, Clone)]
pub struct ContentOptions {
    /// Run seed; every sub-stream derives from it
    pub seed: u64,
    /// Company display name for signatures
    pub company_name: String,
    /// Minimum tickets in the window
    pub tickets_min: u32,
    /// Maximum tickets in the window
    pub tickets_max: u32,
    /// Override of the persona weekly mail volume, when configured
    pub emails_per_week: Option<VolumeRange>,
    /// Provider retry/timeout bounds
    pub retry: RetryBudget,
    /// Concurrent narrative workers
    pub max_concurrent: usize,
}

impl ContentOptions {
    /// Compact options for unit tests: tiny volumes, small fan-out
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            seed: 42,
            company_name: "VistaraPay".to_owned(),
            tickets_min: 6,
            tickets_max: 10,
            emails_per_week: Some(VolumeRange { min: 3, max: 5 }),
            retry: RetryBudget::default(),
            max_concurrent: 4,
        }
    }
}
