//! OKG Core - pipeline orchestration and configuration
//!
//! Wires the stages into one run:
//! - Config loading/validation (`config`)
//! - The staged pipeline with its umbrella error (`pipeline`)
//!
//! # Example
//!
//! ```rust,ignore
//! use okg_content::TemplateModel;
//! use okg_core::{GenerationConfig, Pipeline};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GenerationConfig::load("configs/single_team_fintech.yaml".as_ref())?;
//! let pipeline = Pipeline::new(config, TemplateModel::shared());
//! let summary = pipeline.run("out".as_ref(), false).await?;
//! println!("{} tickets, {} messages", summary.stats.tickets, summary.stats.mail_messages);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod pipeline;

pub use config::{
    AuditConfig, CompanyProfile, ConfigError, GenerationConfig, MinMax, OrgConfig, PolicyName,
    ProjectConfig, TimeWindow, VolumesConfig,
};
pub use pipeline::{Pipeline, PipelineError, RunSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
