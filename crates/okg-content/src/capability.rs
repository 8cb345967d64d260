//! Language-model capability boundary
//!
//! Narrative text comes from a non-deterministic external capability. The
//! orchestrator treats it as a swappable trait: structure is computed before
//! any call, output is validated before acceptance, and a bounded
//! retry-then-template ladder guarantees the pipeline never stalls on a
//! misbehaving provider.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Failures at the provider boundary
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or transport failure
    #[error("provider transport error: {0}")]
    Transport(String),

    /// Quota or rate limit
    #[error("provider quota exhausted: {0}")]
    Quota(String),
}

/// Per-unit generation failures - absorbed, never fatal to the run
#[derive(Debug, thiserror::Error)]
pub enum ContentGenerationError {
    /// Provider call failed
    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// Provider call exceeded the timeout
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    /// Output violated the narrative policy
    #[error("off-policy output: {0}")]
    OffPolicy(String),
}

/// Scaffold-derived context passed alongside the prompt
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Identifier of the content unit being narrated
    pub unit_id: String,
    /// Domain hints: jargon, constraints, participants
    pub hints: Vec<String>,
}

/// The language-model capability
///
/// Implementations may return off-policy text; callers validate before
/// acceptance.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate narrative text for a prompt
    async fn generate(&self, prompt: &str, context: &PromptContext) -> Result<String, ProviderError>;
}

/// Validation policy for one narrative field
#[derive(Debug, Clone, Default)]
pub struct NarrativePolicy {
    /// Minimum accepted length in characters
    pub min_len: usize,
    /// Maximum accepted length in characters (0 = unbounded)
    pub max_len: usize,
    /// Substrings that must appear verbatim
    pub required_tokens: Vec<String>,
    /// Substrings that must not appear (matched case-insensitively)
    pub banned_terms: Vec<String>,
}

impl NarrativePolicy {
    /// Policy accepting `min..=max` characters
    #[must_use]
    pub fn length(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            ..Self::default()
        }
    }

    /// Require a token to appear verbatim
    #[must_use]
    pub fn require(mut self, token: impl Into<String>) -> Self {
        self.required_tokens.push(token.into());
        self
    }

    /// Ban a term (case-insensitive)
    #[must_use]
    pub fn ban(mut self, term: impl Into<String>) -> Self {
        self.banned_terms.push(term.into());
        self
    }

    /// Validate a candidate text against this policy
    ///
    /// # Errors
    /// [`ContentGenerationError::OffPolicy`] describing the first violation.
    pub fn validate(&self, text: &str) -> Result<(), ContentGenerationError> {
        let trimmed = text.trim();
        if trimmed.len() < self.min_len {
            return Err(ContentGenerationError::OffPolicy(format!(
                "too short: {} < {}",
                trimmed.len(),
                self.min_len
            )));
        }
        if self.max_len > 0 && trimmed.len() > self.max_len {
            return Err(ContentGenerationError::OffPolicy(format!(
                "too long: {} > {}",
                trimmed.len(),
                self.max_len
            )));
        }
        for token in &self.required_tokens {
            if !trimmed.contains(token.as_str()) {
                return Err(ContentGenerationError::OffPolicy(format!(
                    "missing required token {token:?}"
                )));
            }
        }
        let lower = trimmed.to_lowercase();
        for term in &self.banned_terms {
            if lower.contains(&term.to_lowercase()) {
                return Err(ContentGenerationError::OffPolicy(format!(
                    "contains banned term {term:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Retry/timeout bounds for provider calls
#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Per-call timeout
    pub timeout: Duration,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Request one narrative field with validation, retries, and fallback
///
/// Each retry appends a stricter instruction to the prompt. Exhausting the
/// budget falls back to the deterministic `fallback` text, which is assumed
/// policy-conformant - the pipeline must terminate regardless of provider
/// behavior.
pub async fn narrate(
    model: &dyn LanguageModel,
    prompt: &str,
    context: &PromptContext,
    policy: &NarrativePolicy,
    budget: RetryBudget,
    fallback: &str,
) -> String {
    let mut prompt = prompt.to_owned();
    for attempt in 0..=budget.max_retries {
        let outcome = match tokio::time::timeout(budget.timeout, model.generate(&prompt, context))
            .await
        {
            Err(_) => Err(ContentGenerationError::Timeout(budget.timeout)),
            Ok(Err(e)) => Err(ContentGenerationError::Provider(e)),
            Ok(Ok(text)) => policy.validate(&text).map(|()| text),
        };

        match outcome {
            Ok(text) => return text.trim().to_owned(),
            Err(error) => {
                tracing::debug!(unit = %context.unit_id, attempt, %error, "narrative attempt rejected");
                prompt.push_str(
                    "\nStrictly follow the length bounds and include every required reference token.",
                );
            }
        }
    }

    tracing::warn!(unit = %context.unit_id, "narrative budget exhausted, using template fallback");
    debug_assert!(policy.validate(fallback).is_ok(), "fallback must satisfy policy");
    fallback.to_owned()
}

/// Deterministic stub model for tests and offline runs
///
/// Records every scaffold context it is given and echoes a fixed template
/// built from the prompt's first line and the context hints.
#[derive(Debug, Default)]
pub struct TemplateModel {
    calls: Mutex<Vec<PromptContext>>,
}

impl TemplateModel {
    /// Create a stub model
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, as the orchestrator consumes `Arc<dyn LanguageModel>`
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Contexts seen so far
    #[must_use]
    pub fn recorded(&self) -> Vec<PromptContext> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for TemplateModel {
    async fn generate(&self, prompt: &str, context: &PromptContext) -> Result<String, ProviderError> {
        self.calls.lock().push(context.clone());
        let first_line = prompt.lines().next().unwrap_or_default();
        let hints = context.hints.join(", ");
        Ok(format!("{first_line} [{hints}]"))
    }
}

/// Test model that fails a fixed number of times before succeeding
///
/// `responses_empty` failures return empty strings (off-policy), after which
/// the given text is returned.
#[derive(Debug)]
pub struct FlakyModel {
    remaining_failures: Mutex<u32>,
    eventual: String,
}

impl FlakyModel {
    /// Fail `failures` times, then return `eventual`
    #[must_use]
    pub fn new(failures: u32, eventual: impl Into<String>) -> Self {
        Self {
            remaining_failures: Mutex::new(failures),
            eventual: eventual.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for FlakyModel {
    async fn generate(&self, _prompt: &str, _context: &PromptContext) -> Result<String, ProviderError> {
        let mut remaining = self.remaining_failures.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(String::new());
        }
        Ok(self.eventual.clone())
    }
}
