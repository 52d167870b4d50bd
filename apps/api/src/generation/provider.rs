//! Generation Provider: capability interface over the text-generation backend.
//!
//! `AppState` holds the orchestrator, which holds an `Arc<dyn GenerationProvider>`,
//! so the backend (or a deterministic double in tests) can be swapped without
//! touching the pipeline. The provider never retries; it never validates the
//! generated text either. The body is an opaque string to everything downstream.

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::generation::profile::ProfileSnapshot;
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM,
    UNKNOWN_COMPANY,
};
use crate::llm_client::{ChatRequest, LlmClient, LlmError};

/// Provider output for one successful call.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContent {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub generation_time_ms: u64,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::RateLimited(_) => true,
            ProviderError::Upstream { status, .. } => *status >= 500,
            ProviderError::Authentication(_) | ProviderError::MalformedResponse(_) => false,
        }
    }
}

impl From<LlmError> for ProviderError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_decode() => ProviderError::MalformedResponse(e.to_string()),
            LlmError::Http(e) => ProviderError::Transport(e.to_string()),
            LlmError::Api { status, message } => match status {
                401 | 403 => ProviderError::Authentication(message),
                429 => ProviderError::RateLimited(message),
                _ => ProviderError::Upstream { status, message },
            },
            LlmError::Parse(e) => ProviderError::MalformedResponse(e.to_string()),
            LlmError::EmptyContent => {
                ProviderError::MalformedResponse("response carried no content".to_string())
            }
        }
    }
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate_resume(
        &self,
        snapshot: &ProfileSnapshot,
        job_description: &str,
        custom_sections: &[String],
    ) -> Result<GeneratedContent, ProviderError>;

    async fn generate_cover_letter(
        &self,
        snapshot: &ProfileSnapshot,
        job_description: &str,
        company_name: Option<&str>,
    ) -> Result<GeneratedContent, ProviderError>;
}

/// Construction-time provider parameters.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub model: String,
    pub resume_max_tokens: u32,
    /// Cover letters are shorter, so this bound is lower.
    pub cover_letter_max_tokens: u32,
    pub temperature: f32,
}

/// `GenerationProvider` backed by the chat-completions client.
pub struct LlmProvider {
    llm: LlmClient,
    settings: ProviderSettings,
}

impl LlmProvider {
    pub fn new(llm: LlmClient, settings: ProviderSettings) -> Self {
        Self { llm, settings }
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<GeneratedContent, ProviderError> {
        let started = Instant::now();
        let response = self
            .llm
            .chat(ChatRequest {
                model: &self.settings.model,
                system,
                prompt,
                max_tokens,
                temperature: self.settings.temperature,
            })
            .await?;
        let generation_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let content = response.text().ok_or(LlmError::EmptyContent)?.to_string();
        let usage = response.usage;
        let total_tokens = if usage.total_tokens > 0 {
            usage.total_tokens
        } else {
            usage.prompt_tokens.saturating_add(usage.completion_tokens)
        };

        debug!("Provider call took {generation_time_ms}ms ({total_tokens} tokens)");

        Ok(GeneratedContent {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens,
            generation_time_ms,
            model: response
                .model
                .unwrap_or_else(|| self.settings.model.clone()),
        })
    }
}

#[async_trait]
impl GenerationProvider for LlmProvider {
    async fn generate_resume(
        &self,
        snapshot: &ProfileSnapshot,
        job_description: &str,
        custom_sections: &[String],
    ) -> Result<GeneratedContent, ProviderError> {
        let prompt = build_resume_prompt(snapshot, job_description, custom_sections)?;
        self.complete(RESUME_SYSTEM, &prompt, self.settings.resume_max_tokens)
            .await
    }

    async fn generate_cover_letter(
        &self,
        snapshot: &ProfileSnapshot,
        job_description: &str,
        company_name: Option<&str>,
    ) -> Result<GeneratedContent, ProviderError> {
        let prompt = build_cover_letter_prompt(snapshot, job_description, company_name)?;
        self.complete(
            COVER_LETTER_SYSTEM,
            &prompt,
            self.settings.cover_letter_max_tokens,
        )
        .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt construction
// ────────────────────────────────────────────────────────────────────────────

fn snapshot_json(snapshot: &ProfileSnapshot) -> Result<String, ProviderError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| ProviderError::MalformedResponse(format!("snapshot serialization: {e}")))
}

pub fn build_resume_prompt(
    snapshot: &ProfileSnapshot,
    job_description: &str,
    custom_sections: &[String],
) -> Result<String, ProviderError> {
    let extra = if custom_sections.is_empty() {
        String::new()
    } else {
        format!(
            "\n8. Also include these sections: {}",
            custom_sections.join(", ")
        )
    };

    let profile_json = snapshot_json(snapshot)?;
    Ok(fill_template(
        RESUME_PROMPT_TEMPLATE,
        &[
            ("profile_json", &profile_json),
            ("job_description", job_description),
            ("custom_sections", &extra),
        ],
    ))
}

pub fn build_cover_letter_prompt(
    snapshot: &ProfileSnapshot,
    job_description: &str,
    company_name: Option<&str>,
) -> Result<String, ProviderError> {
    let profile_json = snapshot_json(snapshot)?;
    Ok(fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("profile_json", &profile_json),
            ("job_description", job_description),
            ("company_name", company_name.unwrap_or(UNKNOWN_COMPANY)),
        ],
    ))
}

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted
/// values are never scanned again, so user text containing `{...}` is kept
/// verbatim. Braces that do not name a known placeholder pass through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let matched = values.iter().find_map(|&(name, value)| {
            tail.strip_prefix(name)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (value, after))
        });
        match matched {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
