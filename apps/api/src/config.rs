use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::metering::ModelRates;
use crate::generation::orchestrator::{PipelineSettings, RetryPolicy};
use crate::generation::provider::ProviderSettings;
use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub resume_max_tokens: u32,
    pub cover_letter_max_tokens: u32,
    pub temperature: f32,
    pub rates: ModelRates,
    pub generation_timeout: Duration,
    pub generation_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let openai_model = get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let default_rates = ModelRates::for_model(&openai_model);

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 25)?,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            resume_max_tokens: parse_or(&get, "OPENAI_MAX_TOKENS", 1500)?,
            cover_letter_max_tokens: parse_or(&get, "COVER_LETTER_MAX_TOKENS", 800)?,
            temperature: parse_or(&get, "OPENAI_TEMPERATURE", 0.7)?,
            rates: ModelRates {
                input_per_million: parse_or(
                    &get,
                    "PRICE_INPUT_PER_MTOK",
                    default_rates.input_per_million,
                )?,
                output_per_million: parse_or(
                    &get,
                    "PRICE_OUTPUT_PER_MTOK",
                    default_rates.output_per_million,
                )?,
            },
            generation_timeout: Duration::from_secs(parse_or(
                &get,
                "GENERATION_TIMEOUT_SECS",
                120,
            )?),
            generation_max_attempts: parse_or(&get, "GENERATION_MAX_ATTEMPTS", 1u32)?.max(1),
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            openai_model,
        })
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            model: self.openai_model.clone(),
            resume_max_tokens: self.resume_max_tokens,
            cover_letter_max_tokens: self.cover_letter_max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy {
                max_attempts: self.generation_max_attempts,
                base_delay: Duration::from_secs(1),
            },
            provider_timeout: self.generation_timeout,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
