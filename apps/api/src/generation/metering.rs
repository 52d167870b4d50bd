//! Usage Meter: turns token counts into an estimated cost and appends a
//! history record for each persisted generation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::generation::provider::GeneratedContent;
use crate::models::document::GenerationHistoryRecord;
use crate::store::{Store, StoreResult};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Published list prices in USD per million tokens.
/// These are estimates for accounting, not invoices.
const KNOWN_RATES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-4.1-mini", 0.40, 1.60),
];

pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Per-model token pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelRates {
    /// Rates for `model`. Unknown models are priced like the fallback model.
    pub fn for_model(model: &str) -> Self {
        let lookup = |name: &str| {
            KNOWN_RATES
                .iter()
                .find(|(known, _, _)| *known == name)
                .map(|&(_, input, output)| ModelRates {
                    input_per_million: input,
                    output_per_million: output,
                })
        };
        lookup(model)
            .or_else(|| lookup(FALLBACK_MODEL))
            .unwrap_or(ModelRates {
                input_per_million: 0.0,
                output_per_million: 0.0,
            })
    }
}

#[derive(Clone)]
pub struct UsageMeter {
    store: Arc<dyn Store>,
    rates: ModelRates,
}

impl UsageMeter {
    pub fn new(store: Arc<dyn Store>, rates: ModelRates) -> Self {
        Self { store, rates }
    }

    /// `prompt × input_rate + completion × output_rate`, in USD.
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        f64::from(prompt_tokens) * self.rates.input_per_million / TOKENS_PER_MILLION
            + f64::from(completion_tokens) * self.rates.output_per_million / TOKENS_PER_MILLION
    }

    /// Appends the ledger entry for a persisted document.
    pub async fn record(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        generated: &GeneratedContent,
    ) -> StoreResult<GenerationHistoryRecord> {
        let record = GenerationHistoryRecord {
            id: Uuid::new_v4(),
            user_id,
            document_id,
            prompt_tokens: generated.prompt_tokens,
            completion_tokens: generated.completion_tokens,
            total_cost: self.cost(generated.prompt_tokens, generated.completion_tokens),
            generation_time_ms: generated.generation_time_ms,
            created_at: Utc::now(),
        };
        self.store.save_history_record(&record).await?;
        Ok(record)
    }
}
