//! Generation Orchestrator: sequences one generation request.
//!
//! Flow: load user → quota authorize → profile snapshot → provider call
//!       (optional bounded retry) → assemble → persist document →
//!       metering + quota commit.
//!
//! Everything before the document is persisted may abort the request.
//! Everything after is best-effort: failures are reported, never returned.
//! Persisting and everything after it run on their own task, so a dropped
//! caller cannot leave a saved document unmetered or its quota unsettled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::generation::assembler::DocumentAssembler;
use crate::generation::error::GenerationError;
use crate::generation::metering::{ModelRates, UsageMeter};
use crate::generation::observer::{BestEffortFailure, BestEffortStage, FailureReporter};
use crate::generation::profile::{ProfileAggregator, ProfileSnapshot};
use crate::generation::provider::{GeneratedContent, GenerationProvider, ProviderError};
use crate::generation::quota::{QuotaCommit, QuotaGate};
use crate::generation::request::GenerationRequest;
use crate::models::document::{Document, DocumentKind, GenerationHistoryRecord};
use crate::models::user::User;
use crate::store::Store;

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// Retry around the provider call only. `max_attempts = 1` disables retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Backoff before the attempt following `failed_attempt` (1-based):
    /// base, 2×base, 4×base, ...
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    /// Bound on a single provider attempt.
    pub provider_timeout: Duration,
}

// ────────────────────────────────────────────────────────────────────────────
// State and outcome
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineStage {
    Requested,
    Authorized,
    SnapshotReady,
    Generated,
    Persisted,
    Metered,
    QuotaSettled,
    Done,
    Abandoned,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Requested => "requested",
            PipelineStage::Authorized => "authorized",
            PipelineStage::SnapshotReady => "snapshot_ready",
            PipelineStage::Generated => "generated",
            PipelineStage::Persisted => "persisted",
            PipelineStage::Metered => "metered",
            PipelineStage::QuotaSettled => "quota_settled",
            PipelineStage::Done => "done",
            PipelineStage::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// A successful request: the persisted document plus what the best-effort
/// steps managed to settle.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub document: Document,
    pub history: Option<GenerationHistoryRecord>,
    pub quota: Option<QuotaCommit>,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct GenerationOrchestrator {
    store: Arc<dyn Store>,
    provider: Arc<dyn GenerationProvider>,
    reporter: Arc<dyn FailureReporter>,
    quota: QuotaGate,
    profiles: ProfileAggregator,
    assembler: DocumentAssembler,
    meter: UsageMeter,
    settings: PipelineSettings,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn GenerationProvider>,
        reporter: Arc<dyn FailureReporter>,
        rates: ModelRates,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            quota: QuotaGate::new(store.clone()),
            profiles: ProfileAggregator::new(store.clone()),
            assembler: DocumentAssembler,
            meter: UsageMeter::new(store.clone(), rates),
            store,
            provider,
            reporter,
            settings,
        }
    }

    /// Runs one generation request end to end.
    ///
    /// Returns `Ok` once the document is persisted; metering and quota
    /// failures after that point are only reported. From `Generated` on, the
    /// work runs on its own task and completes even if this future is dropped.
    pub async fn generate(
        &self,
        user_id: Uuid,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let mut stage = PipelineStage::Requested;
        info!(
            "Generating {} for user {user_id}",
            request.kind.as_str()
        );

        // Requested → Authorized
        let user = self.store.load_user(user_id).await.map_err(|e| {
            abandon(
                &mut stage,
                user_id,
                GenerationError::GenerationFailed(format!("failed to load user: {e}")),
            )
        })?;
        if !self.quota.authorize(&user) {
            return Err(abandon(&mut stage, user_id, GenerationError::QuotaExceeded));
        }
        advance(&mut stage, PipelineStage::Authorized, user_id);

        // Authorized → SnapshotReady
        let snapshot = self.profiles.build(user_id).await.map_err(|e| {
            abandon(
                &mut stage,
                user_id,
                GenerationError::ProfileIncomplete(e.to_string()),
            )
        })?;
        advance(&mut stage, PipelineStage::SnapshotReady, user_id);

        // SnapshotReady → Generated
        let generated = self
            .call_provider(&request, &snapshot)
            .await
            .map_err(|e| {
                abandon(
                    &mut stage,
                    user_id,
                    GenerationError::GenerationFailed(e.to_string()),
                )
            })?;
        drop(snapshot);
        advance(&mut stage, PipelineStage::Generated, user_id);

        // Generated → Done runs detached: once content exists, a dropped
        // caller cannot stop the save or the settlement behind it.
        let document = self.assembler.assemble(&request, &generated, user_id);
        let settlement = Settlement {
            store: self.store.clone(),
            meter: self.meter.clone(),
            quota: self.quota.clone(),
            reporter: self.reporter.clone(),
        };
        let outcome = match tokio::spawn(settlement.run(user, document, generated)).await {
            Ok(result) => result?,
            Err(e) => {
                error!("Persistence task for user {user_id} failed: {e}");
                return Err(abandon(
                    &mut stage,
                    user_id,
                    GenerationError::PersistenceFailed(e.to_string()),
                ));
            }
        };

        info!(
            "Generated document {} ({}) for user {user_id}: metered={}, quota={:?}",
            outcome.document.id,
            outcome.document.title,
            outcome.history.is_some(),
            outcome.quota
        );

        Ok(outcome)
    }

    /// Calls the provider for the request's document kind, applying the
    /// per-attempt timeout and the retry policy. Nothing is persisted here,
    /// so retrying cannot duplicate a document.
    async fn call_provider(
        &self,
        request: &GenerationRequest,
        snapshot: &ProfileSnapshot,
    ) -> Result<GeneratedContent, ProviderError> {
        let max_attempts = self.settings.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let call = async {
                match request.kind {
                    DocumentKind::Resume => {
                        self.provider
                            .generate_resume(
                                snapshot,
                                &request.job_description,
                                &request.custom_sections,
                            )
                            .await
                    }
                    DocumentKind::CoverLetter => {
                        self.provider
                            .generate_cover_letter(
                                snapshot,
                                &request.job_description,
                                request.company_name.as_deref(),
                            )
                            .await
                    }
                }
            };

            let result = tokio::time::timeout(self.settings.provider_timeout, call)
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::Transport(format!(
                        "provider call timed out after {}ms",
                        self.settings.provider_timeout.as_millis()
                    )))
                });

            match result {
                Ok(generated) => return Ok(generated),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.settings.retry.delay_after(attempt);
                    warn!(
                        "Provider attempt {attempt}/{max_attempts} failed, retrying after {}ms: {e}",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage, user_id: Uuid) {
    debug!("Generation for user {user_id}: {stage} -> {next}");
    *stage = next;
}

fn abandon(stage: &mut PipelineStage, user_id: Uuid, err: GenerationError) -> GenerationError {
    warn!("Generation for user {user_id} abandoned at {stage}: {err}");
    *stage = PipelineStage::Abandoned;
    err
}

/// Owned collaborators for the steps after generation, so they can run on
/// their own task.
struct Settlement {
    store: Arc<dyn Store>,
    meter: UsageMeter,
    quota: QuotaGate,
    reporter: Arc<dyn FailureReporter>,
}

impl Settlement {
    /// Persist, then metering, then quota commit. Only the save can fail
    /// the request.
    async fn run(
        self,
        user: User,
        document: Document,
        generated: GeneratedContent,
    ) -> Result<GenerationOutcome, GenerationError> {
        let user_id = user.id;
        let mut stage = PipelineStage::Generated;

        // Exactly one save per request.
        let document = match self.store.save_document(&document).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(
                    "Generated {} for user {user_id} could not be saved; {} completion tokens lost: {e}",
                    document.kind.as_str(),
                    generated.completion_tokens
                );
                return Err(abandon(
                    &mut stage,
                    user_id,
                    GenerationError::PersistenceFailed(e.to_string()),
                ));
            }
        };
        advance(&mut stage, PipelineStage::Persisted, user_id);

        let history = match self.meter.record(user_id, document.id, &generated).await {
            Ok(record) => Some(record),
            Err(e) => {
                self.report(BestEffortStage::Metering, &user, document.id, e.to_string(), false);
                None
            }
        };
        advance(&mut stage, PipelineStage::Metered, user_id);

        let quota = match self.quota.commit(&user).await {
            Ok(outcome) if !outcome.succeeded() => {
                self.report(
                    BestEffortStage::QuotaCommit,
                    &user,
                    document.id,
                    "no free generation left to consume".to_string(),
                    true,
                );
                Some(outcome)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.report(BestEffortStage::QuotaCommit, &user, document.id, e.to_string(), false);
                None
            }
        };
        advance(&mut stage, PipelineStage::QuotaSettled, user_id);
        advance(&mut stage, PipelineStage::Done, user_id);

        Ok(GenerationOutcome {
            document,
            history,
            quota,
        })
    }

    fn report(
        &self,
        stage: BestEffortStage,
        user: &User,
        document_id: Uuid,
        reason: String,
        expected: bool,
    ) {
        self.reporter.report(BestEffortFailure {
            stage,
            user_id: user.id,
            document_id,
            reason,
            expected,
        });
    }
}
