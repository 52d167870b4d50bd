//! Observability collaborator for best-effort pipeline steps.

use std::fmt;

use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestEffortStage {
    Metering,
    QuotaCommit,
}

impl fmt::Display for BestEffortStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestEffortStage::Metering => f.write_str("metering"),
            BestEffortStage::QuotaCommit => f.write_str("quota_commit"),
        }
    }
}

/// A post-persistence step that did not take effect.
#[derive(Debug, Clone)]
pub struct BestEffortFailure {
    pub stage: BestEffortStage,
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub reason: String,
    /// Lost quota races are expected under concurrency; store errors are not.
    pub expected: bool,
}

pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: BestEffortFailure);
}

/// Default reporter: structured log lines only.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: BestEffortFailure) {
        if failure.expected {
            warn!(
                stage = %failure.stage,
                user_id = %failure.user_id,
                document_id = %failure.document_id,
                "Best-effort step skipped: {}",
                failure.reason
            );
        } else {
            error!(
                stage = %failure.stage,
                user_id = %failure.user_id,
                document_id = %failure.document_id,
                "Best-effort step failed: {}",
                failure.reason
            );
        }
    }
}
