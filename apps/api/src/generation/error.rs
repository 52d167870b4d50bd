use thiserror::Error;

/// Caller-visible failures of the generation pipeline.
///
/// Best-effort failures after the document is persisted never appear here.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rejection: no free generations left. Nothing was attempted.
    #[error("No free generations left")]
    QuotaExceeded,

    /// Upstream: the profile snapshot could not be assembled.
    #[error("Profile incomplete: {0}")]
    ProfileIncomplete(String),

    /// Upstream: the user record or the provider failed before persistence.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Generated content could not be saved and is lost.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}
