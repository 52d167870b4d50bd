//! Persistence collaborator. Every read and write the generation pipeline
//! needs goes through the `Store` trait so the pipeline never touches SQL
//! directly.
//!
//! All operations are keyed by the owning user id; an implementation must
//! never return or modify another user's rows.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::{Document, GenerationHistoryRecord};
use crate::models::profile::{Education, Experience, Profile, Skill};
use crate::models::user::User;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn load_user(&self, user_id: Uuid) -> StoreResult<User>;

    async fn load_profile(&self, user_id: Uuid) -> StoreResult<Profile>;

    async fn load_experiences(&self, user_id: Uuid) -> StoreResult<Vec<Experience>>;

    async fn load_education(&self, user_id: Uuid) -> StoreResult<Vec<Education>>;

    async fn load_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>>;

    /// Inserts a new document and returns it as stored.
    async fn save_document(&self, document: &Document) -> StoreResult<Document>;

    async fn save_history_record(&self, record: &GenerationHistoryRecord) -> StoreResult<()>;

    /// Compare-and-decrement of the user's free-generation counter.
    ///
    /// Returns `Ok(true)` iff exactly one unit was consumed. `Ok(false)` means
    /// the counter was already zero, the user is premium, or the row is gone.
    async fn decrement_quota(&self, user_id: Uuid) -> StoreResult<bool>;
}
