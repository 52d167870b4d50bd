//! Quota Gate: free-tier allowance checks.
//!
//! `authorize` is a read-only check on an already-loaded user. `commit`
//! is a single compare-and-decrement in the store; there is no
//! read-then-write window for two requests to race through.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::models::user::User;
use crate::store::{Store, StoreResult};

/// What `commit` did to the user's allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaCommit {
    /// One unit consumed.
    Consumed,
    /// Premium user; allowance untouched.
    Exempt,
    /// The conditional decrement matched no row (another request got there first).
    RaceLost,
}

impl QuotaCommit {
    pub fn succeeded(&self) -> bool {
        !matches!(self, QuotaCommit::RaceLost)
    }
}

#[derive(Clone)]
pub struct QuotaGate {
    store: Arc<dyn Store>,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn authorize(&self, user: &User) -> bool {
        user.is_premium || user.free_generations_left > 0
    }

    pub async fn commit(&self, user: &User) -> StoreResult<QuotaCommit> {
        if user.is_premium {
            return Ok(QuotaCommit::Exempt);
        }

        let consumed = self.store.decrement_quota(user.id).await?;
        debug!("Quota commit for user {}: consumed={consumed}", user.id);

        Ok(if consumed {
            QuotaCommit::Consumed
        } else {
            QuotaCommit::RaceLost
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    async fn setup(free: i32, premium: bool) -> (Arc<MemoryStore>, QuotaGate, User) {
        let store = Arc::new(MemoryStore::new());
        let user_id = store.insert_user("Quota User", free, premium);
        let user = store.load_user(user_id).await.unwrap();
        let gate = QuotaGate::new(store.clone());
        (store, gate, user)
    }

    #[tokio::test]
    async fn test_authorize_non_premium_depends_on_remaining() {
        let (_, gate, user) = setup(1, false).await;
        assert!(gate.authorize(&user));

        let (_, gate, user) = setup(0, false).await;
        assert!(!gate.authorize(&user));
    }

    #[tokio::test]
    async fn test_authorize_premium_always_true() {
        let (_, gate, user) = setup(0, true).await;
        assert!(gate.authorize(&user));
    }

    #[tokio::test]
    async fn test_commit_decrements_by_exactly_one() {
        let (store, gate, user) = setup(3, false).await;
        assert_eq!(gate.commit(&user).await.unwrap(), QuotaCommit::Consumed);
        assert_eq!(store.remaining(user.id), 2);
    }

    #[tokio::test]
    async fn test_commit_premium_never_mutates() {
        let (store, gate, user) = setup(5, true).await;
        for _ in 0..3 {
            assert_eq!(gate.commit(&user).await.unwrap(), QuotaCommit::Exempt);
        }
        assert_eq!(store.remaining(user.id), 5);
    }

    #[tokio::test]
    async fn test_commit_at_zero_reports_race_lost() {
        let (store, gate, user) = setup(0, false).await;
        let outcome = gate.commit(&user).await.unwrap();
        assert_eq!(outcome, QuotaCommit::RaceLost);
        assert!(!outcome.succeeded());
        assert_eq!(store.remaining(user.id), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_with_one_unit_succeed_once() {
        let (store, gate, user) = setup(1, false).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let user = user.clone();
                tokio::spawn(async move { gate.commit(&user).await.unwrap() })
            })
            .collect();

        let mut consumed = 0;
        for handle in handles {
            if handle.await.unwrap() == QuotaCommit::Consumed {
                consumed += 1;
            }
        }

        assert_eq!(consumed, 1);
        assert_eq!(store.remaining(user.id), 0);
    }
}
