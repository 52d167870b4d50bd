//! Profile Aggregator: assembles the request-scoped snapshot a generation
//! call is built from.
//!
//! The snapshot is never persisted and never shared between requests.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::models::profile::{Education, Experience, Skill};
use crate::store::{Store, StoreResult};

/// Immutable, generation-ready view of one user's professional profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Most recent start date first.
    pub experiences: Vec<Experience>,
    /// Most recent start date first.
    pub education: Vec<Education>,
    /// By category, then name.
    pub skills: Vec<Skill>,
}

#[derive(Clone)]
pub struct ProfileAggregator {
    store: Arc<dyn Store>,
}

impl ProfileAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reads identity, profile, experiences, education and skills concurrently.
    ///
    /// Any failed read fails the whole aggregation; a missing profile row
    /// surfaces as `StoreError::NotFound`.
    pub async fn build(&self, user_id: Uuid) -> StoreResult<ProfileSnapshot> {
        let (user, profile, mut experiences, mut education, mut skills) = tokio::try_join!(
            self.store.load_user(user_id),
            self.store.load_profile(user_id),
            self.store.load_experiences(user_id),
            self.store.load_education(user_id),
            self.store.load_skills(user_id),
        )?;

        // Stable sorts: ties keep the store's insertion order.
        experiences.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        education.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        skills.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

        Ok(ProfileSnapshot {
            full_name: user.full_name,
            email: user.email,
            phone: profile.phone,
            location: profile.location,
            linkedin_url: profile.linkedin_url,
            github_url: profile.github_url,
            website_url: profile.website_url,
            summary: profile.summary,
            experiences,
            education,
            skills,
        })
    }
}
