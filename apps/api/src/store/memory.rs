//! In-memory `Store` used by unit tests, with per-operation fault injection.
//!
//! Rows come back in insertion order; ordering is the aggregator's job.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::document::{Document, GenerationHistoryRecord};
use crate::models::profile::{Education, Experience, Profile, Skill};
use crate::models::user::User;
use crate::store::{Store, StoreError, StoreResult};

/// Operations that should fail on the next call (and every call after).
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub load_user: bool,
    pub load_skills: bool,
    pub save_document: bool,
    pub save_history: bool,
    pub decrement_quota: bool,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    experiences: Vec<Experience>,
    education: Vec<Education>,
    skills: Vec<Skill>,
    documents: Vec<Document>,
    history: Vec<GenerationHistoryRecord>,
    faults: Faults,
}

impl MemoryState {
    fn profile_id(&self, user_id: Uuid) -> Option<Uuid> {
        self.profiles.get(&user_id).map(|p| p.id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

/// Injected faults look like an exhausted connection pool.
fn unavailable(op: &str) -> StoreError {
    tracing::debug!("Injected store failure in {op}");
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, full_name: &str, free_generations_left: i32, is_premium: bool) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let user = User {
            id,
            email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
            full_name: full_name.to_string(),
            free_generations_left,
            is_premium,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().users.insert(id, user);
        id
    }

    pub fn insert_profile(&self, user_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let profile = Profile {
            id,
            user_id,
            phone: Some("+1 555 0100".to_string()),
            location: Some("Berlin".to_string()),
            linkedin_url: None,
            github_url: Some("https://github.com/example".to_string()),
            website_url: None,
            summary: Some("Backend engineer".to_string()),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().profiles.insert(user_id, profile);
        id
    }

    pub fn add_experience(&self, user_id: Uuid, company: &str, start_date: NaiveDate) {
        let mut state = self.state.lock().unwrap();
        let profile_id = state.profile_id(user_id).expect("profile must exist");
        state.experiences.push(Experience {
            id: Uuid::new_v4(),
            profile_id,
            company: company.to_string(),
            position: "Engineer".to_string(),
            start_date,
            end_date: None,
            is_current: false,
            description: None,
            achievements: vec![],
            created_at: Utc::now(),
        });
    }

    pub fn add_education(&self, user_id: Uuid, institution: &str, start_date: NaiveDate) {
        let mut state = self.state.lock().unwrap();
        let profile_id = state.profile_id(user_id).expect("profile must exist");
        state.education.push(Education {
            id: Uuid::new_v4(),
            profile_id,
            institution: institution.to_string(),
            degree: "BSc".to_string(),
            field_of_study: Some("Computer Science".to_string()),
            start_date,
            end_date: None,
            gpa: None,
            created_at: Utc::now(),
        });
    }

    pub fn add_skill(&self, user_id: Uuid, name: &str, category: &str) {
        let mut state = self.state.lock().unwrap();
        let profile_id = state.profile_id(user_id).expect("profile must exist");
        state.skills.push(Skill {
            id: Uuid::new_v4(),
            profile_id,
            name: name.to_string(),
            category: category.to_string(),
            proficiency_level: None,
            created_at: Utc::now(),
        });
    }

    pub fn set_faults(&self, faults: Faults) {
        self.state.lock().unwrap().faults = faults;
    }

    pub fn remaining(&self, user_id: Uuid) -> i32 {
        self.state.lock().unwrap().users[&user_id].free_generations_left
    }

    pub fn documents(&self) -> Vec<Document> {
        self.state.lock().unwrap().documents.clone()
    }

    pub fn history(&self) -> Vec<GenerationHistoryRecord> {
        self.state.lock().unwrap().history.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_user(&self, user_id: Uuid) -> StoreResult<User> {
        let state = self.state.lock().unwrap();
        if state.faults.load_user {
            return Err(unavailable("load_user"));
        }
        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {user_id} not found")))
    }

    async fn load_profile(&self, user_id: Uuid) -> StoreResult<Profile> {
        self.state
            .lock()
            .unwrap()
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile for user {user_id} not found")))
    }

    async fn load_experiences(&self, user_id: Uuid) -> StoreResult<Vec<Experience>> {
        let state = self.state.lock().unwrap();
        let profile_id = state.profile_id(user_id);
        Ok(state
            .experiences
            .iter()
            .filter(|e| Some(e.profile_id) == profile_id)
            .cloned()
            .collect())
    }

    async fn load_education(&self, user_id: Uuid) -> StoreResult<Vec<Education>> {
        let state = self.state.lock().unwrap();
        let profile_id = state.profile_id(user_id);
        Ok(state
            .education
            .iter()
            .filter(|e| Some(e.profile_id) == profile_id)
            .cloned()
            .collect())
    }

    async fn load_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>> {
        let state = self.state.lock().unwrap();
        if state.faults.load_skills {
            return Err(unavailable("load_skills"));
        }
        let profile_id = state.profile_id(user_id);
        Ok(state
            .skills
            .iter()
            .filter(|s| Some(s.profile_id) == profile_id)
            .cloned()
            .collect())
    }

    async fn save_document(&self, document: &Document) -> StoreResult<Document> {
        let mut state = self.state.lock().unwrap();
        if state.faults.save_document {
            return Err(unavailable("save_document"));
        }
        state.documents.push(document.clone());
        Ok(document.clone())
    }

    async fn save_history_record(&self, record: &GenerationHistoryRecord) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.faults.save_history {
            return Err(unavailable("save_history_record"));
        }
        if !state.documents.iter().any(|d| d.id == record.document_id) {
            return Err(StoreError::NotFound(format!(
                "Document {} not found",
                record.document_id
            )));
        }
        state.history.push(record.clone());
        Ok(())
    }

    async fn decrement_quota(&self, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.faults.decrement_quota {
            return Err(unavailable("decrement_quota"));
        }
        match state.users.get_mut(&user_id) {
            Some(user) if !user.is_premium && user.free_generations_left > 0 => {
                user.free_generations_left -= 1;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
