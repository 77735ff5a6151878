use async_trait::async_trait;
use thiserror::Error;

use crate::core::is_eligible_candidate;
use crate::models::{Profile, ScoredCandidate, StoredMatch};

/// Errors reported by profile and match stores
///
/// `NotFound` and `Unavailable` are kept apart so callers can tell a missing
/// subject from a store outage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to founder profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile by id
    async fn fetch_profile(&self, id: &str) -> Result<Profile, StoreError>;

    /// Fetch every non-admin profile
    ///
    /// The pool is the same for every subject, so stores and caches can share it.
    async fn fetch_pool(&self) -> Result<Vec<Profile>, StoreError>;

    /// Fetch every candidate for `subject`, excluding the subject and administrators
    async fn fetch_candidates(&self, subject: &Profile) -> Result<Vec<Profile>, StoreError> {
        let pool = self.fetch_pool().await?;

        Ok(pool
            .into_iter()
            .filter(|profile| is_eligible_candidate(subject, profile))
            .collect())
    }
}

/// Persistence for computed matches
#[async_trait]
pub trait MatchLedger: Send + Sync {
    async fn record_matches(
        &self,
        subject_id: &str,
        matches: &[ScoredCandidate],
    ) -> Result<(), StoreError>;

    async fn saved_matches(&self, subject_id: &str, limit: usize) -> Result<Vec<StoredMatch>, StoreError>;

    async fn health_check(&self) -> bool {
        true
    }
}

/// Profile store over a fixed snapshot, used for fixtures and benches
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Vec<Profile>,
}

impl InMemoryProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(&self, id: &str) -> Result<Profile, StoreError> {
        self.profiles
            .iter()
            .find(|profile| profile.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", id)))
    }

    async fn fetch_pool(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .profiles
            .iter()
            .filter(|profile| !profile.is_admin)
            .cloned()
            .collect())
    }
}
