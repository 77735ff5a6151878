use std::sync::Arc;

use crate::core::{MatchError, MatchFilters, MatchResult, Matcher};
use crate::models::{ScoreBreakdown, StoredMatch};
use crate::services::store::{MatchLedger, ProfileStore, StoreError};

pub const DEFAULT_LIMIT: usize = 8;
pub const MAX_LIMIT: usize = 50;

/// Fetches a subject and its candidate pool, then ranks them
///
/// Any fetch error ends the request; no partial rankings are returned.
/// When a ledger is attached, results are recorded in the background and
/// the caller never waits on it.
pub struct MatchFinder {
    store: Arc<dyn ProfileStore>,
    matcher: Matcher,
    ledger: Option<Arc<dyn MatchLedger>>,
    default_limit: usize,
    max_limit: usize,
}

impl MatchFinder {
    pub fn new(store: Arc<dyn ProfileStore>, matcher: Matcher) -> Self {
        Self {
            store,
            matcher,
            ledger: None,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn MatchLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn has_ledger(&self) -> bool {
        self.ledger.is_some()
    }

    /// Requested limit, defaulted and capped. Zero is passed through so it
    /// can be rejected.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }

    /// Rank the top `k` candidates for `subject_id`
    pub async fn find(
        &self,
        subject_id: &str,
        k: Option<usize>,
        filters: &MatchFilters,
    ) -> Result<MatchResult, MatchError> {
        let k = self.resolve_limit(k);
        if k == 0 {
            return Err(MatchError::InvalidInput("k must be a positive integer".to_string()));
        }
        let subject_id = validate_id(subject_id, "subject id")?;

        let subject = self.store.fetch_profile(subject_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => MatchError::SubjectNotFound(subject_id.to_string()),
            StoreError::Unavailable(reason) => MatchError::StoreUnavailable(reason),
        })?;

        let candidates = self
            .store
            .fetch_candidates(&subject)
            .await
            .map_err(|e| MatchError::StoreUnavailable(e.to_string()))?;

        let result = self.matcher.rank(&subject, candidates, k, filters)?;

        if !result.matches.is_empty() {
            self.record_in_background(subject_id, &result);
        }

        Ok(result)
    }

    /// Score one pair with its per-component breakdown
    pub async fn score_pair(
        &self,
        subject_id: &str,
        candidate_id: &str,
    ) -> Result<ScoreBreakdown, MatchError> {
        let subject_id = validate_id(subject_id, "subject id")?;
        let candidate_id = validate_id(candidate_id, "candidate id")?;

        let subject = self.store.fetch_profile(subject_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => MatchError::SubjectNotFound(subject_id.to_string()),
            StoreError::Unavailable(reason) => MatchError::StoreUnavailable(reason),
        })?;
        let candidate = self.store.fetch_profile(candidate_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => MatchError::CandidateNotFound(candidate_id.to_string()),
            StoreError::Unavailable(reason) => MatchError::StoreUnavailable(reason),
        })?;

        Ok(self.matcher.breakdown(&subject, &candidate))
    }

    /// Matches previously recorded by the ledger
    pub async fn saved_matches(
        &self,
        subject_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMatch>, MatchError> {
        let subject_id = validate_id(subject_id, "subject id")?;
        let ledger = self
            .ledger
            .as_ref()
            .ok_or_else(|| MatchError::LedgerUnavailable("match ledger is not configured".to_string()))?;

        let limit = self.resolve_limit(limit);
        if limit == 0 {
            return Err(MatchError::InvalidInput("limit must be a positive integer".to_string()));
        }

        ledger
            .saved_matches(subject_id, limit)
            .await
            .map_err(|e| MatchError::LedgerUnavailable(e.to_string()))
    }

    /// "disabled", "healthy" or "degraded"
    pub async fn ledger_status(&self) -> &'static str {
        let Some(ledger) = &self.ledger else {
            return "disabled";
        };

        if ledger.health_check().await {
            "healthy"
        } else {
            "degraded"
        }
    }

    fn record_in_background(&self, subject_id: &str, result: &MatchResult) {
        let Some(ledger) = self.ledger.clone() else {
            return;
        };

        let subject_id = subject_id.to_string();
        let matches = result.matches.clone();

        tokio::spawn(async move {
            if let Err(e) = ledger.record_matches(&subject_id, &matches).await {
                tracing::warn!("Failed to record {} matches for {}: {}", matches.len(), subject_id, e);
            }
        });
    }
}

fn validate_id<'a>(id: &'a str, what: &str) -> Result<&'a str, MatchError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(MatchError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(id)
}
