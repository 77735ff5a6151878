use crate::core::{
    error::MatchError,
    filters::{is_eligible_candidate, MatchFilters},
    scoring::{calculate_match_score, score_breakdown},
};
use crate::models::{Profile, ScoreBreakdown, ScoredCandidate, ScoringWeights};

/// Result of the ranking process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    /// Pool size as handed to the ranker
    pub total_candidates: usize,
    /// Candidates left after eligibility and attribute filters
    pub eligible_candidates: usize,
}

/// Ranks a candidate pool for one subject
///
/// # Pipeline Stages
/// 1. Eligibility (no self-match, no administrators)
/// 2. Attribute filters
/// 3. Scoring, dropping zero scores
/// 4. Stable sort by score and top-K truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, subject: &Profile, candidate: &Profile) -> u8 {
        calculate_match_score(subject, candidate, &self.weights)
    }

    pub fn breakdown(&self, subject: &Profile, candidate: &Profile) -> ScoreBreakdown {
        score_breakdown(subject, candidate, &self.weights)
    }

    /// Rank `candidates` for `subject` and keep the best `k`
    ///
    /// # Arguments
    /// * `subject` - The profile matches are computed for
    /// * `candidates` - Fully materialized candidate pool
    /// * `k` - Maximum number of matches to return, at least 1
    /// * `filters` - Attribute filters applied before scoring
    ///
    /// # Returns
    /// Matches sorted by score descending. Equal scores keep the order
    /// they had in `candidates`.
    pub fn rank(
        &self,
        subject: &Profile,
        candidates: Vec<Profile>,
        k: usize,
        filters: &MatchFilters,
    ) -> Result<MatchResult, MatchError> {
        if k == 0 {
            return Err(MatchError::InvalidInput("k must be a positive integer".to_string()));
        }

        let total_candidates = candidates.len();

        let pool: Vec<Profile> = candidates
            .into_iter()
            // Stage 1: Eligibility
            .filter(|candidate| is_eligible_candidate(subject, candidate))
            // Stage 2: Attribute filters
            .filter(|candidate| filters.matches(candidate))
            .collect();

        let eligible_candidates = pool.len();

        // Stage 3: Scoring
        let mut scored: Vec<ScoredCandidate> = pool
            .into_iter()
            .filter_map(|profile| {
                let score = self.score(subject, &profile);
                (score > 0).then_some(ScoredCandidate { profile, score })
            })
            .collect();

        // Stage 4: `sort_by` is stable, so ties stay in input order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(k);

        tracing::debug!(
            "Ranked {} of {} candidates for {} ({} eligible, {} filters)",
            scored.len(),
            total_candidates,
            subject.id,
            eligible_candidates,
            filters.len()
        );

        Ok(MatchResult {
            matches: scored,
            total_candidates,
            eligible_candidates,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
