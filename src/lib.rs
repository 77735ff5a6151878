//! FounderMatch - co-founder matching service
//!
//! This library provides the match-ranking core used by FounderMatch: a pure
//! pairwise compatibility scorer, a top-K ranker, and the services that feed
//! it profiles from the hosted store.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchError, MatchFilters, MatchResult, calculate_match_score, score_breakdown};
pub use models::{Profile, ScoredCandidate, ScoreBreakdown, ScoringWeights, FindMatchesRequest, FindMatchesResponse};
pub use services::{MatchFinder, ProfileStore, InMemoryProfileStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let subject = Profile::new("a");
        assert_eq!(calculate_match_score(&subject, &subject, &ScoringWeights::default()), 0);
    }
}
