// Integration tests for FounderMatch

use async_trait::async_trait;
use founder_match::core::{MatchError, MatchFilters, Matcher};
use founder_match::models::{Profile, ScoredCandidate, ScoringWeights, StoredMatch};
use founder_match::services::{InMemoryProfileStore, MatchFinder, MatchLedger, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn create_test_profile(id: &str, skills: &[&str], interests: &[&str], university: &str) -> Profile {
    Profile {
        name: format!("Founder {}", id),
        email: format!("{}@example.com", id),
        skills: strings(skills),
        interests: strings(interests),
        availability: "Full-time".to_string(),
        university: university.to_string(),
        ..Profile::new(id)
    }
}

fn create_pool() -> Vec<Profile> {
    vec![
        create_test_profile("1", &["python"], &["ai"], "Stanford"),      // 100
        create_test_profile("2", &["python"], &["music"], "Stanford"),   // 75
        create_test_profile("3", &["python"], &["ai"], "MIT"),           // 90
        create_test_profile("4", &["react"], &[], "MIT"),                // 29
        create_test_profile("5", &["design"], &["ai"], "Stanford"),      // 100
        Profile {
            is_admin: true,
            ..create_test_profile("admin", &["python"], &["ai"], "Stanford")
        },
    ]
}

fn create_subject() -> Profile {
    create_test_profile("me", &["react"], &["ai"], "Stanford")
}

#[test]
fn test_integration_end_to_end_example() {
    let matcher = Matcher::with_default_weights();

    let subject = Profile {
        skills: strings(&["javascript", "react"]),
        interests: strings(&["ai", "blockchain"]),
        availability: "Full-time".to_string(),
        university: "Stanford".to_string(),
        ..Profile::new("subject")
    };
    let candidate = Profile {
        skills: strings(&["python", "ml"]),
        interests: strings(&["ai"]),
        availability: "Full-time".to_string(),
        university: "Stanford".to_string(),
        ..Profile::new("candidate")
    };

    let breakdown = matcher.breakdown(&subject, &candidate);
    assert_eq!(breakdown.skills, 35.0);
    assert_eq!(breakdown.interests, 25.0);
    assert_eq!(breakdown.availability, 15.0);
    assert_eq!(breakdown.education, 10.0);

    // 35 + 25 + 15 + 10 + (4 + 4) * 1.5
    let score = matcher.score(&subject, &candidate);
    assert!(score >= 85 && score <= 100, "score {} outside 85..=100", score);
    assert_eq!(score, 97);
}

#[test]
fn test_integration_rank_orders_and_bounds() {
    let matcher = Matcher::with_default_weights();
    let result = matcher
        .rank(&create_subject(), create_pool(), 3, &MatchFilters::none())
        .unwrap();

    assert_eq!(result.total_candidates, 6);
    assert_eq!(result.eligible_candidates, 5);
    assert!(result.matches.len() <= 3);

    for pair in result.matches.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(result.matches.iter().all(|m| m.score > 0));
    assert!(result.matches.iter().all(|m| m.profile.id != "admin"));
}

#[test]
fn test_integration_ties_keep_input_order() {
    let matcher = Matcher::with_default_weights();
    let result = matcher
        .rank(&create_subject(), create_pool(), 10, &MatchFilters::none())
        .unwrap();

    let ids: Vec<&str> = result.matches.iter().map(|m| m.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "5", "3", "2", "4"]);
    assert_eq!(result.matches[0].score, result.matches[1].score);

    // Reversing the pool reverses the tied pair only
    let mut reversed = create_pool();
    reversed.reverse();
    let result = matcher
        .rank(&create_subject(), reversed, 10, &MatchFilters::none())
        .unwrap();
    let ids: Vec<&str> = result.matches.iter().map(|m| m.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["5", "1", "3", "2", "4"]);
}

#[test]
fn test_integration_zero_scores_dropped() {
    let matcher = Matcher::with_default_weights();
    let subject = Profile::new("blank");
    let candidates = vec![Profile::new("also-blank"), create_test_profile("1", &["go"], &[], "")];

    let result = matcher.rank(&subject, candidates, 5, &MatchFilters::none()).unwrap();

    // Blank pair scores 0, the filled candidate still earns completeness points
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].profile.id, "1");
}

#[test]
fn test_integration_filters_exclude_high_scorers() {
    let matcher = Matcher::with_default_weights();
    let filters = MatchFilters::parse([("university", "mit")]).unwrap();

    let result = matcher.rank(&create_subject(), create_pool(), 10, &filters).unwrap();

    let ids: Vec<&str> = result.matches.iter().map(|m| m.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "4"]);
    assert_eq!(result.eligible_candidates, 2);
}

#[test]
fn test_integration_empty_pool_and_invalid_k() {
    let matcher = Matcher::with_default_weights();

    let result = matcher
        .rank(&create_subject(), Vec::new(), 5, &MatchFilters::none())
        .unwrap();
    assert!(result.matches.is_empty());
    assert_eq!(result.total_candidates, 0);

    let err = matcher
        .rank(&create_subject(), create_pool(), 0, &MatchFilters::none())
        .unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));
}

#[test]
fn test_integration_custom_weights() {
    let weights = ScoringWeights {
        education: 0.0,
        ..ScoringWeights::default()
    };
    let matcher = Matcher::new(weights);
    let subject = create_subject();
    let candidate = create_test_profile("1", &["python"], &["ai"], "Stanford");

    assert_eq!(matcher.score(&subject, &candidate), 90);
}

fn create_finder() -> MatchFinder {
    let mut profiles = create_pool();
    profiles.push(create_subject());
    MatchFinder::new(
        Arc::new(InMemoryProfileStore::new(profiles)),
        Matcher::with_default_weights(),
    )
}

#[tokio::test]
async fn test_finder_ranks_from_store() {
    let finder = create_finder();
    let result = finder.find("me", Some(2), &MatchFilters::none()).await.unwrap();

    let ids: Vec<&str> = result.matches.iter().map(|m| m.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "5"]);
    // The store already dropped the subject and the admin
    assert_eq!(result.total_candidates, 5);
}

#[tokio::test]
async fn test_finder_errors() {
    let finder = create_finder();

    let err = finder.find("ghost", None, &MatchFilters::none()).await.unwrap_err();
    assert_eq!(err, MatchError::SubjectNotFound("ghost".to_string()));

    let err = finder.find("me", Some(0), &MatchFilters::none()).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));

    let err = finder.find("   ", None, &MatchFilters::none()).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));

    let err = finder.score_pair("me", "ghost").await.unwrap_err();
    assert_eq!(err, MatchError::CandidateNotFound("ghost".to_string()));

    let err = finder.saved_matches("me", None).await.unwrap_err();
    assert!(matches!(err, MatchError::LedgerUnavailable(_)));
}

#[tokio::test]
async fn test_finder_limit_is_capped() {
    let finder = create_finder().with_limits(1, 2);

    assert_eq!(finder.resolve_limit(None), 1);
    assert_eq!(finder.resolve_limit(Some(40)), 2);

    let result = finder.find("me", Some(40), &MatchFilters::none()).await.unwrap();
    assert_eq!(result.matches.len(), 2);
}

/// Ledger that forwards every recorded batch to the test
struct ChannelLedger {
    tx: mpsc::UnboundedSender<(String, Vec<ScoredCandidate>)>,
}

#[async_trait]
impl MatchLedger for ChannelLedger {
    async fn record_matches(
        &self,
        subject_id: &str,
        matches: &[ScoredCandidate],
    ) -> Result<(), StoreError> {
        self.tx
            .send((subject_id.to_string(), matches.to_vec()))
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn saved_matches(&self, _subject_id: &str, _limit: usize) -> Result<Vec<StoredMatch>, StoreError> {
        Ok(Vec::new())
    }
}

/// Ledger that always fails, to show ranking does not depend on it
struct BrokenLedger;

#[async_trait]
impl MatchLedger for BrokenLedger {
    async fn record_matches(&self, _: &str, _: &[ScoredCandidate]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn saved_matches(&self, _: &str, _: usize) -> Result<Vec<StoredMatch>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_finder_records_matches_in_background() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let finder = create_finder().with_ledger(Arc::new(ChannelLedger { tx }));

    let result = finder.find("me", Some(3), &MatchFilters::none()).await.unwrap();

    let (subject_id, recorded) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("ledger write timed out")
        .expect("ledger channel closed");

    assert_eq!(subject_id, "me");
    assert_eq!(recorded, result.matches);
    assert_eq!(finder.ledger_status().await, "healthy");
}

#[tokio::test]
async fn test_finder_survives_ledger_failure() {
    let finder = create_finder().with_ledger(Arc::new(BrokenLedger));

    let result = finder.find("me", None, &MatchFilters::none()).await.unwrap();
    assert!(!result.matches.is_empty());

    assert_eq!(finder.ledger_status().await, "degraded");
    assert!(matches!(
        finder.saved_matches("me", None).await,
        Err(MatchError::LedgerUnavailable(_))
    ));
}
