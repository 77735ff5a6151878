use thiserror::Error;

/// Errors surfaced by a ranking request
///
/// An empty candidate pool is not an error; it yields an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),

    #[error("Candidate store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Match ledger unavailable: {0}")]
    LedgerUnavailable(String),
}
