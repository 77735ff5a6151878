// Model exports
pub mod domain;
pub mod lenient;
pub mod requests;
pub mod responses;

pub use domain::{Profile, ScoredCandidate, ScoreBreakdown, StoredMatch, ScoringWeights};
pub use requests::{FindMatchesRequest, ScoreQuery, SavedMatchesQuery};
pub use responses::{FindMatchesResponse, SavedMatchesResponse, HealthResponse, ErrorResponse};
