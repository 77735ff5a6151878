// Core algorithm exports
pub mod error;
pub mod filters;
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use error::MatchError;
pub use filters::{is_eligible_candidate, is_same_person, FilterField, MatchFilters};
pub use matcher::{Matcher, MatchResult};
pub use scoring::{calculate_match_score, score_breakdown};
