use serde::{Deserialize, Serialize};

use super::lenient;

/// Founder profile as stored in the `profiles` table
///
/// Every optional column has a default so the scorer works on plain values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub availability: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub university: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub major: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub status: String,
    #[serde(alias = "isAdmin", default, deserialize_with = "lenient::bool_or_false")]
    pub is_admin: bool,
}

impl Profile {
    /// Bare profile with only an id, for building fixtures
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A candidate together with its compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub profile: Profile,
    pub score: u8,
}

/// Points awarded by each scoring component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub interests: f64,
    pub availability: f64,
    pub education: f64,
    pub completeness: f64,
    pub total: u8,
}

/// A computed match persisted by the match ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: uuid::Uuid,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "matchedUserId")]
    pub matched_user_id: String,
    pub score: u8,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

/// Scoring weights, in points out of 100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Both sides bring skills the other lacks
    pub skills: f64,
    /// Only one side brings skills the other lacks
    pub skills_partial: f64,
    pub interests: f64,
    pub availability: f64,
    pub education: f64,
    pub completeness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 35.0,
            skills_partial: 15.0,
            interests: 25.0,
            availability: 15.0,
            education: 10.0,
            completeness: 15.0,
        }
    }
}

impl ScoringWeights {
    /// Highest score the weights can produce
    pub fn max_total(&self) -> f64 {
        self.skills + self.interests + self.availability + self.education + self.completeness
    }
}
