use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Request to find matches
///
/// `userId` may be omitted when the caller is authenticated; the token
/// subject is used instead.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

/// Query for a single pairwise score
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: Option<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_id", rename = "candidateId")]
    pub candidate_id: String,
}

/// Query for previously recorded matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavedMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: Option<String>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u32>,
}
