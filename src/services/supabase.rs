use crate::models::Profile;
use crate::services::store::{ProfileStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Rows requested per page when listing the pool
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Supabase REST (PostgREST) client for the profiles table
///
/// Reads only. Profiles are written by the web app's own handlers.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    profiles_table: String,
    page_size: usize,
    client: Client,
}

/// One page of rows plus the total from `Content-Range`, when the server sent one
struct Page {
    rows: Vec<Value>,
    total: Option<usize>,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        profiles_table: String,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            profiles_table,
            page_size: DEFAULT_PAGE_SIZE,
            client,
        })
    }

    /// Override the page size; PostgREST may still return fewer rows per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.profiles_table
        )
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn fetch_page(&self, url: &str, what: &str) -> Result<Page, SupabaseError> {
        let response = self
            .get(url)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch {}: {} - {}", what, status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to fetch {}: {}",
                what, status
            )));
        }

        let total = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total);

        let json: Value = response.json().await?;

        match json {
            Value::Array(rows) => Ok(Page { rows, total }),
            _ => Err(SupabaseError::InvalidResponse("Expected a JSON array of rows".into())),
        }
    }

    /// Get a single profile by id
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, SupabaseError> {
        let url = format!(
            "{}?select=*&id=eq.{}&limit=1",
            self.table_url(),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let page = self.fetch_page(&url, "profile").await?;

        let row = page
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("Profile not found for user {}", user_id)))?;

        serde_json::from_value(row)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    /// List every non-admin profile, page by page
    ///
    /// Paging stops at the `Content-Range` total, or at the first short page
    /// when the server sends no total. A pool that does not add up to the
    /// announced total is an error, never a partial result. Rows that fail
    /// to parse are skipped and logged.
    pub async fn list_pool(&self) -> Result<Vec<Profile>, SupabaseError> {
        let mut rows: Vec<Value> = Vec::new();
        let mut expected_total = None;

        loop {
            // `not.is.true` keeps rows where is_admin is NULL; ordering keeps pages stable
            let url = format!(
                "{}?select=*&is_admin=not.is.true&order=id.asc&limit={}&offset={}",
                self.table_url(),
                self.page_size,
                rows.len()
            );

            let page = self.fetch_page(&url, "candidates").await?;
            let page_len = page.rows.len();
            if page.total.is_some() {
                expected_total = page.total;
            }
            rows.extend(page.rows);

            let done = match expected_total {
                Some(total) => rows.len() >= total || page_len == 0,
                None => page_len < self.page_size,
            };
            if done {
                break;
            }
        }

        if let Some(total) = expected_total {
            if rows.len() != total {
                tracing::error!("Candidate pool incomplete: got {} of {} rows", rows.len(), total);
                return Err(SupabaseError::InvalidResponse(format!(
                    "Candidate pool has {} rows but the server announced {}",
                    rows.len(),
                    total
                )));
            }
        }

        let total = rows.len();

        let profiles: Vec<Profile> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Profile>(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping malformed profile row: {}", e);
                    None
                }
            })
            .filter(|p| !p.is_admin)
            .collect();

        tracing::debug!("Queried {} pool profiles (rows: {})", profiles.len(), total);

        Ok(profiles)
    }
}

/// Total row count from a `Content-Range` value such as `0-999/1500` or `*/0`
fn content_range_total(value: &str) -> Option<usize> {
    let (_, total) = value.split_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn fetch_profile(&self, id: &str) -> Result<Profile, StoreError> {
        self.get_profile(id).await.map_err(Into::into)
    }

    async fn fetch_pool(&self) -> Result<Vec<Profile>, StoreError> {
        self.list_pool().await.map_err(Into::into)
    }
}
