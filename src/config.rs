use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rows per request when listing the pool; keep at or below PostgREST max-rows
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_profiles_table() -> String { "profiles".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_page_size() -> usize { 1000 }

/// The match ledger is disabled when `url` is unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Redis is optional; without `redis_url` only the in-process tier is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_persist_matches")]
    pub persist_matches: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            persist_matches: default_persist_matches(),
        }
    }
}

fn default_limit() -> usize { 8 }
fn default_max_limit() -> usize { 50 }
fn default_persist_matches() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_skills_weight")]
    pub skills: f64,
    #[serde(default = "default_skills_partial_weight")]
    pub skills_partial: f64,
    #[serde(default = "default_interests_weight")]
    pub interests: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
    #[serde(default = "default_education_weight")]
    pub education: f64,
    #[serde(default = "default_completeness_weight")]
    pub completeness: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skills: default_skills_weight(),
            skills_partial: default_skills_partial_weight(),
            interests: default_interests_weight(),
            availability: default_availability_weight(),
            education: default_education_weight(),
            completeness: default_completeness_weight(),
        }
    }
}

fn default_skills_weight() -> f64 { 35.0 }
fn default_skills_partial_weight() -> f64 { 15.0 }
fn default_interests_weight() -> f64 { 25.0 }
fn default_availability_weight() -> f64 { 15.0 }
fn default_education_weight() -> f64 { 10.0 }
fn default_completeness_weight() -> f64 { 15.0 }

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            skills: config.skills,
            skills_partial: config.skills_partial,
            interests: config.interests,
            availability: config.availability,
            education: config.education,
            completeness: config.completeness,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Token checks are off unless `jwt_secret` is set
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_cookie_name() -> String { "token".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with FOUNDER_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., FOUNDER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("FOUNDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FOUNDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

/// Apply the well-known variables the hosting platform sets
///
/// SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY, DATABASE_URL and JWT_SECRET win
/// over file values when present.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("supabase.url", env::var("SUPABASE_URL").ok()),
        (
            "supabase.api_key",
            env::var("SUPABASE_SERVICE_ROLE_KEY")
                .or_else(|_| env::var("SUPABASE_KEY"))
                .ok(),
        ),
        ("database.url", env::var("DATABASE_URL").ok()),
        (
            "auth.jwt_secret",
            env::var("JWT_SECRET")
                .or_else(|_| env::var("SUPABASE_JWT_SECRET"))
                .ok(),
        ),
        ("cache.redis_url", env::var("REDIS_URL").ok()),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (key, value) in overrides {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn settings_from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.skills, 35.0);
        assert_eq!(weights.skills_partial, 15.0);
        assert_eq!(weights.interests, 25.0);
        assert_eq!(weights.availability, 15.0);
        assert_eq!(weights.education, 10.0);
        assert_eq!(weights.completeness, 15.0);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let settings = settings_from_toml(
            r#"
            [supabase]
            url = "https://project.supabase.co"
            api_key = "service-role"
            "#,
        );

        assert_eq!(settings.supabase.profiles_table, "profiles");
        assert_eq!(settings.supabase.page_size, 1000);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.matching.default_limit, 8);
        assert_eq!(settings.matching.max_limit, 50);
        assert!(settings.matching.persist_matches);
        assert!(settings.database.url.is_none());
        assert!(settings.cache.redis_url.is_none());
        assert!(settings.auth.jwt_secret.is_none());
        assert_eq!(settings.auth.cookie_name, "token");
    }

    #[test]
    fn test_partial_weight_override() {
        let settings = settings_from_toml(
            r#"
            [supabase]
            url = "https://project.supabase.co"
            api_key = "service-role"

            [scoring.weights]
            skills = 40.0
            completeness = 10.0
            "#,
        );

        let weights = ScoringWeights::from(&settings.scoring.weights);
        assert_eq!(weights.skills, 40.0);
        assert_eq!(weights.completeness, 10.0);
        assert_eq!(weights.interests, 25.0);
    }
}
