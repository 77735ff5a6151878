use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use founder_match::config::{LoggingSettings, Settings};
use founder_match::core::Matcher;
use founder_match::models::ScoringWeights;
use founder_match::routes::{self, auth::AuthGate, matches::AppState};
use founder_match::services::{
    CacheManager, CachedProfileStore, MatchFinder, MatchLedger, PostgresClient, SupabaseClient,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

async fn build_cache(settings: &Settings) -> Arc<CacheManager> {
    let ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let Some(redis_url) = settings.cache.redis_url.as_deref() else {
        info!("Cache manager initialized without Redis (L1: {} entries, TTL: {}s)", l1_size, ttl);
        return Arc::new(CacheManager::in_memory(l1_size, ttl));
    };

    match CacheManager::new(redis_url, l1_size, ttl).await {
        Ok(cache) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s, L2: Redis)", l1_size, ttl);
            Arc::new(cache)
        }
        Err(e) => {
            error!("Failed to connect to Redis ({}), running with in-process cache only", e);
            Arc::new(CacheManager::in_memory(l1_size, ttl))
        }
    }
}

async fn build_ledger(settings: &Settings) -> Option<Arc<dyn MatchLedger>> {
    if !settings.matching.persist_matches {
        info!("Match persistence disabled by configuration");
        return None;
    }

    let Some(url) = settings.database.url.as_deref() else {
        info!("No database configured, match ledger disabled");
        return None;
    };

    match PostgresClient::from_settings(
        url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    {
        Ok(client) => {
            info!("Match ledger initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Failed to connect to PostgreSQL ({}), match ledger disabled", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match std::env::var("FOUNDER_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    }
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e)))?;

    init_tracing(&settings.logging);

    info!("Starting FounderMatch matching service...");

    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.api_key.clone(),
        settings.supabase.profiles_table.clone(),
        Duration::from_secs(settings.supabase.timeout_secs),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("Supabase client error: {}", e)))?
    .with_page_size(settings.supabase.page_size);

    info!("Supabase client initialized (table: {})", settings.supabase.profiles_table);

    let cache = build_cache(&settings).await;
    let store = Arc::new(CachedProfileStore::new(supabase, cache));

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let mut finder = MatchFinder::new(store, matcher)
        .with_limits(settings.matching.default_limit, settings.matching.max_limit);

    if let Some(ledger) = build_ledger(&settings).await {
        finder = finder.with_ledger(ledger);
    }

    let auth = AuthGate::new(settings.auth.jwt_secret.as_deref(), settings.auth.cookie_name.clone());
    if !auth.is_enabled() {
        warn!("No JWT secret configured, match endpoints accept any userId");
    }

    // Build application state
    let app_state = AppState {
        finder: Arc::new(finder),
        auth,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
