use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchError, MatchFilters};
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, SavedMatchesQuery,
    SavedMatchesResponse, ScoreQuery,
};
use crate::routes::auth::{AuthError, AuthGate};
use crate::services::MatchFinder;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub finder: Arc<MatchFinder>,
    pub auth: AuthGate,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/score", web::get().to(score_pair))
        .route("/matches/saved", web::get().to(saved_matches));
}

fn error_body(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    use actix_web::http::StatusCode;

    let (status, error) = match err {
        MatchError::SubjectNotFound(_) => (StatusCode::NOT_FOUND, "subject_not_found"),
        MatchError::CandidateNotFound(_) => (StatusCode::NOT_FOUND, "candidate_not_found"),
        MatchError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        MatchError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
        MatchError::LedgerUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "ledger_unavailable"),
    };

    error_body(status, error, err.to_string())
}

fn auth_error_response(err: &AuthError) -> HttpResponse {
    use actix_web::http::StatusCode;

    let (status, error) = match err {
        AuthError::MissingToken | AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        AuthError::MissingSubject => (StatusCode::BAD_REQUEST, "invalid_input"),
    };

    error_body(status, error, err.to_string())
}

fn validation_response(errors: validator::ValidationErrors) -> HttpResponse {
    error_body(
        actix_web::http::StatusCode::BAD_REQUEST,
        "validation_failed",
        errors.to_string(),
    )
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.finder.ledger_status().await;
    let status = if ledger == "degraded" { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: ledger.to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 8,
///   "filters": { "skill": "python", "university": "stanford" }
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return validation_response(errors);
    }

    let user_id = match state.auth.resolve_subject(&http_req, req.user_id.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            tracing::info!("Rejected find_matches request: {}", e);
            return auth_error_response(&e);
        }
    };

    let filters = match MatchFilters::parse(req.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
        Ok(filters) => filters,
        Err(e) => return match_error_response(&e),
    };

    let limit = req.limit.map(|limit| limit as usize);

    tracing::info!("Finding matches for user: {}, limit: {:?}, filters: {}", user_id, limit, filters.len());

    match state.finder.find(&user_id, limit, &filters).await {
        Ok(result) => {
            tracing::info!(
                "Returning {} matches for user {} (from {} candidates)",
                result.matches.len(),
                user_id,
                result.total_candidates
            );

            HttpResponse::Ok().json(FindMatchesResponse {
                matches: result.matches,
                total_candidates: result.total_candidates,
                eligible_candidates: result.eligible_candidates,
            })
        }
        Err(e) => {
            match &e {
                MatchError::StoreUnavailable(_) => tracing::error!("Failed to rank matches for {}: {}", user_id, e),
                _ => tracing::info!("Match request for {} rejected: {}", user_id, e),
            }
            match_error_response(&e)
        }
    }
}

/// Pairwise score endpoint
///
/// GET /api/v1/matches/score?userId={userId}&candidateId={candidateId}
async fn score_pair(
    state: web::Data<AppState>,
    query: web::Query<ScoreQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_response(errors);
    }

    let user_id = match state.auth.resolve_subject(&http_req, query.user_id.as_deref()) {
        Ok(id) => id,
        Err(e) => return auth_error_response(&e),
    };

    match state.finder.score_pair(&user_id, &query.candidate_id).await {
        Ok(breakdown) => HttpResponse::Ok().json(breakdown),
        Err(e) => {
            tracing::warn!("Failed to score {} against {}: {}", user_id, query.candidate_id, e);
            match_error_response(&e)
        }
    }
}

/// Saved matches endpoint
///
/// GET /api/v1/matches/saved?userId={userId}&limit={limit}
///
/// Returns matches recorded by earlier ranking requests, best first.
async fn saved_matches(
    state: web::Data<AppState>,
    query: web::Query<SavedMatchesQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_response(errors);
    }

    let user_id = match state.auth.resolve_subject(&http_req, query.user_id.as_deref()) {
        Ok(id) => id,
        Err(e) => return auth_error_response(&e),
    };

    match state
        .finder
        .saved_matches(&user_id, query.limit.map(|limit| limit as usize))
        .await
    {
        Ok(matches) => HttpResponse::Ok().json(SavedMatchesResponse {
            user_id,
            count: matches.len(),
            matches,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch saved matches for {}: {}", user_id, e);
            match_error_response(&e)
        }
    }
}
