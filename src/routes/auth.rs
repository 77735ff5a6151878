use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Errors from the session token check
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token subject does not match the requested user")]
    Forbidden,

    #[error("userId is required")]
    MissingSubject,
}

/// Claims read from the session token
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// Optional HS256 session check for match endpoints
///
/// Tokens are read from `Authorization: Bearer` first, then from the session
/// cookie. Issuing tokens is the auth provider's job.
#[derive(Clone)]
pub struct AuthGate {
    key: Option<DecodingKey>,
    validation: Validation,
    cookie_name: String,
}

impl AuthGate {
    pub fn new(secret: Option<&str>, cookie_name: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Provider tokens carry an audience we do not pin
        validation.validate_aud = false;

        Self {
            key: secret
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, "token")
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    fn token_from(&self, req: &HttpRequest) -> Option<String> {
        let bearer = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        bearer.or_else(|| req.cookie(&self.cookie_name).map(|c| c.value().to_string()))
    }

    /// Verified claims, or `None` when the gate is disabled
    pub fn verify(&self, req: &HttpRequest) -> Result<Option<Claims>, AuthError> {
        let Some(key) = &self.key else {
            return Ok(None);
        };

        let token = self.token_from(req).ok_or(AuthError::MissingToken)?;
        let data = decode::<Claims>(&token, key, &self.validation)?;

        Ok(Some(data.claims))
    }

    /// The acting user's id
    ///
    /// With the gate enabled the token subject wins and a different
    /// `requested` id is refused. Without it `requested` is required.
    pub fn resolve_subject(
        &self,
        req: &HttpRequest,
        requested: Option<&str>,
    ) -> Result<String, AuthError> {
        match (self.verify(req)?, requested) {
            (Some(claims), Some(requested)) if requested != claims.sub => Err(AuthError::Forbidden),
            (Some(claims), _) => Ok(claims.sub),
            (None, Some(requested)) => Ok(requested.to_string()),
            (None, None) => Err(AuthError::MissingSubject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: usize,
        aud: &'a str,
    }

    fn token_for(sub: &str, secret: &str) -> String {
        let claims = TestClaims {
            sub,
            exp: 4_102_444_800, // 2100-01-01
            aud: "authenticated",
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_disabled_gate_uses_requested_id() {
        let gate = AuthGate::disabled();
        let req = TestRequest::default().to_http_request();

        assert!(!gate.is_enabled());
        assert_eq!(gate.resolve_subject(&req, Some("u1")).unwrap(), "u1");
        assert!(matches!(gate.resolve_subject(&req, None), Err(AuthError::MissingSubject)));
    }

    #[test]
    fn test_bearer_token_sets_subject() {
        let gate = AuthGate::new(Some(SECRET), "token");
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token_for("u1", SECRET))))
            .to_http_request();

        assert_eq!(gate.resolve_subject(&req, None).unwrap(), "u1");
        assert_eq!(gate.resolve_subject(&req, Some("u1")).unwrap(), "u1");
        assert!(matches!(gate.resolve_subject(&req, Some("u2")), Err(AuthError::Forbidden)));
    }

    #[test]
    fn test_cookie_token_accepted() {
        let gate = AuthGate::new(Some(SECRET), "session");
        let req = TestRequest::default()
            .cookie(Cookie::new("session", token_for("u7", SECRET)))
            .to_http_request();

        assert_eq!(gate.resolve_subject(&req, None).unwrap(), "u7");
    }

    #[test]
    fn test_missing_and_forged_tokens_rejected() {
        let gate = AuthGate::new(Some(SECRET), "token");

        let bare = TestRequest::default().to_http_request();
        assert!(matches!(gate.verify(&bare), Err(AuthError::MissingToken)));

        let forged = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token_for("u1", "other-secret"))))
            .to_http_request();
        assert!(matches!(gate.verify(&forged), Err(AuthError::InvalidToken(_))));
    }
}
