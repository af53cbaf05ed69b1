// Bearer-token identity resolution.
// Token issuance belongs to the identity provider; this side only
// verifies HS256 signatures and maps the subject to a user id.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies bearer tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: Arc<DecodingKey>,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Validate a token and return the user id it names.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::AuthError(format!("Invalid token: {}", e)))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::AuthError("Token subject is not a valid user id".to_string()))
    }
}

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
fn extract_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenVerifier: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = TokenVerifier::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

        let token = extract_bearer(header_value)
            .ok_or_else(|| AppError::AuthError("Expected a bearer token".to_string()))?;

        let id = verifier.verify(token)?;
        Ok(AuthUser { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(secret: &str, sub: &str, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = mint("secret", &user_id.to_string(), Duration::minutes(5));

        let verifier = TokenVerifier::new("secret");
        assert_eq!(verifier.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let token = mint("secret", &Uuid::new_v4().to_string(), Duration::minutes(5));

        let verifier = TokenVerifier::new("other-secret");
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let token = mint("secret", &Uuid::new_v4().to_string(), Duration::minutes(-5));

        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_non_uuid_subject() {
        let token = mint("secret", "not-a-uuid", Duration::minutes(5));

        let verifier = TokenVerifier::new("secret");
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("bearer abc"), None);
        assert_eq!(extract_bearer("Basic dXNlcg=="), None);
        assert_eq!(extract_bearer("Bearer "), None);
    }
}
