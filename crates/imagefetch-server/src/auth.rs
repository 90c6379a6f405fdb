//! JWT bearer authentication for the search endpoint.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtSettings;
use crate::error::ApiError;
use crate::routes::AppState;

/// Claims the service requires on every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredentials,
    #[error("invalid bearer token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// HS256 verifier checking signature, issuer, audience and expiry.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            key: DecodingKey::from_secret(settings.key.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Extractor that rejects the request unless it carries a valid bearer token.
pub struct Authenticated(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let claims = state.verifier.verify(token)?;
        Ok(Self(claims))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    use super::Claims;
    use crate::config::JwtSettings;

    pub fn settings() -> JwtSettings {
        JwtSettings {
            key: String::from("test-signing-key-with-enough-entropy"),
            issuer: String::from("imagefetch-tests"),
            audience: String::from("imagefetch-clients"),
        }
    }

    pub fn token_with(settings: &JwtSettings, issuer: &str, expires_in: Duration) -> String {
        let claims = Claims {
            sub: String::from("client-1"),
            iss: issuer.to_owned(),
            aud: settings.audience.clone(),
            exp: (OffsetDateTime::now_utc() + expires_in).unix_timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.key.as_bytes()),
        )
        .expect("token encodes")
    }

    pub fn valid_token(settings: &JwtSettings) -> String {
        token_with(settings, &settings.issuer, Duration::minutes(10))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{settings, token_with, valid_token};
    use super::*;
    use time::Duration;

    #[test]
    fn accepts_token_with_matching_issuer_and_audience() {
        let settings = settings();
        let verifier = JwtVerifier::new(&settings);

        let claims = verifier.verify(&valid_token(&settings)).expect("valid token");
        assert_eq!(claims.sub, "client-1");
    }

    #[test]
    fn rejects_wrong_issuer() {
        let settings = settings();
        let verifier = JwtVerifier::new(&settings);

        let token = token_with(&settings, "someone-else", Duration::minutes(10));
        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let settings = settings();
        let verifier = JwtVerifier::new(&settings);

        let token = token_with(&settings, &settings.issuer, Duration::hours(-2));
        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let settings = settings();
        let verifier = JwtVerifier::new(&settings);
        let other = JwtSettings {
            key: String::from("a-completely-different-signing-key"),
            ..settings.clone()
        };

        assert!(verifier.verify(&valid_token(&other)).is_err());
    }
}
