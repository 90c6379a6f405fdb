//! Server settings read from the environment.
//!
//! | Setting | Env Var | Default |
//! |---------|---------|---------|
//! | JWT signing key | `IMAGEFETCH_JWT_KEY` / `JWT_KEY` | required |
//! | JWT issuer | `IMAGEFETCH_JWT_ISSUER` / `JWT_ISSUER` | `imagefetch` |
//! | JWT audience | `IMAGEFETCH_JWT_AUDIENCE` / `JWT_AUDIENCE` | `imagefetch-clients` |

use imagefetch_core::config::env_value;
use thiserror::Error;

const DEFAULT_ISSUER: &str = "imagefetch";
const DEFAULT_AUDIENCE: &str = "imagefetch-clients";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT signing key is missing; set IMAGEFETCH_JWT_KEY")]
    MissingJwtKey,
}

#[derive(Clone, PartialEq, Eq)]
pub struct JwtSettings {
    pub key: String,
    pub issuer: String,
    pub audience: String,
}

impl JwtSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = env_value("JWT_KEY").ok_or(ConfigError::MissingJwtKey)?;
        Ok(Self {
            key,
            issuer: env_value("JWT_ISSUER").unwrap_or_else(|| String::from(DEFAULT_ISSUER)),
            audience: env_value("JWT_AUDIENCE").unwrap_or_else(|| String::from(DEFAULT_AUDIENCE)),
        })
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}
