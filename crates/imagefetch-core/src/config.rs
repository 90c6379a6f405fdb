//! Environment-backed configuration.
//!
//! Every setting is read from `IMAGEFETCH_<NAME>` first and falls back to the
//! provider's conventional unprefixed variable.
//!
//! | Setting | Primary Env Var | Fallback Env Var |
//! |---------|-----------------|------------------|
//! | Unsplash access key | `IMAGEFETCH_UNSPLASH_ACCESS_KEY` | `UNSPLASH_ACCESS_KEY` |
//! | Pexels API key | `IMAGEFETCH_PEXELS_API_KEY` | `PEXELS_API_KEY` |
//! | Pixabay API key | `IMAGEFETCH_PIXABAY_API_KEY` | `PIXABAY_API_KEY` |

use std::env;

use crate::ProviderId;

/// Reads `IMAGEFETCH_{name}` or `{name}`, ignoring blank values.
pub fn env_value(name: &str) -> Option<String> {
    lookup_value(&|key: &str| env::var(key).ok(), name)
}

fn lookup_value(lookup: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(&format!("IMAGEFETCH_{name}"))
        .filter(|value| !value.trim().is_empty())
        .or_else(|| lookup(name).filter(|value| !value.trim().is_empty()))
}

/// API credentials for each provider; a provider without one is not registered.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub unsplash_access_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,
}

impl ProviderCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            unsplash_access_key: lookup_value(&lookup, "UNSPLASH_ACCESS_KEY"),
            pexels_api_key: lookup_value(&lookup, "PEXELS_API_KEY"),
            pixabay_api_key: lookup_value(&lookup, "PIXABAY_API_KEY"),
        }
    }

    pub fn key_for(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::Unsplash => self.unsplash_access_key.as_deref(),
            ProviderId::Pexels => self.pexels_api_key.as_deref(),
            ProviderId::Pixabay => self.pixabay_api_key.as_deref(),
        }
    }
}

// Keys are secrets; never print them.
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("unsplash_access_key", &self.unsplash_access_key.is_some())
            .field("pexels_api_key", &self.pexels_api_key.is_some())
            .field("pixabay_api_key", &self.pixabay_api_key.is_some())
            .finish()
    }
}
