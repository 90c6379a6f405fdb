use thiserror::Error;

use crate::ProviderId;

/// Validation and contract errors exposed by `imagefetch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query is required")]
    EmptyQuery,

    #[error("invalid provider '{value}', expected one of unsplash, pexels, pixabay")]
    InvalidProvider { value: String },

    #[error("quota policy lists provider '{provider}' more than once")]
    DuplicateQuotaRule { provider: ProviderId },
    #[error("quota policy has no rule for primary provider '{provider}'")]
    MissingPrimaryRule { provider: ProviderId },
    #[error("primary provider '{provider}' cannot depend on its own fallback signal")]
    PrimaryDependsOnFallback { provider: ProviderId },
    #[error("quota policy needs exactly one floor-share and one ceil-share provider")]
    UnbalancedFallbackShares,
}
