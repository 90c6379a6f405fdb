//! Per-provider quota computation.
//!
//! The primary provider asks for a fixed base. When it reports rate limiting
//! the fallback signal carries its shortfall, and the two dependent providers
//! split that amount between them (one rounding down, one rounding up) so the
//! combined request is unchanged.

use std::collections::HashSet;

use serde::Serialize;

use crate::{ProviderId, ValidationError};

/// How a provider's quota reacts to the fallback signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackShare {
    None,
    Floor,
    Ceil,
}

impl FallbackShare {
    pub const fn adjustment(self, fallback: u32) -> u32 {
        match self {
            Self::None => 0,
            Self::Floor => fallback / 2,
            Self::Ceil => fallback / 2 + fallback % 2,
        }
    }

    pub const fn depends_on_fallback(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaRule {
    pub provider: ProviderId,
    pub base: u32,
    pub share: FallbackShare,
}

impl QuotaRule {
    pub const fn new(provider: ProviderId, base: u32, share: FallbackShare) -> Self {
        Self {
            provider,
            base,
            share,
        }
    }

    pub const fn quota(self, fallback: u32) -> u32 {
        self.base.saturating_add(self.share.adjustment(fallback))
    }
}

/// Validated set of quota rules plus the primary provider and its sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaPolicy {
    primary: ProviderId,
    rules: Vec<QuotaRule>,
    rate_limit_fallback: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            primary: ProviderId::Unsplash,
            rules: vec![
                QuotaRule::new(ProviderId::Unsplash, 2, FallbackShare::None),
                QuotaRule::new(ProviderId::Pexels, 5, FallbackShare::Floor),
                QuotaRule::new(ProviderId::Pixabay, 5, FallbackShare::Ceil),
            ],
            rate_limit_fallback: 2,
        }
    }
}

impl QuotaPolicy {
    /// Builds a policy whose rate-limit sentinel equals the primary's base,
    /// so a rate-limited primary is compensated exactly.
    pub fn new(primary: ProviderId, rules: Vec<QuotaRule>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.provider) {
                return Err(ValidationError::DuplicateQuotaRule {
                    provider: rule.provider,
                });
            }
        }

        let primary_rule = rules
            .iter()
            .find(|rule| rule.provider == primary)
            .copied()
            .ok_or(ValidationError::MissingPrimaryRule { provider: primary })?;
        if primary_rule.share.depends_on_fallback() {
            return Err(ValidationError::PrimaryDependsOnFallback { provider: primary });
        }

        let floors = rules
            .iter()
            .filter(|rule| rule.share == FallbackShare::Floor)
            .count();
        let ceils = rules
            .iter()
            .filter(|rule| rule.share == FallbackShare::Ceil)
            .count();
        if floors != 1 || ceils != 1 {
            return Err(ValidationError::UnbalancedFallbackShares);
        }

        Ok(Self {
            primary,
            rules,
            rate_limit_fallback: primary_rule.base,
        })
    }

    pub const fn primary(&self) -> ProviderId {
        self.primary
    }

    pub fn rules(&self) -> &[QuotaRule] {
        &self.rules
    }

    pub fn rule(&self, provider: ProviderId) -> Option<QuotaRule> {
        self.rules.iter().find(|rule| rule.provider == provider).copied()
    }

    /// Value the primary writes into the fallback signal when rate limited.
    pub const fn rate_limit_fallback(&self) -> u32 {
        self.rate_limit_fallback
    }

    /// Quota requested from `provider` given the observed fallback value.
    /// Providers outside the policy get zero.
    pub fn quota(&self, provider: ProviderId, fallback: u32) -> u32 {
        self.rule(provider)
            .map(|rule| rule.quota(fallback))
            .unwrap_or(0)
    }

    /// Sum of all quotas for a given fallback value.
    pub fn total(&self, fallback: u32) -> u32 {
        self.rules
            .iter()
            .fold(0_u32, |acc, rule| acc.saturating_add(rule.quota(fallback)))
    }
}
