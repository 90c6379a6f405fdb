use imagefetch_core::{ProviderCredentials, QuotaPolicy};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ProviderRow {
    provider: imagefetch_core::ProviderId,
    primary: bool,
    base_quota: u32,
    fallback_share: imagefetch_core::FallbackShare,
    configured: bool,
}

#[derive(Debug, Serialize)]
struct ProvidersData {
    rate_limit_fallback: u32,
    providers: Vec<ProviderRow>,
}

pub fn run(credentials: &ProviderCredentials, policy: &QuotaPolicy) -> Result<CommandResult, CliError> {
    let providers: Vec<ProviderRow> = policy
        .rules()
        .iter()
        .map(|rule| ProviderRow {
            provider: rule.provider,
            primary: rule.provider == policy.primary(),
            base_quota: rule.base,
            fallback_share: rule.share,
            configured: credentials.key_for(rule.provider).is_some(),
        })
        .collect();

    let table = Table {
        headers: vec!["provider", "primary", "base", "share", "configured"],
        rows: providers
            .iter()
            .map(|row| {
                vec![
                    row.provider.to_string(),
                    yes_no(row.primary),
                    row.base_quota.to_string(),
                    format!("{:?}", row.fallback_share).to_lowercase(),
                    yes_no(row.configured),
                ]
            })
            .collect(),
    };

    let data = serde_json::to_value(ProvidersData {
        rate_limit_fallback: policy.rate_limit_fallback(),
        providers,
    })?;

    Ok(CommandResult::ok(data, table))
}

fn yes_no(flag: bool) -> String {
    String::from(if flag { "yes" } else { "no" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_default_policy_and_credential_presence() {
        let credentials = ProviderCredentials::from_lookup(|key| {
            (key == "IMAGEFETCH_PEXELS_API_KEY").then(|| String::from("secret"))
        });

        let result = run(&credentials, &QuotaPolicy::default()).expect("providers render");

        assert_eq!(result.data["rate_limit_fallback"], 2);
        let providers = result.data["providers"].as_array().expect("providers array");
        assert_eq!(providers.len(), 3);
        assert_eq!(providers[0]["provider"], "unsplash");
        assert_eq!(providers[0]["primary"], true);
        assert_eq!(providers[0]["configured"], false);
        assert_eq!(providers[1]["configured"], true);
        assert_eq!(providers[2]["fallback_share"], "ceil");
        assert_eq!(result.table.rows[1][4], "yes");
        assert!(!result.data.to_string().contains("secret"));
    }
}
