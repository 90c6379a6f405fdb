mod providers;
mod search;

use imagefetch_core::{ImageSearchEngineBuilder, ProviderCredentials, QuotaPolicy};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Table;

/// Rendered result of one command.
pub struct CommandResult {
    pub data: Value,
    pub table: Table,
    pub no_content: bool,
}

impl CommandResult {
    pub fn ok(data: Value, table: Table) -> Self {
        Self {
            data,
            table,
            no_content: false,
        }
    }

    pub fn with_no_content(mut self, no_content: bool) -> Self {
        self.no_content = no_content;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Search(args) => {
            let builder = ImageSearchEngineBuilder::new().with_env_credentials();
            search::run(args, builder).await
        }
        Command::Providers => {
            providers::run(&ProviderCredentials::from_env(), &QuotaPolicy::default())
        }
    }
}
