//! CLI argument definitions for imagefetch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Search all providers for images matching a query |
//! | `providers` | Show the quota policy and which providers are configured |
//!
//! # Examples
//!
//! ```bash
//! imagefetch search "red panda" --pretty
//! imagefetch search cat --format table --seed 7
//! imagefetch providers
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Image search across Unsplash, Pexels and Pixabay.
///
/// Provider API keys are read from IMAGEFETCH_UNSPLASH_ACCESS_KEY,
/// IMAGEFETCH_PEXELS_API_KEY and IMAGEFETCH_PIXABAY_API_KEY (or the same
/// names without the IMAGEFETCH_ prefix).
#[derive(Debug, Parser)]
#[command(name = "imagefetch", author, version, about = "Concurrent image search CLI")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log provider activity to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every provider concurrently and print the merged images.
    ///
    /// Exits with code 3 when no provider returned any image.
    Search(SearchArgs),

    /// Show the per-provider quota policy and configured credentials.
    Providers,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to search for.
    pub query: String,

    /// Include the engine's event trace in the output.
    #[arg(long, default_value_t = false)]
    pub explain: bool,

    /// Seed the result shuffle for a reproducible order.
    #[arg(long)]
    pub seed: Option<u64>,
}
