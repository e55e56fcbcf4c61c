//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// adapterkit - inspect and validate ad-server adapter configuration
#[derive(Parser)]
#[command(name = "adapterkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered backends and their capabilities
    List(ListArgs),

    /// Print the configuration form document for a backend
    Describe(DescribeArgs),

    /// Validate stored configuration payloads
    Validate(ValidateArgs),

    /// Run an adapter operation in dry-run mode
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Backend identifier or alias
    pub backend: String,

    /// Print only the SHA-256 fingerprint of the document
    #[arg(long)]
    pub fingerprint: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Backend identifier or alias
    pub backend: String,

    /// JSON payload files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Schema to validate against (connection, product, inventory)
    #[arg(long, default_value = "connection")]
    pub kind: String,

    /// Reject unknown fields (overrides config and environment)
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Drop unknown fields with a warning (overrides config and environment)
    #[arg(long)]
    pub lenient: bool,

    /// Print each validated payload with secrets redacted
    #[arg(long)]
    pub show: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Backend identifier or alias
    pub backend: String,

    /// Operation to simulate (e.g. sync_inventory, create_line_item)
    pub operation: String,

    /// Connection payload (JSON)
    #[arg(long)]
    pub config: PathBuf,

    /// Operation request body (JSON)
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Principal recorded on the planned action
    #[arg(long, default_value = "cli")]
    pub principal: String,

    /// Dispatch to the backend client instead of simulating
    /// (ignored when `[adapter] dry_run = true` is configured)
    #[arg(long)]
    pub live: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
