//! Command line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Check release status of the theorem_ai toolchain repositories
#[derive(Parser, Debug)]
#[command(
    name = "release_checklist",
    version,
    about = "Check release status of the theorem_ai toolchain repositories",
    long_about = "Verify whether a toolchain release is ready to ship across the core \
                  project and its downstream repositories, remediating missing tags, \
                  stable merges, and bump branches where possible.

Usage:
  release_checklist v4.6.0
  release_checklist v4.6.0-rc1 --dry-run
  release_checklist v4.6.0 --verbose --config release_repos.toml"
)]
pub struct Args {
    /// The toolchain version to check (e.g. v4.6.0 or v4.6.0-rc1)
    #[arg(value_name = "TOOLCHAIN")]
    pub toolchain: String,

    /// Enable step-by-step diagnostic tracing
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the transcript; fatal errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never invoke remediation; report the exact commands instead and treat
    /// unremediated failures as final
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the repository configuration file
    #[arg(long, value_name = "PATH", default_value = "release_repos.toml")]
    pub config: PathBuf,

    /// Bearer token for the hosting provider's API; falls back to the local
    /// gh credential helper, then to unauthenticated (rate-limited) access
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
