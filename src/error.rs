//! Error types for release verification.
//!
//! Only unrecoverable conditions live here: an unparsable target version or a
//! broken configuration aborts the run before (or instead of) evaluating any
//! repository. Remote lookup failures and failed remediations are deliberately
//! *not* errors — they degrade to `false`/`None` results and surface as check
//! failures so a run always produces a complete report.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release_checklist operations
pub type Result<T> = std::result::Result<T, ChecklistError>;

/// Main error type for all release_checklist operations
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// Version parsing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version parsing errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version string does not match the accepted grammar
    #[error("Malformed version '{input}': {reason}")]
    Malformed {
        /// The offending input
        input: String,
        /// Why it was rejected
        reason: String,
    },
}

impl VersionError {
    /// Convenience constructor used throughout the parser
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        VersionError::Malformed {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors (all fatal before any repository is evaluated)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file missing
    #[error("Configuration file not found at {path}")]
    Missing {
        /// Path that was tried
        path: PathBuf,
    },

    /// Configuration file does not parse
    #[error("Failed to parse configuration at {path}: {source}")]
    Malformed {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Two repositories share a name
    #[error("Duplicate repository name '{name}'")]
    DuplicateRepository {
        /// The duplicated name
        name: String,
    },

    /// A dependency references a name that is not declared anywhere
    #[error("Repository '{repository}' depends on unknown repository '{dependency}'")]
    UnknownDependency {
        /// Repository declaring the dependency
        repository: String,
        /// The unresolved name
        dependency: String,
    },

    /// A dependency is declared after the repository that needs it
    #[error(
        "Repository '{repository}' depends on '{dependency}', which is declared later; \
         repositories are evaluated in declared order, so dependencies must come first"
    )]
    DependencyOrder {
        /// Repository declaring the dependency
        repository: String,
        /// Dependency declared too late
        dependency: String,
    },

    /// The dependency graph contains a cycle
    #[error("Dependency cycle involving repositories: {repositories:?}")]
    DependencyCycle {
        /// Names on the cycle
        repositories: Vec<String>,
    },

    /// Repository URL cannot be reduced to owner/name
    #[error(
        "Invalid repository URL '{url}' (expected https://github.com/<owner>/<name> or <owner>/<name>)"
    )]
    InvalidUrl {
        /// The offending URL
        url: String,
    },
}
