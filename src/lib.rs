//! # Release Checklist
//!
//! Release readiness verification for the theorem_ai toolchain and its
//! downstream repositories.
//!
//! A release is defined by a single toolchain version string. The core
//! project plus each downstream repository must satisfy an ordered sequence
//! of readiness checks — toolchain pinning, release artifacts, stable-branch
//! merge status, and the next development-cycle bump — before the release is
//! declared complete. Failing checks are remediated once via external
//! procedures and then re-verified, never assumed to have succeeded.
//!
//! ## Usage
//!
//! ```bash
//! release_checklist v4.6.0              # verify, remediating where possible
//! release_checklist v4.6.0-rc1         # rc targets skip the stable-merge check
//! release_checklist v4.6.0 --dry-run   # report remediation commands only
//! ```
//!
//! The engine runs once per invocation and reports exit status; there is no
//! polling and no persistent state.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod remedy;
pub mod remote;
pub mod runner;
pub mod version;

// Re-export main types for public API
pub use checks::{CheckStatus, RunReport};
pub use cli::Args;
pub use config::{CoreProject, RepoConfig, RepoSet};
pub use error::{ChecklistError, ConfigError, Result, VersionError};
pub use pipeline::{PipelineContext, run_pipeline};
pub use remedy::{Procedure, Remediate, ScriptRunner};
pub use remote::{GitHubRemote, PrInfo, RemoteState, RepoRef};
pub use runner::ReleaseGraphRunner;
pub use version::Toolchain;
