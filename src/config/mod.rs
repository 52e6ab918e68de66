//! Repository list and core-project configuration.
//!
//! The configuration file enumerates the release participants: the core
//! project (recorded under a pseudo-repository name that others may depend on)
//! and the downstream repositories with their per-repository check flags.
//! Everything is created once at run start and never mutated.

use crate::error::{ConfigError, Result};
use crate::remote::RepoRef;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Path of the toolchain pin file inside every participating repository.
pub const TOOLCHAIN_FILE: &str = "theorem_ai-toolchain";

/// Default window for the bounded stable-branch ancestry scan.
pub const DEFAULT_SCAN_LIMIT: usize = 100;

/// Top-level configuration file contents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepoSet {
    /// The core project being released
    pub core: CoreProject,
    /// Downstream repositories, evaluated in declared order
    #[serde(default)]
    pub repositories: Vec<RepoConfig>,
}

/// Settings for the core project and run-wide knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CoreProject {
    /// Pseudo-repository name others may depend on
    pub name: String,
    /// Repository URL
    pub url: String,
    /// Primary development branch checked for the next dev cycle
    #[serde(default = "default_dev_branch")]
    pub dev_branch: String,
    /// Path of the build configuration carrying the version fields
    #[serde(default = "default_build_config_path")]
    pub build_config_path: String,
    /// Base URL of the externally hosted release notes
    #[serde(default = "default_release_notes_base")]
    pub release_notes_base: String,
    /// Repository whose tag feed names the newest nightly toolchain
    #[serde(default = "default_nightly_repo")]
    pub nightly_repo: String,
    /// Product name expected to prefix the release-notes page title
    #[serde(default = "default_product_name")]
    pub product_name: String,
    /// How many recent stable-branch commits the merge check scans.
    /// A bounded approximation: tags merged earlier than this window are
    /// reported as not merged.
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
}

/// One downstream repository participating in the release.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepoConfig {
    /// Unique repository name
    pub name: String,
    /// Repository URL
    pub url: String,
    /// Branch being released
    pub branch: String,
    /// Whether the stable-merge check applies
    pub stable_branch: bool,
    /// Whether the release-tag check applies
    #[serde(default = "default_true")]
    pub toolchain_tag: bool,
    /// Whether the bump-branch check applies
    #[serde(default)]
    pub bump_branch: bool,
    /// Whether a freshly created bump branch gets its pin set to the newest
    /// nightly toolchain
    #[serde(default)]
    pub nightly_pin: bool,
    /// Alternate `owner/name` where bump branches are created and checked,
    /// instead of the origin repository
    #[serde(default)]
    pub bump_remote: Option<String>,
    /// When set, the repository publishes helper-package releases as tags with
    /// this prefix; the newest of them must pin a compatible toolchain
    #[serde(default)]
    pub helper_tag_prefix: Option<String>,
    /// Names that must have passed before this repository is attempted
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl RepoConfig {
    /// The origin repository as `owner/name`.
    pub fn repo_ref(&self) -> RepoRef {
        // Validated at load time, so this cannot fail afterwards.
        RepoRef::parse(&self.url).unwrap_or_else(|| RepoRef {
            owner: String::new(),
            name: self.name.clone(),
        })
    }

    /// Where bump branches live: the configured alternate remote, or origin.
    pub fn bump_repo_ref(&self) -> RepoRef {
        self.bump_remote
            .as_deref()
            .and_then(RepoRef::parse)
            .unwrap_or_else(|| self.repo_ref())
    }
}

impl CoreProject {
    /// The core repository as `owner/name`.
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::parse(&self.url).unwrap_or_else(|| RepoRef {
            owner: String::new(),
            name: self.name.clone(),
        })
    }

    /// The nightly feed repository as `owner/name`.
    pub fn nightly_repo_ref(&self) -> Option<RepoRef> {
        RepoRef::parse(&self.nightly_repo)
    }
}

fn default_true() -> bool {
    true
}

fn default_dev_branch() -> String {
    "master".to_string()
}

fn default_build_config_path() -> String {
    "src/CMakeLists.txt".to_string()
}

fn default_release_notes_base() -> String {
    "https://theorem-ai.org/doc/reference/latest/releases".to_string()
}

fn default_nightly_repo() -> String {
    "leanprover/theorem_ai4-nightly".to_string()
}

fn default_product_name() -> String {
    "theorem_ai".to_string()
}

fn default_scan_limit() -> usize {
    DEFAULT_SCAN_LIMIT
}

impl RepoSet {
    /// Load and validate a configuration file. Missing or malformed
    /// configuration is fatal before any repository is evaluated.
    pub fn load(path: &Path) -> Result<RepoSet> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::Missing {
            path: path.to_path_buf(),
        })?;
        let set: RepoSet = toml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        set.validate()?;
        Ok(set)
    }

    /// Parse from a string (primarily for tests).
    pub fn parse_str(content: &str) -> Result<RepoSet> {
        let set: RepoSet =
            toml::from_str(content).map_err(|source| ConfigError::Malformed {
                path: "<inline>".into(),
                source,
            })?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        if RepoRef::parse(&self.core.url).is_none() {
            return Err(ConfigError::InvalidUrl {
                url: self.core.url.clone(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        seen.insert(self.core.name.as_str());
        for repo in &self.repositories {
            if !seen.insert(repo.name.as_str()) {
                return Err(ConfigError::DuplicateRepository {
                    name: repo.name.clone(),
                }
                .into());
            }
            if RepoRef::parse(&repo.url).is_none() {
                return Err(ConfigError::InvalidUrl {
                    url: repo.url.clone(),
                }
                .into());
            }
            if let Some(remote) = &repo.bump_remote
                && RepoRef::parse(remote).is_none()
            {
                return Err(ConfigError::InvalidUrl {
                    url: remote.clone(),
                }
                .into());
            }
        }

        for repo in &self.repositories {
            for dep in &repo.dependencies {
                let known = dep == &self.core.name
                    || self.repositories.iter().any(|r| &r.name == dep);
                if !known {
                    return Err(ConfigError::UnknownDependency {
                        repository: repo.name.clone(),
                        dependency: dep.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
