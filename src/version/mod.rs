//! Toolchain version parsing and ordering.
//!
//! The accepted grammar is an optional `origin:` prefix, an optional `v`,
//! a dotted `MAJOR.MINOR.PATCH` triple, and an optional `-rcN` suffix — or the
//! literal nightly form `leanprover/theorem_ai4:nightly-<date>`. Nothing else is
//! normalized; an unrecognized suffix is a parse failure.
//!
//! Two ordering rules are fixed business rules, not emergent from the data:
//! a final release is newer than every release candidate of the same triple,
//! and a nightly toolchain is older than every numbered version regardless of
//! its embedded date.

use crate::error::VersionError;
use std::fmt;

/// Origin repository that publishes the toolchain
pub const TOOLCHAIN_ORIGIN: &str = "leanprover/theorem_ai4";

/// Literal prefix of a nightly toolchain identifier
pub const NIGHTLY_PREFIX: &str = "leanprover/theorem_ai4:nightly-";

/// Ordering rank of the release-candidate component.
///
/// `Final` sorts above every `Candidate(n)`, encoding "a final release is
/// always newer than any RC of the same major.minor.patch".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RcRank {
    /// Pre-release build `-rcN`
    Candidate(u32),
    /// Final release (infinite rc rank)
    Final,
}

/// A parsed toolchain version, immutable once parsed.
///
/// Derived `Ord` gives the required total order: every nightly sorts below
/// every numbered release, numbered releases compare on the
/// `(major, minor, patch, rc)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Toolchain {
    /// Date-named unstable build; ordered below all numbered versions
    Nightly {
        /// The embedded date (ordering between nightlies only)
        date: String,
    },
    /// Numbered release, possibly a release candidate
    Release {
        /// Major version
        major: u32,
        /// Minor version
        minor: u32,
        /// Patch version
        patch: u32,
        /// Release-candidate rank
        rc: RcRank,
    },
}

impl Toolchain {
    /// Parse a version string against the accepted grammar.
    pub fn parse(input: &str) -> Result<Toolchain, VersionError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(VersionError::malformed(input, "empty version string"));
        }
        if let Some(date) = s.strip_prefix(NIGHTLY_PREFIX) {
            if date.is_empty() {
                return Err(VersionError::malformed(input, "nightly identifier has no date"));
            }
            return Ok(Toolchain::Nightly {
                date: date.to_string(),
            });
        }

        // Pin files may carry an `origin:` prefix, e.g. `leanprover/theorem_ai4:v4.6.0`.
        let s = match s.split_once(':') {
            Some((_, rest)) => rest,
            None => s,
        };
        let s = s.strip_prefix('v').unwrap_or(s);

        let (base, rc) = match s.split_once('-') {
            Some((base, suffix)) => {
                let n = suffix
                    .strip_prefix("rc")
                    .ok_or_else(|| {
                        VersionError::malformed(input, format!("unrecognized suffix '-{suffix}'"))
                    })?
                    .parse::<u32>()
                    .map_err(|_| {
                        VersionError::malformed(input, format!("invalid rc number in '-{suffix}'"))
                    })?;
                (base, RcRank::Candidate(n))
            }
            None => (s, RcRank::Final),
        };

        let mut parts = base.split('.');
        let mut component = |name: &str| -> Result<u32, VersionError> {
            parts
                .next()
                .ok_or_else(|| VersionError::malformed(input, format!("missing {name} component")))?
                .parse::<u32>()
                .map_err(|_| VersionError::malformed(input, format!("non-numeric {name} component")))
        };
        let major = component("major")?;
        let minor = component("minor")?;
        let patch = component("patch")?;
        if parts.next().is_some() {
            return Err(VersionError::malformed(
                input,
                "expected exactly MAJOR.MINOR.PATCH",
            ));
        }

        Ok(Toolchain::Release {
            major,
            minor,
            patch,
            rc,
        })
    }

    /// The `(major, minor)` pair of a numbered release.
    pub fn major_minor(&self) -> Option<(u32, u32)> {
        match self {
            Toolchain::Release { major, minor, .. } => Some((*major, *minor)),
            Toolchain::Nightly { .. } => None,
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toolchain::Nightly { date } => write!(f, "{NIGHTLY_PREFIX}{date}"),
            Toolchain::Release {
                major,
                minor,
                patch,
                rc,
            } => {
                write!(f, "v{major}.{minor}.{patch}")?;
                if let RcRank::Candidate(n) = rc {
                    write!(f, "-rc{n}")?;
                }
                Ok(())
            }
        }
    }
}

/// Check whether `candidate` satisfies "at least `target`".
///
/// A nightly candidate never satisfies a numbered minimum, so it returns
/// `false` without attempting to parse. Everything else parses both sides and
/// compares on the total order.
pub fn is_at_least(candidate: &str, target: &str) -> Result<bool, VersionError> {
    if candidate.trim().starts_with(NIGHTLY_PREFIX) {
        return Ok(false);
    }
    Ok(Toolchain::parse(candidate)? >= Toolchain::parse(target)?)
}

/// Remove the `-rcN` suffix, leaving the bare version.
pub fn strip_rc(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

/// Whether the version string names a release candidate.
pub fn is_release_candidate(version: &str) -> bool {
    version.contains("-rc")
}

/// Compute the next development-cycle version: minor + 1, patch 0, RC dropped.
pub fn next_version(version: &str) -> Result<String, VersionError> {
    match Toolchain::parse(version)? {
        Toolchain::Release { major, minor, .. } => Ok(format!("v{major}.{}.0", minor + 1)),
        Toolchain::Nightly { .. } => Err(VersionError::malformed(
            version,
            "a nightly toolchain has no next release version",
        )),
    }
}

/// Name of the release branch for a target version: `releases/v<major>.<minor>.0`.
pub fn release_branch(version: &str) -> Result<String, VersionError> {
    match Toolchain::parse(version)? {
        Toolchain::Release { major, minor, .. } => Ok(format!("releases/v{major}.{minor}.0")),
        Toolchain::Nightly { .. } => Err(VersionError::malformed(
            version,
            "a nightly toolchain has no release branch",
        )),
    }
}
