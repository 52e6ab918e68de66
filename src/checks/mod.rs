//! Check vocabulary shared by the pipeline and the graph runner.

use std::collections::HashMap;
use std::fmt;

/// Final status of one repository after its pipeline completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every applicable check passed
    Pass,
    /// A check failed (including failed remediation)
    Fail,
    /// Not evaluated because a declared dependency did not pass
    SkippedDependency,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::SkippedDependency => "skipped (dependency not ready)",
        };
        f.write_str(s)
    }
}

/// Per-repository statuses accumulated over a run, in evaluation order.
///
/// Built incrementally by the graph runner — each pipeline sees the report of
/// everything evaluated before it, read-only, and contributes its own entry by
/// value. The run summary is derived entirely from this map, independent of
/// the printed transcript.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    order: Vec<String>,
    statuses: HashMap<String, CheckStatus>,
}

impl RunReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a repository's final status. Each repository is recorded exactly
    /// once, in evaluation order.
    pub fn record(&mut self, name: impl Into<String>, status: CheckStatus) {
        let name = name.into();
        if self.statuses.insert(name.clone(), status).is_none() {
            self.order.push(name);
        }
    }

    /// Status of a previously evaluated repository.
    pub fn status(&self, name: &str) -> Option<CheckStatus> {
        self.statuses.get(name).copied()
    }

    /// Entries in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CheckStatus)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.statuses[name]))
    }

    /// Whether the run as a whole succeeded: every recorded repository passed.
    /// A skipped repository indicates an unready prerequisite and therefore
    /// also fails the run.
    pub fn is_success(&self) -> bool {
        !self.order.is_empty()
            && self
                .statuses
                .values()
                .all(|status| *status == CheckStatus::Pass)
    }
}
