//! Remediation procedures and their dispatcher.
//!
//! Remediation is a small fixed set of named, idempotent external procedures.
//! The engine only invokes them and observes a success/failure signal; it
//! never parses their output and never retries here — the pipeline owns the
//! single-retry policy.

use crate::remote::RepoRef;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use tokio::process::Command;

/// One of the named external remediation procedures, with explicit arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Procedure {
    /// Push the release tag for `version` from `branch`
    PushReleaseTag {
        /// Target repository
        repo: RepoRef,
        /// Branch the tag is cut from
        branch: String,
        /// Tag name
        version: String,
    },
    /// Merge the `version` tag into the stable branch
    MergeIntoStable {
        /// Target repository
        repo: RepoRef,
        /// Name of the stable branch
        stable_branch: String,
        /// Tag to merge
        version: String,
    },
    /// Create a ref in `repo` pointing at a source SHA expression
    CreateRef {
        /// Destination repository
        repo: RepoRef,
        /// Ref name, e.g. `bump/v4.7.0`
        ref_name: String,
        /// Shell expression yielding the source SHA
        source: String,
    },
}

impl Procedure {
    /// The exact command line the dispatcher runs. Also what a dry run
    /// reports for manual remediation.
    pub fn command_line(&self) -> String {
        match self {
            Procedure::PushReleaseTag {
                repo,
                branch,
                version,
            } => format!("script/push_repo_release_tag.py {repo} {branch} {version}"),
            Procedure::MergeIntoStable {
                repo,
                stable_branch,
                version,
            } => format!("script/merge_remote.py {repo} {stable_branch} {version}"),
            Procedure::CreateRef {
                repo,
                ref_name,
                source,
            } => format!(
                "gh api -X POST /repos/{repo}/git/refs -f ref=refs/heads/{ref_name} -f sha={source}"
            ),
        }
    }

    /// Shell expression for the tip of `branch` on `repo`, used as the
    /// `CreateRef` source.
    pub fn branch_tip_expr(repo: &RepoRef, branch: &str) -> String {
        format!("$(gh api /repos/{repo}/git/refs/heads/{branch} --jq .object.sha)")
    }
}

/// Capability to invoke a remediation procedure and observe success.
#[async_trait]
pub trait Remediate: Send + Sync {
    /// Run `procedure` to completion; `true` means it reported success. The
    /// caller must re-observe the remote state rather than trust this signal.
    async fn invoke(&self, procedure: &Procedure) -> bool;
}

/// Dispatcher that spawns the external remediation programs.
pub struct ScriptRunner {
    /// Directory the helper scripts live in (the command lines reference
    /// `script/` relative paths, so this is normally the repository root)
    work_dir: PathBuf,
}

impl ScriptRunner {
    /// Dispatcher running procedures from `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Remediate for ScriptRunner {
    async fn invoke(&self, procedure: &Procedure) -> bool {
        let command_line = procedure.command_line();
        debug!("invoking remediation: {command_line}");
        // The CreateRef command embeds a $() SHA expansion, so everything goes
        // through the shell.
        match Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .current_dir(&self.work_dir)
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("remediation '{command_line}' failed to start: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(s: &str) -> RepoRef {
        RepoRef::parse(s).unwrap()
    }

    #[test]
    fn command_lines_match_the_external_tools() {
        let push = Procedure::PushReleaseTag {
            repo: repo("leanprover-community/batteries"),
            branch: "main".to_string(),
            version: "v4.6.0".to_string(),
        };
        assert_eq!(
            push.command_line(),
            "script/push_repo_release_tag.py leanprover-community/batteries main v4.6.0"
        );

        let merge = Procedure::MergeIntoStable {
            repo: repo("leanprover-community/aesop"),
            stable_branch: "stable".to_string(),
            version: "v4.6.0".to_string(),
        };
        assert_eq!(
            merge.command_line(),
            "script/merge_remote.py leanprover-community/aesop stable v4.6.0"
        );

        let create = Procedure::CreateRef {
            repo: repo("leanprover-community/mathlib4-nightly-testing"),
            ref_name: "bump/v4.7.0".to_string(),
            source: Procedure::branch_tip_expr(&repo("leanprover-community/mathlib4"), "master"),
        };
        assert_eq!(
            create.command_line(),
            "gh api -X POST /repos/leanprover-community/mathlib4-nightly-testing/git/refs \
             -f ref=refs/heads/bump/v4.7.0 \
             -f sha=$(gh api /repos/leanprover-community/mathlib4/git/refs/heads/master \
             --jq .object.sha)"
        );
    }
}
