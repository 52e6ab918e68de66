//! Remote-state abstraction over the hosting provider.
//!
//! The engine never talks HTTP directly — every check goes through the
//! [`RemoteState`] capability trait so the pipeline can be exercised against a
//! stub. All operations are total: transport errors and non-success responses
//! degrade to `false`/`None` (logged at debug level), never to a fatal error,
//! so one failed lookup is a check failure rather than an aborted run.

mod auth;
mod github;

pub use auth::resolve_token;
pub use github::GitHubRemote;

use async_trait::async_trait;
use std::fmt;
use url::Url;

/// An `owner/name` pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Repository owner or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Parse from a full `https://github.com/<owner>/<name>` URL or a bare
    /// `<owner>/<name>` pair.
    pub fn parse(input: &str) -> Option<RepoRef> {
        let path = if input.contains("://") {
            let url = Url::parse(input).ok()?;
            url.path().trim_matches('/').to_string()
        } else {
            input.trim_matches('/').to_string()
        };
        let mut segments = path.split('/');
        let owner = segments.next()?.to_string();
        let name = segments.next()?.trim_end_matches(".git").to_string();
        if owner.is_empty() || name.is_empty() || segments.next().is_some() {
            return None;
        }
        Some(RepoRef { owner, name })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An open pull request located by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrInfo {
    /// Pull request number
    pub number: u64,
    /// Browser URL
    pub url: String,
}

/// Read and single-shot-write access to the hosting provider's state.
#[async_trait]
pub trait RemoteState: Send + Sync {
    /// Whether `branch` exists on `repo`.
    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> bool;

    /// Whether the tag named exactly `tag` exists on `repo`. The underlying
    /// lookup may return several refs sharing the prefix; only an exact ref
    /// match counts.
    async fn tag_exists(&self, repo: &RepoRef, tag: &str) -> bool;

    /// Resolve `tag` to the commit it points at, dereferencing an annotated
    /// tag one level further.
    async fn resolve_tag_commit(&self, repo: &RepoRef, tag: &str) -> Option<String>;

    /// Whether a release page exists for `tag`.
    async fn release_page_exists(&self, repo: &RepoRef, tag: &str) -> bool;

    /// Fetch a file's text content at `git_ref`. Transport-encoding decode
    /// failures are reported as `None`, the same as a missing file.
    async fn fetch_file(&self, repo: &RepoRef, git_ref: &str, path: &str) -> Option<String>;

    /// Conditionally overwrite a file on `branch`: read the current revision
    /// marker, then write against it. Returns `false` on conflict or
    /// permission failure.
    async fn update_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> bool;

    /// Whether `commit` appears among the `scan_limit` most recent commits on
    /// `branch`. This is a deliberate bounded approximation, not a true
    /// ancestry walk: a commit merged earlier than the window is reported as
    /// not present (an accepted false negative).
    async fn is_in_recent_history(
        &self,
        repo: &RepoRef,
        commit: &str,
        branch: &str,
        scan_limit: usize,
    ) -> bool;

    /// Find an open pull request whose title matches `title` exactly.
    async fn open_pr_with_title(&self, repo: &RepoRef, title: &str) -> Option<PrInfo>;

    /// Tag names starting with `prefix`.
    async fn tags_with_prefix(&self, repo: &RepoRef, prefix: &str) -> Vec<String>;

    /// The newest tag on `repo` according to the provider's tag feed.
    async fn latest_tag(&self, repo: &RepoRef) -> Option<String>;

    /// Title of an externally hosted page, if it can be fetched and contains
    /// one.
    async fn page_title(&self, url: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_ref_from_url_and_pair() {
        let r = RepoRef::parse("https://github.com/leanprover/theorem_ai4").unwrap();
        assert_eq!(r.to_string(), "leanprover/theorem_ai4");
        let r = RepoRef::parse("leanprover-community/batteries").unwrap();
        assert_eq!(r.owner, "leanprover-community");
        assert_eq!(r.name, "batteries");
        let r = RepoRef::parse("https://github.com/leanprover/theorem_ai4.git").unwrap();
        assert_eq!(r.name, "theorem_ai4");
    }

    #[test]
    fn repo_ref_rejects_odd_shapes() {
        assert!(RepoRef::parse("justaname").is_none());
        assert!(RepoRef::parse("a/b/c").is_none());
        assert!(RepoRef::parse("https://github.com/").is_none());
    }
}
