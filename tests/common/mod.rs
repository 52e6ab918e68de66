//! Shared test doubles: an in-memory remote and a counting remediation stub.

#![allow(dead_code)] // Each test binary uses a subset of the helpers

use async_trait::async_trait;
use release_checklist::cli::OutputManager;
use release_checklist::remedy::{Procedure, Remediate};
use release_checklist::remote::{PrInfo, RemoteState, RepoRef};
use release_checklist::RepoSet;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Key = (String, String);

fn key(repo: &RepoRef, rest: &str) -> Key {
    (repo.to_string(), rest.to_string())
}

/// The remote state a test sets up, shared between the stub client and the
/// stub dispatcher so successful remediation is observable on re-query.
#[derive(Default)]
pub struct RemoteWorld {
    pub branches: HashSet<Key>,
    pub tags: HashSet<Key>,
    pub tag_commits: HashMap<Key, String>,
    pub releases: HashSet<Key>,
    /// (repo, git ref, path) -> content
    pub files: HashMap<(String, String, String), String>,
    /// (repo, branch) -> recent commits, newest first
    pub recent: HashMap<Key, Vec<String>>,
    /// (repo, title) -> open PR
    pub prs: HashMap<Key, PrInfo>,
    /// repo -> tag names, newest first
    pub tag_feed: HashMap<String, Vec<String>>,
    /// url -> page title
    pub titles: HashMap<String, String>,
}

impl RemoteWorld {
    pub fn add_file(&mut self, repo: &str, git_ref: &str, path: &str, content: &str) {
        self.files.insert(
            (repo.to_string(), git_ref.to_string(), path.to_string()),
            content.to_string(),
        );
    }
}

/// Call counters, so tests can assert what was (not) queried.
#[derive(Default)]
pub struct Calls {
    pub total: AtomicUsize,
    pub tag_exists: AtomicUsize,
    pub updates: AtomicUsize,
    pub pr_titles: Mutex<Vec<String>>,
}

/// In-memory [`RemoteState`] backed by a [`RemoteWorld`].
pub struct StubRemote {
    pub world: Arc<Mutex<RemoteWorld>>,
    pub calls: Calls,
    /// When set, every `update_file` reports failure
    pub fail_updates: bool,
}

impl StubRemote {
    pub fn new(world: RemoteWorld) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            calls: Calls::default(),
            fail_updates: false,
        }
    }

    pub fn total_calls(&self) -> usize {
        self.calls.total.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteState for StubRemote {
    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> bool {
        self.count();
        self.world.lock().unwrap().branches.contains(&key(repo, branch))
    }

    async fn tag_exists(&self, repo: &RepoRef, tag: &str) -> bool {
        self.count();
        self.calls.tag_exists.fetch_add(1, Ordering::SeqCst);
        self.world.lock().unwrap().tags.contains(&key(repo, tag))
    }

    async fn resolve_tag_commit(&self, repo: &RepoRef, tag: &str) -> Option<String> {
        self.count();
        self.world.lock().unwrap().tag_commits.get(&key(repo, tag)).cloned()
    }

    async fn release_page_exists(&self, repo: &RepoRef, tag: &str) -> bool {
        self.count();
        self.world.lock().unwrap().releases.contains(&key(repo, tag))
    }

    async fn fetch_file(&self, repo: &RepoRef, git_ref: &str, path: &str) -> Option<String> {
        self.count();
        self.world
            .lock()
            .unwrap()
            .files
            .get(&(repo.to_string(), git_ref.to_string(), path.to_string()))
            .cloned()
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &str,
        _message: &str,
    ) -> bool {
        self.count();
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates {
            return false;
        }
        self.world.lock().unwrap().add_file(&repo.to_string(), branch, path, content);
        true
    }

    async fn is_in_recent_history(
        &self,
        repo: &RepoRef,
        commit: &str,
        branch: &str,
        scan_limit: usize,
    ) -> bool {
        self.count();
        self.world
            .lock()
            .unwrap()
            .recent
            .get(&key(repo, branch))
            .is_some_and(|commits| commits.iter().take(scan_limit).any(|c| c == commit))
    }

    async fn open_pr_with_title(&self, repo: &RepoRef, title: &str) -> Option<PrInfo> {
        self.count();
        self.calls.pr_titles.lock().unwrap().push(title.to_string());
        self.world.lock().unwrap().prs.get(&key(repo, title)).cloned()
    }

    async fn tags_with_prefix(&self, repo: &RepoRef, prefix: &str) -> Vec<String> {
        self.count();
        self.world
            .lock()
            .unwrap()
            .tag_feed
            .get(&repo.to_string())
            .map(|tags| {
                tags.iter()
                    .filter(|t| t.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn latest_tag(&self, repo: &RepoRef) -> Option<String> {
        self.count();
        self.world
            .lock()
            .unwrap()
            .tag_feed
            .get(&repo.to_string())
            .and_then(|tags| tags.first().cloned())
    }

    async fn page_title(&self, url: &str) -> Option<String> {
        self.count();
        self.world.lock().unwrap().titles.get(url).cloned()
    }
}

/// Counting [`Remediate`] stub. When `succeed` is set, invoking a procedure
/// also applies its effect to the shared world so the pipeline's re-query
/// observes it.
pub struct StubRemedy {
    pub world: Arc<Mutex<RemoteWorld>>,
    pub succeed: bool,
    pub invocations: Mutex<Vec<Procedure>>,
}

impl StubRemedy {
    pub fn new(remote: &StubRemote, succeed: bool) -> Self {
        Self {
            world: Arc::clone(&remote.world),
            succeed,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

#[async_trait]
impl Remediate for StubRemedy {
    async fn invoke(&self, procedure: &Procedure) -> bool {
        self.invocations.lock().unwrap().push(procedure.clone());
        if !self.succeed {
            return false;
        }
        let mut world = self.world.lock().unwrap();
        match procedure {
            Procedure::PushReleaseTag { repo, version, .. } => {
                world.tags.insert((repo.to_string(), version.clone()));
            }
            Procedure::MergeIntoStable {
                repo,
                stable_branch,
                version,
            } => {
                if let Some(commit) = world
                    .tag_commits
                    .get(&(repo.to_string(), version.clone()))
                    .cloned()
                {
                    world
                        .recent
                        .entry((repo.to_string(), stable_branch.clone()))
                        .or_default()
                        .push(commit);
                }
            }
            Procedure::CreateRef { repo, ref_name, .. } => {
                world.branches.insert((repo.to_string(), ref_name.clone()));
            }
        }
        true
    }
}

/// Quiet output so test transcripts stay silent.
pub fn quiet_output() -> OutputManager {
    OutputManager::new(false, true)
}

/// A repository set with the standard core project plus the given
/// `[[repositories]]` entries.
pub fn repo_set(repositories: &str) -> RepoSet {
    let content = format!(
        r#"
        [core]
        name = "theorem_ai4"
        url = "https://github.com/leanprover/theorem_ai4"
        {repositories}
        "#
    );
    RepoSet::parse_str(&content).expect("test configuration must be valid")
}
