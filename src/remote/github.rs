//! GitHub-backed implementation of [`RemoteState`].
//!
//! Thin wrapper over the REST API. Every method swallows transport errors and
//! non-success statuses into `false`/`None` per the client contract; details
//! go to the debug log.

use super::{PrInfo, RemoteState, RepoRef};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use reqwest::StatusCode;
use serde_json::{Value, json};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("release_checklist/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client implementing the remote-state contract.
pub struct GitHubRemote {
    http: reqwest::Client,
    token: Option<String>,
    api_base: String,
}

impl GitHubRemote {
    /// Create a client, optionally authenticated with a bearer token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            api_base: API_BASE.to_string(),
        }
    }

    /// Override the API base URL (used against a local test server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn repo_url(&self, repo: &RepoRef, rest: &str) -> String {
        format!("{}/repos/{}/{}", self.api_base, repo, rest)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// GET a JSON document; any failure is `None`.
    async fn get_json(&self, url: &str) -> Option<Value> {
        let response = match self.request(reqwest::Method::GET, url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("GET {url} failed: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("GET {url} returned {}", response.status());
            return None;
        }
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("GET {url} returned unparsable JSON: {e}");
                None
            }
        }
    }

    /// GET returning only whether the resource exists.
    async fn probe(&self, url: &str) -> bool {
        match self.request(reqwest::Method::GET, url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("GET {url} failed: {e}");
                false
            }
        }
    }

    /// Refs matching `refs/tags/<prefix>` (the API matches by prefix).
    async fn matching_tag_refs(&self, repo: &RepoRef, prefix: &str) -> Vec<Value> {
        let url = self.repo_url(repo, &format!("git/matching-refs/tags/{prefix}"));
        match self.get_json(&url).await {
            Some(Value::Array(refs)) => refs,
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl RemoteState for GitHubRemote {
    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> bool {
        self.probe(&self.repo_url(repo, &format!("branches/{branch}")))
            .await
    }

    async fn tag_exists(&self, repo: &RepoRef, tag: &str) -> bool {
        let expected = format!("refs/tags/{tag}");
        self.matching_tag_refs(repo, tag)
            .await
            .iter()
            .any(|r| r["ref"].as_str() == Some(expected.as_str()))
    }

    async fn resolve_tag_commit(&self, repo: &RepoRef, tag: &str) -> Option<String> {
        let expected = format!("refs/tags/{tag}");
        let refs = self.matching_tag_refs(repo, tag).await;
        let entry = refs
            .iter()
            .find(|r| r["ref"].as_str() == Some(expected.as_str()))?;
        let sha = entry["object"]["sha"].as_str()?.to_string();

        // An annotated tag points at a tag object; dereference one level to
        // reach the commit.
        if entry["object"]["type"].as_str() == Some("tag") {
            let url = self.repo_url(repo, &format!("git/tags/{sha}"));
            if let Some(tag_obj) = self.get_json(&url).await
                && tag_obj["object"]["type"].as_str() == Some("commit")
                && let Some(commit) = tag_obj["object"]["sha"].as_str()
            {
                return Some(commit.to_string());
            }
        }
        Some(sha)
    }

    async fn release_page_exists(&self, repo: &RepoRef, tag: &str) -> bool {
        self.probe(&self.repo_url(repo, &format!("releases/tags/{tag}")))
            .await
    }

    async fn fetch_file(&self, repo: &RepoRef, git_ref: &str, path: &str) -> Option<String> {
        let url = self.repo_url(repo, &format!("contents/{path}?ref={git_ref}"));
        let body = self.get_json(&url).await?;
        let encoded: String = body["content"].as_str()?.chars().filter(|c| *c != '\n').collect();
        let bytes = BASE64.decode(encoded).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        Some(text.trim().to_string())
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> bool {
        // Conditional write: fetch the current blob sha first, then PUT
        // against it. A concurrent update invalidates the sha and the write
        // reports failure.
        let url = self.repo_url(repo, &format!("contents/{path}"));
        let current = match self.get_json(&format!("{url}?ref={branch}")).await {
            Some(body) => body,
            None => return false,
        };
        let sha = match current["sha"].as_str() {
            Some(sha) => sha,
            None => return false,
        };

        let payload = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "sha": sha,
            "branch": branch,
        });
        match self
            .request(reqwest::Method::PUT, &url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => {
                let ok = matches!(response.status(), StatusCode::OK | StatusCode::CREATED);
                if !ok {
                    debug!("PUT {url} returned {}", response.status());
                }
                ok
            }
            Err(e) => {
                debug!("PUT {url} failed: {e}");
                false
            }
        }
    }

    async fn is_in_recent_history(
        &self,
        repo: &RepoRef,
        commit: &str,
        branch: &str,
        scan_limit: usize,
    ) -> bool {
        let url = self.repo_url(repo, &format!("commits?sha={branch}&per_page={scan_limit}"));
        match self.get_json(&url).await {
            Some(Value::Array(commits)) => commits
                .iter()
                .any(|c| c["sha"].as_str() == Some(commit)),
            _ => false,
        }
    }

    async fn open_pr_with_title(&self, repo: &RepoRef, title: &str) -> Option<PrInfo> {
        let url = self.repo_url(repo, "pulls?state=open");
        let pulls = match self.get_json(&url).await? {
            Value::Array(pulls) => pulls,
            _ => return None,
        };
        pulls
            .iter()
            .find(|pr| pr["title"].as_str() == Some(title))
            .and_then(|pr| {
                Some(PrInfo {
                    number: pr["number"].as_u64()?,
                    url: pr["html_url"].as_str()?.to_string(),
                })
            })
    }

    async fn tags_with_prefix(&self, repo: &RepoRef, prefix: &str) -> Vec<String> {
        self.matching_tag_refs(repo, prefix)
            .await
            .iter()
            .filter_map(|r| r["ref"].as_str())
            .filter_map(|r| r.strip_prefix("refs/tags/"))
            .map(str::to_string)
            .collect()
    }

    async fn latest_tag(&self, repo: &RepoRef) -> Option<String> {
        let url = self.repo_url(repo, "tags");
        match self.get_json(&url).await? {
            Value::Array(tags) => tags
                .first()
                .and_then(|t| t["name"].as_str())
                .map(str::to_string),
            _ => None,
        }
    }

    async fn page_title(&self, url: &str) -> Option<String> {
        let response = match self.request(reqwest::Method::GET, url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("GET {url} failed: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("GET {url} returned {}", response.status());
            return None;
        }
        let html = response.text().await.ok()?;
        extract_title(&html)
    }
}

fn extract_title(html: &str) -> Option<String> {
    let re = regex::Regex::new(r"(?is)<title>(.*?)</title>").ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}
