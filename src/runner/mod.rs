//! Release graph runner.
//!
//! Validates the declared evaluation order against the dependency graph, runs
//! the preliminary core-project checks, drives each repository's pipeline in
//! strict sequence, and finishes with the advisory dev-cycle check. All
//! statuses accumulate in a [`RunReport`] returned by value; exit behavior
//! belongs to the CLI layer.

pub mod build_config;

use crate::checks::{CheckStatus, RunReport};
use crate::cli::OutputManager;
use crate::config::RepoSet;
use crate::error::{ConfigError, Result, VersionError};
use crate::pipeline::{PipelineContext, run_pipeline};
use crate::remedy::Remediate;
use crate::remote::RemoteState;
use crate::version::{self, Toolchain};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

// Downstream tooling abbreviates the release commit to this many characters.
const SHORT_HASH_LENGTH: usize = 7;

/// Orders repositories by declared dependencies, runs each pipeline, and
/// aggregates the final pass/fail report.
pub struct ReleaseGraphRunner<'a> {
    /// Validated configuration
    pub set: &'a RepoSet,
    /// Remote-state accessor shared by every check
    pub remote: &'a dyn RemoteState,
    /// Remediation dispatcher
    pub remedy: &'a dyn Remediate,
    /// Transcript output
    pub output: &'a OutputManager,
    /// Disables all remediation invocations
    pub dry_run: bool,
}

impl ReleaseGraphRunner<'_> {
    /// Run the full verification for `target` and return the status report.
    ///
    /// Fatal only on an unparsable target or a broken dependency graph; every
    /// per-repository failure is recorded and evaluation continues so the
    /// report is always complete.
    pub async fn run(&self, target: &str) -> Result<RunReport> {
        let parsed = Toolchain::parse(target)?;
        let (major, minor) = parsed.major_minor().ok_or_else(|| {
            VersionError::malformed(target, "a nightly toolchain cannot be a release target")
        })?;
        let next_version = version::next_version(target)?;
        validate_graph(self.set)?;

        let mut report = RunReport::new();

        self.output.section("Preliminary checks");
        let core_ok = self.core_preliminary_checks(target, major, minor).await;
        self.report_status(&mut report, &self.set.core.name, core_ok);

        let ctx = PipelineContext {
            target,
            next_version: &next_version,
            core: &self.set.core,
            remote: self.remote,
            remedy: self.remedy,
            output: self.output,
            dry_run: self.dry_run,
        };
        for repo in &self.set.repositories {
            self.output.section(&format!("Repository: {}", repo.name));
            let status = run_pipeline(&ctx, repo, &report).await;
            report.record(&repo.name, status);
        }

        self.dev_cycle_advisory(minor + 1).await;
        Ok(report)
    }

    fn report_status(&self, report: &mut RunReport, name: &str, ok: bool) {
        report.record(
            name,
            if ok { CheckStatus::Pass } else { CheckStatus::Fail },
        );
    }

    /// Checks on the core project itself, recorded under the reserved
    /// pseudo-repository name so downstream repositories can depend on it.
    async fn core_preliminary_checks(&self, target: &str, major: u32, minor: u32) -> bool {
        let core = &self.set.core;
        let repo = core.repo_ref();
        let out = self.output;
        let mut ok = true;

        let release_branch = format!("releases/v{major}.{minor}.0");
        if !self.remote.branch_exists(&repo, &release_branch).await {
            out.fail(&format!("Branch {release_branch} does not exist"));
            out.indent("After creating the branch, its build configuration also needs checking");
            ok = false;
        } else {
            out.pass(&format!("Branch {release_branch} exists"));
            ok &= self
                .check_release_build_config(&release_branch, major, minor)
                .await;
        }

        if !self.remote.tag_exists(&repo, target).await {
            out.fail(&format!("Tag {target} does not exist"));
            ok = false;
        } else {
            out.pass(&format!("Tag {target} exists"));
            match self.remote.resolve_tag_commit(&repo, target).await {
                None => {
                    out.fail(&format!("Could not resolve tag {target} to a commit"));
                    ok = false;
                }
                Some(commit) => {
                    let short: String = commit.chars().take(SHORT_HASH_LENGTH).collect();
                    if short.starts_with('0') && short.chars().all(|c| c.is_ascii_digit()) {
                        out.fail(&format!(
                            "Short commit hash {short} is numeric and starts with 0, which \
                             breaks downstream version parsing; regenerate the last commit \
                             to get a new hash"
                        ));
                        ok = false;
                    }
                }
            }
        }

        if !self.remote.release_page_exists(&repo, target).await {
            out.fail(&format!("Release page for {target} does not exist"));
            ok = false;
        } else {
            out.pass(&format!("Release page for {target} exists"));
        }

        // Release notes live outside the hosting provider; the page title
        // must carry the product and full version (including any rc suffix).
        let notes_url = format!(
            "{}/{}/",
            core.release_notes_base.trim_end_matches('/'),
            version::strip_rc(target)
        );
        let expected_prefix = format!(
            "{} {}",
            core.product_name,
            target.trim_start_matches('v')
        );
        match self.remote.page_title(&notes_url).await {
            None => {
                out.fail(&format!("Could not fetch release notes from {notes_url}"));
                ok = false;
            }
            Some(title) if !title.starts_with(&expected_prefix) => {
                out.fail(&format!(
                    "Release notes page title mismatch: expected prefix \
                     '{expected_prefix}', got '{title}' (check {notes_url})"
                ));
                ok = false;
            }
            Some(title) => {
                out.pass(&format!("Release notes page title looks good ('{title}')"));
            }
        }

        ok
    }

    async fn check_release_build_config(
        &self,
        release_branch: &str,
        major: u32,
        minor: u32,
    ) -> bool {
        let core = &self.set.core;
        let out = self.output;
        let content = match self
            .remote
            .fetch_file(&core.repo_ref(), release_branch, &core.build_config_path)
            .await
        {
            Some(content) => content,
            None => {
                out.fail(&format!(
                    "Could not retrieve {} from {release_branch}",
                    core.build_config_path
                ));
                return false;
            }
        };

        let expected = [
            (build_config::FIELD_MAJOR, major.to_string()),
            (build_config::FIELD_MINOR, minor.to_string()),
            (build_config::FIELD_PATCH, "0".to_string()),
            (build_config::FIELD_IS_RELEASE, "1".to_string()),
        ];
        let mut ok = true;
        for (field, value) in &expected {
            if !build_config::has_setting(&content, field, value) {
                out.fail(&format!(
                    "Missing or incorrect line in {}: set({field} {value})",
                    core.build_config_path
                ));
                ok = false;
            }
        }
        if ok {
            out.pass(&format!(
                "Build configuration version settings are correct in {}",
                core.build_config_path
            ));
        }
        ok
    }

    /// Advisory check on the core development branch: it must already be
    /// configured for the next cycle. Reported only — no status changes.
    async fn dev_cycle_advisory(&self, next_minor: u32) {
        let core = &self.set.core;
        let out = self.output;
        out.section(&format!(
            "Next development cycle on {} (advisory)",
            core.dev_branch
        ));
        let content = match self
            .remote
            .fetch_file(&core.repo_ref(), &core.dev_branch, &core.build_config_path)
            .await
        {
            Some(content) => content,
            None => {
                out.fail(&format!(
                    "Could not retrieve {} from {}",
                    core.build_config_path, core.dev_branch
                ));
                return;
            }
        };

        let minor_ok = build_config::setting_value(&content, build_config::FIELD_MINOR)
            .is_some_and(|m| m >= next_minor);
        let dev_marked = build_config::has_setting(&content, build_config::FIELD_IS_RELEASE, "0");
        if minor_ok && dev_marked {
            out.pass(&format!(
                "{} {} branch is configured for the next development cycle",
                core.name, core.dev_branch
            ));
        } else {
            out.fail(&format!("{} needs a \"begin dev cycle\" PR", core.name));
        }
    }
}

/// Validate the dependency graph: no cycles, and the fixed declared order
/// satisfies every dependency (the core pseudo-repository is evaluated first
/// and may always be depended on).
pub fn validate_graph(set: &RepoSet) -> Result<()> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut nodes = HashMap::new();
    let core_name = set.core.name.as_str();
    nodes.insert(core_name, graph.add_node(core_name));
    for repo in &set.repositories {
        nodes.insert(repo.name.as_str(), graph.add_node(repo.name.as_str()));
    }
    for repo in &set.repositories {
        for dep in &repo.dependencies {
            // Unknown names were already rejected at load time.
            if let (Some(&from), Some(&to)) =
                (nodes.get(dep.as_str()), nodes.get(repo.name.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .iter()
                .any(|&n| graph.find_edge(n, n).is_some());
        if cyclic {
            let mut repositories: Vec<String> =
                component.iter().map(|&n| graph[n].to_string()).collect();
            repositories.sort();
            return Err(ConfigError::DependencyCycle { repositories }.into());
        }
    }

    for (index, repo) in set.repositories.iter().enumerate() {
        for dep in &repo.dependencies {
            let satisfied = dep == core_name
                || set.repositories[..index].iter().any(|r| &r.name == dep);
            if !satisfied {
                return Err(ConfigError::DependencyOrder {
                    repository: repo.name.clone(),
                    dependency: dep.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}
