//! Per-repository check pipeline.
//!
//! Runs the ordered, short-circuiting check sequence for one repository:
//! dependency gate, toolchain currency, helper-tag family (when configured),
//! release-tag presence, stable-merge status, and bump-branch readiness.
//! When a check fails and a remediation procedure exists, it is invoked at
//! most once and only the specific state query the check depends on is
//! re-executed — the pipeline never loops or polls, and never trusts a
//! remediation's exit signal over the re-observed remote state.

use crate::checks::{CheckStatus, RunReport};
use crate::cli::OutputManager;
use crate::config::{CoreProject, RepoConfig, TOOLCHAIN_FILE};
use crate::remedy::{Procedure, Remediate};
use crate::remote::{RemoteState, RepoRef};
use crate::version::{self, NIGHTLY_PREFIX, TOOLCHAIN_ORIGIN};

/// Name of the last-known-good branch in dependent repositories.
const STABLE_BRANCH: &str = "stable";

/// How many of the newest helper-package tags are inspected for a compatible
/// toolchain pin.
const HELPER_TAG_WINDOW: usize = 10;

/// Everything a pipeline needs besides the repository itself. Shared
/// read-only across all repositories of a run.
pub struct PipelineContext<'a> {
    /// The toolchain version being released
    pub target: &'a str,
    /// `next_version(target)`, computed once at run start
    pub next_version: &'a str,
    /// Core-project settings (nightly feed, scan window)
    pub core: &'a CoreProject,
    /// Remote-state accessor
    pub remote: &'a dyn RemoteState,
    /// Remediation dispatcher
    pub remedy: &'a dyn Remediate,
    /// Transcript output
    pub output: &'a OutputManager,
    /// When set, remediation is never invoked; the exact command is reported
    /// instead and the failure is final
    pub dry_run: bool,
}

/// Run the check sequence for `repo` and return its final status.
///
/// `report` carries the statuses of every repository evaluated earlier in the
/// run; it is only read here.
pub async fn run_pipeline(
    ctx: &PipelineContext<'_>,
    repo: &RepoConfig,
    report: &RunReport,
) -> CheckStatus {
    let out = ctx.output;

    // Dependency gate: anything other than PASS on a declared dependency
    // means this repository is not evaluated at all this run.
    let unready: Vec<&str> = repo
        .dependencies
        .iter()
        .filter(|dep| report.status(dep) != Some(CheckStatus::Pass))
        .map(String::as_str)
        .collect();
    if !unready.is_empty() {
        out.skip(&format!("Dependencies not ready: {}", unready.join(", ")));
        return CheckStatus::SkippedDependency;
    }

    let origin = repo.repo_ref();

    if check_toolchain_currency(ctx, repo, &origin).await == CheckStatus::Fail {
        return CheckStatus::Fail;
    }

    if let Some(prefix) = &repo.helper_tag_prefix
        && check_helper_tags(ctx, &origin, prefix).await == CheckStatus::Fail
    {
        return CheckStatus::Fail;
    }

    if repo.toolchain_tag && check_release_tag(ctx, repo, &origin).await == CheckStatus::Fail {
        return CheckStatus::Fail;
    }

    if repo.stable_branch
        && !version::is_release_candidate(ctx.target)
        && check_stable_merge(ctx, &origin).await == CheckStatus::Fail
    {
        return CheckStatus::Fail;
    }

    if repo.bump_branch && check_bump_branch(ctx, repo, &origin).await == CheckStatus::Fail {
        return CheckStatus::Fail;
    }

    CheckStatus::Pass
}

/// The branch's pinned toolchain must satisfy "at least the target". An open
/// bump PR is reported either way but does not satisfy the check — only a
/// merge would.
async fn check_toolchain_currency(
    ctx: &PipelineContext<'_>,
    repo: &RepoConfig,
    origin: &RepoRef,
) -> CheckStatus {
    let out = ctx.output;
    let pin = match ctx
        .remote
        .fetch_file(origin, &repo.branch, TOOLCHAIN_FILE)
        .await
    {
        Some(pin) => pin,
        None => {
            out.fail(&format!(
                "No {TOOLCHAIN_FILE} file found in {} branch",
                repo.branch
            ));
            return CheckStatus::Fail;
        }
    };

    match version::is_at_least(&pin, ctx.target) {
        Ok(true) => {
            out.pass(&format!("On compatible toolchain (>= {})", ctx.target));
            CheckStatus::Pass
        }
        Ok(false) => {
            out.fail(&format!(
                "Not on target toolchain (needs >= {}, but {} is on {pin})",
                ctx.target, repo.branch
            ));
            let title = format!("chore: bump toolchain to {}", ctx.target);
            match ctx.remote.open_pr_with_title(origin, &title).await {
                Some(pr) => {
                    out.pass(&format!(
                        "PR with title '{title}' exists: #{} ({})",
                        pr.number, pr.url
                    ));
                }
                None => {
                    out.fail(&format!("PR with title '{title}' does not exist"));
                }
            }
            CheckStatus::Fail
        }
        Err(_) => {
            out.fail(&format!(
                "Unparsable toolchain pin in {} branch: {pin}",
                repo.branch
            ));
            CheckStatus::Fail
        }
    }
}

/// Newest helper-package release tags must include one whose pinned toolchain
/// satisfies the target.
async fn check_helper_tags(
    ctx: &PipelineContext<'_>,
    origin: &RepoRef,
    prefix: &str,
) -> CheckStatus {
    let out = ctx.output;
    let mut numbered: Vec<(u64, String)> = ctx
        .remote
        .tags_with_prefix(origin, prefix)
        .await
        .into_iter()
        .filter_map(|tag| {
            let n = tag.strip_prefix(prefix)?.parse::<u64>().ok()?;
            Some((n, tag))
        })
        .collect();
    if numbered.is_empty() {
        out.fail(&format!("No {prefix}* tags found"));
        return CheckStatus::Fail;
    }

    numbered.sort_unstable_by(|a, b| b.cmp(a));
    for (_, tag) in numbered.iter().take(HELPER_TAG_WINDOW) {
        if let Some(pin) = ctx.remote.fetch_file(origin, tag, TOOLCHAIN_FILE).await
            && version::is_at_least(&pin, ctx.target).unwrap_or(false)
        {
            out.pass(&format!(
                "Found release {tag} using compatible toolchain (>= {})",
                ctx.target
            ));
            return CheckStatus::Pass;
        }
    }

    let next = numbered[0].0 + 1;
    out.fail(&format!(
        "No recent release uses toolchain >= {}",
        ctx.target
    ));
    out.indent(&format!(
        "You will need to create and push a tag {prefix}{next}"
    ));
    CheckStatus::Fail
}

/// The release tag must exist; remediated once by the tag-push procedure.
async fn check_release_tag(
    ctx: &PipelineContext<'_>,
    repo: &RepoConfig,
    origin: &RepoRef,
) -> CheckStatus {
    let out = ctx.output;
    if !ctx.remote.tag_exists(origin, ctx.target).await {
        let procedure = Procedure::PushReleaseTag {
            repo: origin.clone(),
            branch: repo.branch.clone(),
            version: ctx.target.to_string(),
        };
        if ctx.dry_run {
            out.fail(&format!("Tag {} does not exist", ctx.target));
            out.indent(&format!("Run `{}` to create it", procedure.command_line()));
            return CheckStatus::Fail;
        }
        out.action(&format!(
            "Tag {} does not exist; running `{}`...",
            ctx.target,
            procedure.command_line()
        ));
        let reported_ok = ctx.remedy.invoke(&procedure).await;
        out.verbose(&format!("remediation reported success: {reported_ok}"));
        // Accept only the re-observed state, never the exit signal alone.
        if !ctx.remote.tag_exists(origin, ctx.target).await {
            out.fail(&format!(
                "Tag {} still does not exist; manual intervention required",
                ctx.target
            ));
            return CheckStatus::Fail;
        }
    }
    out.pass(&format!("Tag {} exists", ctx.target));
    CheckStatus::Pass
}

/// The release tag's commit must appear in the stable branch's recent
/// history; remediated once by the merge procedure. The history scan is a
/// bounded window, so an old merge can be reported as missing.
async fn check_stable_merge(ctx: &PipelineContext<'_>, origin: &RepoRef) -> CheckStatus {
    let out = ctx.output;
    if !merged_into_stable(ctx, origin).await {
        let procedure = Procedure::MergeIntoStable {
            repo: origin.clone(),
            stable_branch: STABLE_BRANCH.to_string(),
            version: ctx.target.to_string(),
        };
        if ctx.dry_run {
            out.fail(&format!(
                "Tag {} is not merged into {STABLE_BRANCH}",
                ctx.target
            ));
            out.indent(&format!("Run `{}` to merge it", procedure.command_line()));
            return CheckStatus::Fail;
        }
        out.action(&format!(
            "Tag {} is not merged into {STABLE_BRANCH}; running `{}`...",
            ctx.target,
            procedure.command_line()
        ));
        let reported_ok = ctx.remedy.invoke(&procedure).await;
        out.verbose(&format!("remediation reported success: {reported_ok}"));
        if !merged_into_stable(ctx, origin).await {
            out.fail(&format!(
                "Tag {} is still not merged into {STABLE_BRANCH}; manual intervention required",
                ctx.target
            ));
            return CheckStatus::Fail;
        }
    }
    out.pass(&format!("Tag {} is merged into {STABLE_BRANCH}", ctx.target));
    CheckStatus::Pass
}

async fn merged_into_stable(ctx: &PipelineContext<'_>, origin: &RepoRef) -> bool {
    match ctx.remote.resolve_tag_commit(origin, ctx.target).await {
        Some(commit) => {
            ctx.remote
                .is_in_recent_history(origin, &commit, STABLE_BRANCH, ctx.core.scan_limit)
                .await
        }
        None => false,
    }
}

/// The `bump/<next_version>` branch must exist (created from the source
/// branch's tip when missing, possibly on an alternate remote), freshly
/// created branches may get their pin set to the newest nightly, and the
/// resulting pin must name either a nightly or the next version.
async fn check_bump_branch(
    ctx: &PipelineContext<'_>,
    repo: &RepoConfig,
    origin: &RepoRef,
) -> CheckStatus {
    let out = ctx.output;
    let bump_branch = format!("bump/{}", ctx.next_version);
    let bump_repo = repo.bump_repo_ref();

    let mut branch_created = false;
    if !ctx.remote.branch_exists(&bump_repo, &bump_branch).await {
        let procedure = Procedure::CreateRef {
            repo: bump_repo.clone(),
            ref_name: bump_branch.clone(),
            source: Procedure::branch_tip_expr(origin, &repo.branch),
        };
        if ctx.dry_run {
            out.fail(&format!("Bump branch {bump_branch} does not exist"));
            let nightly_note = match nightly_pin_content(ctx, repo).await {
                Some(pin) => format!(" (will set {TOOLCHAIN_FILE} to {pin})"),
                None => String::new(),
            };
            out.indent(&format!(
                "Run `{}` to create it{nightly_note}",
                procedure.command_line()
            ));
            return CheckStatus::Fail;
        }
        out.action(&format!(
            "Bump branch {bump_branch} does not exist; creating it..."
        ));
        if !ctx.remedy.invoke(&procedure).await {
            out.fail(&format!("Failed to create bump branch {bump_branch}"));
            return CheckStatus::Fail;
        }
        if !ctx.remote.branch_exists(&bump_repo, &bump_branch).await {
            out.fail(&format!(
                "Bump branch {bump_branch} still does not exist after creation"
            ));
            return CheckStatus::Fail;
        }
        branch_created = true;
    }
    out.pass(&format!("Bump branch {bump_branch} exists"));

    // Freshly created branches in nightly-pinned repositories start the next
    // cycle on the newest nightly. A feed or write failure is a hard FAIL
    // with no further retry.
    if branch_created && repo.nightly_pin {
        let pin = match nightly_pin_content(ctx, repo).await {
            Some(pin) => pin,
            None => {
                out.fail("Could not fetch latest nightly tag");
                return CheckStatus::Fail;
            }
        };
        out.action(&format!("Updating {TOOLCHAIN_FILE} to {pin}..."));
        let message = format!("chore: update {TOOLCHAIN_FILE} to {pin}");
        if !ctx
            .remote
            .update_file(&bump_repo, &bump_branch, TOOLCHAIN_FILE, &pin, &message)
            .await
        {
            out.fail(&format!("Failed to update {TOOLCHAIN_FILE} to {pin}"));
            return CheckStatus::Fail;
        }
        out.pass(&format!("Updated {TOOLCHAIN_FILE} to {pin}"));
    }

    let content = match ctx
        .remote
        .fetch_file(&bump_repo, &bump_branch, TOOLCHAIN_FILE)
        .await
    {
        Some(content) => content,
        None => {
            out.fail(&format!(
                "No {TOOLCHAIN_FILE} file found in {bump_branch} branch"
            ));
            return CheckStatus::Fail;
        }
    };
    let next_pin = format!("{TOOLCHAIN_ORIGIN}:{}", ctx.next_version);
    if content.starts_with(NIGHTLY_PREFIX) || content.starts_with(&next_pin) {
        out.pass(&format!("Bump branch correctly uses toolchain: {content}"));
        CheckStatus::Pass
    } else {
        out.fail(&format!(
            "Bump branch toolchain should use either nightly or {}, but found: {content}",
            ctx.next_version
        ));
        CheckStatus::Fail
    }
}

/// The pin a fresh bump branch would receive, from the nightly feed's newest
/// tag. `None` when the repository does not participate or the feed fails.
async fn nightly_pin_content(ctx: &PipelineContext<'_>, repo: &RepoConfig) -> Option<String> {
    if !repo.nightly_pin {
        return None;
    }
    let feed = ctx.core.nightly_repo_ref()?;
    let latest = ctx.remote.latest_tag(&feed).await?;
    Some(format!("{TOOLCHAIN_ORIGIN}:{latest}"))
}
