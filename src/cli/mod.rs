//! Command line interface for release_checklist.
//!
//! Parses arguments, loads configuration, wires the remote client and the
//! remediation dispatcher into the graph runner, and maps the final report to
//! an exit code.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::checks::{CheckStatus, RunReport};
use crate::config::RepoSet;
use crate::error::Result;
use crate::remedy::ScriptRunner;
use crate::remote::{GitHubRemote, resolve_token};
use crate::runner::ReleaseGraphRunner;
use crate::version::Toolchain;

/// Main CLI entry point; returns the process exit code.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.verbose, args.quiet);

    // Nothing downstream is meaningful with an unparsable target, so this is
    // the very first fatal check.
    Toolchain::parse(&args.toolchain)?;
    let set = RepoSet::load(&args.config)?;

    let token = resolve_token(args.token.clone()).await;
    if token.is_none() {
        output.warn("No API token available; continuing unauthenticated (rate-limited)");
    }
    if args.dry_run {
        output.println("Dry-run mode: remediation is disabled");
    }

    let remote = GitHubRemote::new(token);
    let remedy = ScriptRunner::default();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: args.dry_run,
    };
    let report = runner.run(&args.toolchain).await?;

    print_summary(&output, &report);
    Ok(if report.is_success() { 0 } else { 1 })
}

/// Final summary, derived purely from the recorded status map.
fn print_summary(output: &OutputManager, report: &RunReport) {
    output.section("Summary");
    for (name, status) in report.iter() {
        match status {
            CheckStatus::Pass => output.pass(name),
            CheckStatus::Fail => output.fail(&format!("{name}: {status}")),
            CheckStatus::SkippedDependency => output.skip(&format!("{name}: {status}")),
        }
    }
    if report.is_success() {
        output.println("\nRelease is ready.");
    } else {
        output.println("\nRelease is NOT ready.");
    }
}
