//! Full-run behavior: core preliminary checks, evaluation order, and the
//! aggregated report.

mod common;

use common::{quiet_output, repo_set, RemoteWorld, StubRemedy, StubRemote};
use release_checklist::checks::CheckStatus;
use release_checklist::runner::ReleaseGraphRunner;
use release_checklist::{ChecklistError, ConfigError};

const CORE: &str = "leanprover/theorem_ai4";

const RELEASE_CMAKE: &str = r#"
set(LEAN_VERSION_MAJOR 4)
set(LEAN_VERSION_MINOR 6)
set(LEAN_VERSION_PATCH 0)
set(LEAN_VERSION_IS_RELEASE 1)
"#;

const DEV_CMAKE: &str = r#"
set(LEAN_VERSION_MAJOR 4)
set(LEAN_VERSION_MINOR 7)
set(LEAN_VERSION_PATCH 0)
set(LEAN_VERSION_IS_RELEASE 0)
"#;

/// A core project fully ready for v4.6.0.
fn ready_core_world() -> RemoteWorld {
    let mut world = RemoteWorld::default();
    world
        .branches
        .insert((CORE.to_string(), "releases/v4.6.0".to_string()));
    world.add_file(CORE, "releases/v4.6.0", "src/CMakeLists.txt", RELEASE_CMAKE);
    world.add_file(CORE, "master", "src/CMakeLists.txt", DEV_CMAKE);
    world.tags.insert((CORE.to_string(), "v4.6.0".to_string()));
    world.tag_commits.insert(
        (CORE.to_string(), "v4.6.0".to_string()),
        "a1b2c3d4e5f6a7b8".to_string(),
    );
    world
        .releases
        .insert((CORE.to_string(), "v4.6.0".to_string()));
    world.titles.insert(
        "https://theorem-ai.org/doc/reference/latest/releases/v4.6.0/".to_string(),
        "theorem_ai 4.6.0 (2026-08-01)".to_string(),
    );
    world
}

#[tokio::test]
async fn report_covers_core_failures_and_skipped_dependents() {
    let mut world = ready_core_world();
    // batteries is one toolchain behind; aesop depends on it.
    world.add_file(
        "leanprover-community/batteries",
        "main",
        "theorem_ai-toolchain",
        "leanprover/theorem_ai4:v4.5.0",
    );
    let set = repo_set(
        r#"
        [[repositories]]
        name = "batteries"
        url = "https://github.com/leanprover-community/batteries"
        branch = "main"
        stable-branch = false
        dependencies = ["theorem_ai4"]

        [[repositories]]
        name = "aesop"
        url = "https://github.com/leanprover-community/aesop"
        branch = "master"
        stable-branch = false
        dependencies = ["batteries"]
        "#,
    );
    let remote = StubRemote::new(world);
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let report = runner.run("v4.6.0").await.unwrap();

    assert_eq!(report.status("theorem_ai4"), Some(CheckStatus::Pass));
    assert_eq!(report.status("batteries"), Some(CheckStatus::Fail));
    assert_eq!(report.status("aesop"), Some(CheckStatus::SkippedDependency));
    assert!(!report.is_success());

    let order: Vec<&str> = report.iter().map(|(name, _)| name).collect();
    assert_eq!(order, ["theorem_ai4", "batteries", "aesop"]);
}

#[tokio::test]
async fn fully_ready_release_reports_success() {
    let mut world = ready_core_world();
    world.add_file(
        "leanprover-community/batteries",
        "main",
        "theorem_ai-toolchain",
        "leanprover/theorem_ai4:v4.6.0",
    );
    world.tags.insert((
        "leanprover-community/batteries".to_string(),
        "v4.6.0".to_string(),
    ));
    let set = repo_set(
        r#"
        [[repositories]]
        name = "batteries"
        url = "https://github.com/leanprover-community/batteries"
        branch = "main"
        stable-branch = false
        dependencies = ["theorem_ai4"]
        "#,
    );
    let remote = StubRemote::new(world);
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let report = runner.run("v4.6.0").await.unwrap();

    assert!(report.is_success());
    assert_eq!(remedy.invocation_count(), 0);
}

#[tokio::test]
async fn wrong_release_notes_title_fails_the_core() {
    let mut world = ready_core_world();
    world.titles.insert(
        "https://theorem-ai.org/doc/reference/latest/releases/v4.6.0/".to_string(),
        "theorem_ai 4.5.0 (2026-05-01)".to_string(),
    );
    let set = repo_set("");
    let remote = StubRemote::new(world);
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let report = runner.run("v4.6.0").await.unwrap();

    assert_eq!(report.status("theorem_ai4"), Some(CheckStatus::Fail));
}

#[tokio::test]
async fn rc_target_checks_the_bare_version_notes_page() {
    let mut world = ready_core_world();
    world.tags.insert((CORE.to_string(), "v4.6.0-rc2".to_string()));
    world.tag_commits.insert(
        (CORE.to_string(), "v4.6.0-rc2".to_string()),
        "a1b2c3d4e5f6a7b8".to_string(),
    );
    world
        .releases
        .insert((CORE.to_string(), "v4.6.0-rc2".to_string()));
    // The notes URL drops the rc suffix; the title keeps it.
    world.titles.insert(
        "https://theorem-ai.org/doc/reference/latest/releases/v4.6.0/".to_string(),
        "theorem_ai 4.6.0-rc2 (2026-07-15)".to_string(),
    );
    let set = repo_set("");
    let remote = StubRemote::new(world);
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let report = runner.run("v4.6.0-rc2").await.unwrap();

    assert_eq!(report.status("theorem_ai4"), Some(CheckStatus::Pass));
}

#[tokio::test]
async fn numeric_short_hash_with_leading_zero_fails_the_core() {
    let mut world = ready_core_world();
    world.tag_commits.insert(
        (CORE.to_string(), "v4.6.0".to_string()),
        "0123456789abcdef".to_string(),
    );
    let set = repo_set("");
    let remote = StubRemote::new(world);
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let report = runner.run("v4.6.0").await.unwrap();

    assert_eq!(report.status("theorem_ai4"), Some(CheckStatus::Fail));
}

#[tokio::test]
async fn nightly_target_is_a_fatal_version_error() {
    let set = repo_set("");
    let remote = StubRemote::new(RemoteWorld::default());
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let result = runner.run("leanprover/theorem_ai4:nightly-2026-08-01").await;

    assert!(matches!(result, Err(ChecklistError::Version(_))));
    assert_eq!(remote.total_calls(), 0);
}

#[tokio::test]
async fn broken_dependency_graph_aborts_before_any_check() {
    let set = repo_set(
        r#"
        [[repositories]]
        name = "batteries"
        url = "https://github.com/leanprover-community/batteries"
        branch = "main"
        stable-branch = false
        dependencies = ["aesop"]

        [[repositories]]
        name = "aesop"
        url = "https://github.com/leanprover-community/aesop"
        branch = "master"
        stable-branch = false
        dependencies = ["batteries"]
        "#,
    );
    let remote = StubRemote::new(RemoteWorld::default());
    let remedy = StubRemedy::new(&remote, false);
    let output = quiet_output();
    let runner = ReleaseGraphRunner {
        set: &set,
        remote: &remote,
        remedy: &remedy,
        output: &output,
        dry_run: false,
    };

    let result = runner.run("v4.6.0").await;

    assert!(matches!(
        result,
        Err(ChecklistError::Config(ConfigError::DependencyCycle { .. }))
    ));
    assert_eq!(remote.total_calls(), 0);
}
