//! Bearer-token resolution for the hosting provider.
//!
//! Authentication is optional: without a token the API still works, just with
//! aggressive rate limits. The token comes from an explicit flag or
//! environment variable when given, otherwise from the local `gh` credential
//! helper. A missing helper degrades to unauthenticated access.

use log::{debug, warn};
use tokio::process::Command;

/// Resolve a bearer token: an explicit value wins, then the `gh auth token`
/// helper. Returns `None` when neither is available.
pub async fn resolve_token(explicit: Option<String>) -> Option<String> {
    if let Some(token) = explicit
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }
    token_from_helper().await
}

async fn token_from_helper() -> Option<String> {
    let gh = match which::which("gh") {
        Ok(path) => path,
        Err(_) => {
            warn!("'gh' CLI not found; API calls may be rate-limited");
            return None;
        }
    };

    let output = match Command::new(gh).args(["auth", "token"]).output().await {
        Ok(output) => output,
        Err(e) => {
            debug!("failed to run gh auth token: {e}");
            return None;
        }
    };
    if !output.status.success() {
        debug!("gh auth token exited with {}", output.status);
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
