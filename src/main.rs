//! release_checklist - release readiness verification for the theorem_ai
//! toolchain and its downstream repositories.

use release_checklist::cli;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = cli::OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));
            process::exit(2);
        }
    }
}
