//! DynaMaze Release - build, stage and push DynaMaze to itch.io.

use dynamaze_release::cli;
use dynamaze_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.eprintln("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.eprintln(&format!("    {suggestion}"));
                }
            }

            process::exit(e.exit_code());
        }
    }
}
