//! Command execution.
//!
//! Both subcommands run a [`crate::pipeline::ReleasePipeline`]; this module
//! turns the outcome into user-facing output and a process exit code.

mod release;

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

use release::execute_release;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    match execute_release(&args, &config).await {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.output().eprintln("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.output().eprintln(&format!("  • {}", suggestion));
                }
            }

            Ok(e.exit_code())
        }
    }
}
