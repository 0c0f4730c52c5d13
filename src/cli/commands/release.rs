//! `native` and `web` command implementation.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{ReleaseOutcome, ReleasePipeline};

/// Execute a release subcommand
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let kind = args.release_kind()?;
    let release_config = args.release_config();

    config.verbose_println(&format!(
        "Project {}, staging into {}",
        release_config.project_dir.display(),
        release_config.dist_dir.display()
    ));

    let pipeline = ReleasePipeline::new(release_config, kind);
    let outcome = pipeline.run(config.output()).await?;

    print_summary(&outcome, config);
    Ok(())
}

fn print_summary(outcome: &ReleaseOutcome, config: &RuntimeConfig) {
    if config.is_quiet() {
        return;
    }

    config.println("");
    if outcome.pushed {
        config.success_println(&format!("Released to {}", outcome.destination));
    } else {
        config.success_println(&format!(
            "Dry run complete for {} (nothing pushed)",
            outcome.destination
        ));
    }
    for path in &outcome.staged {
        config.indent(&path.display().to_string());
    }
}
