//! Release pipelines.
//!
//! A pipeline is a straight line of steps: (build) → stage → verify →
//! acquire butler → probe → verify → push. The staging and tool
//! directories are checked before anything runs. The first failing step ends the run with
//! nothing cleaned up, so a failed build never leaves a staging directory
//! and a failed push leaves the staged files for inspection.

use crate::build::BuildCommand;
use crate::butler::{ButlerSource, ButlerTool};
use crate::channel::{Channel, Destination, OsName};
use crate::cli::OutputManager;
use crate::error::Result;
use crate::stage::{StageManifest, StagingDir, check_clean_target, check_tool_dir};
use std::path::PathBuf;

/// Settings shared by the native and web pipelines
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Project root; relative manifest sources resolve against it
    pub project_dir: PathBuf,
    /// Staging directory
    pub dist_dir: PathBuf,
    /// Remove an existing staging directory instead of failing
    pub clean: bool,
    /// Do everything except the push
    pub dry_run: bool,
    /// itch.io `<user>/<game>`
    pub namespace: String,
    /// Where to fetch butler from
    pub butler: ButlerSource,
    /// Directory butler is extracted into
    pub tool_dir: PathBuf,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            dist_dir: PathBuf::from("dist"),
            clean: false,
            dry_run: false,
            namespace: crate::channel::DEFAULT_NAMESPACE.to_string(),
            butler: ButlerSource::default(),
            tool_dir: PathBuf::from("."),
        }
    }
}

/// Which artifact is being released
#[derive(Debug, Clone)]
pub enum ReleaseKind {
    /// Desktop build for `os`
    Native {
        /// Target OS, also the channel name
        os: OsName,
        /// Binary name without suffix
        binary: String,
        /// Cargo target directory
        target_dir: PathBuf,
        /// Build to run first; `None` stages an existing artifact
        build: Option<BuildCommand>,
    },
    /// Pre-built WebAssembly bundle
    Web {
        /// Host OS used to pick the butler download
        butler_os: OsName,
    },
}

impl ReleaseKind {
    /// Channel the release is pushed to
    pub fn channel(&self) -> Channel {
        match self {
            ReleaseKind::Native { os, .. } => Channel::Native(os.clone()),
            ReleaseKind::Web { .. } => Channel::Web,
        }
    }

    /// OS whose butler build is downloaded
    pub fn butler_os(&self) -> &OsName {
        match self {
            ReleaseKind::Native { os, .. } => os,
            ReleaseKind::Web { butler_os } => butler_os,
        }
    }
}

/// What a finished pipeline did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Channel released to
    pub channel: Channel,
    /// Full `<namespace>:<channel>` destination
    pub destination: Destination,
    /// Top-level paths placed in the staging directory
    pub staged: Vec<PathBuf>,
    /// False for dry runs
    pub pushed: bool,
}

/// A configured release run
#[derive(Debug, Clone)]
pub struct ReleasePipeline {
    config: ReleaseConfig,
    kind: ReleaseKind,
}

impl ReleasePipeline {
    /// Pipeline for an arbitrary release kind
    pub fn new(config: ReleaseConfig, kind: ReleaseKind) -> Self {
        Self { config, kind }
    }

    /// Native pipeline building with `cargo build --release`
    pub fn native(config: ReleaseConfig, os: OsName) -> Self {
        Self::new(
            config,
            ReleaseKind::Native {
                os,
                binary: "dynamaze".to_string(),
                target_dir: PathBuf::from("target"),
                build: Some(BuildCommand::cargo_release()),
            },
        )
    }

    /// Web pipeline fetching butler for the host platform
    pub fn web(config: ReleaseConfig) -> Self {
        Self::new(
            config,
            ReleaseKind::Web {
                butler_os: OsName::host(),
            },
        )
    }

    /// Settings
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Release kind
    pub fn kind(&self) -> &ReleaseKind {
        &self.kind
    }

    /// Push destination
    pub fn destination(&self) -> Destination {
        Destination::new(self.config.namespace.clone(), self.kind.channel())
    }

    /// Manifest of files to stage
    pub fn manifest(&self) -> StageManifest {
        let project_dir = &self.config.project_dir;
        match &self.kind {
            ReleaseKind::Native {
                os,
                binary,
                target_dir,
                ..
            } => StageManifest::native(project_dir, &project_dir.join(target_dir), binary, os),
            ReleaseKind::Web { .. } => StageManifest::web(project_dir),
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self, output: &OutputManager) -> Result<ReleaseOutcome> {
        let destination = self.destination();
        output.section(&format!("Releasing {}", destination));
        log::info!("Starting {} release to {}", self.kind.channel(), destination);

        let dist_dir = self.config.project_dir.join(&self.config.dist_dir);
        let tool_dir = self.config.project_dir.join(&self.config.tool_dir);
        if self.config.clean {
            check_clean_target(&dist_dir, &self.config.project_dir)?;
        }
        check_tool_dir(&dist_dir, &tool_dir)?;

        if let ReleaseKind::Native { build, .. } = &self.kind {
            match build {
                Some(build) => {
                    output.progress(&format!("Building: {}", build.display()));
                    build.run(&self.config.project_dir).await?;
                    output.success("Build complete");
                }
                None => output.verbose("Skipping build"),
            }
        }

        output.progress(&format!("Staging into {}", dist_dir.display()));
        let staging = StagingDir::create(&dist_dir, self.config.clean).await?;
        let manifest = self.manifest();
        let staged = staging.stage(&manifest).await?;
        staging.verify(&manifest).await?;
        for name in manifest.names() {
            output.indent(&name);
        }
        output.success(&format!("Staged {} entries", staged.len()));

        let butler_os = self.kind.butler_os();
        output.progress(&format!(
            "Fetching butler for {}",
            butler_os.platform_tag()
        ));
        let butler = self
            .config
            .butler
            .acquire(butler_os.platform_tag(), &tool_dir)
            .await?;
        butler.probe().await?;
        output.success(&format!("butler ready at {}", butler.path().display()));

        // nothing but the manifest may reach the push
        staging.verify(&manifest).await?;

        let pushed = self.publish(&butler, staging.path(), &destination, output).await?;

        Ok(ReleaseOutcome {
            channel: self.kind.channel(),
            destination,
            staged,
            pushed,
        })
    }

    async fn publish(
        &self,
        butler: &ButlerTool,
        staging_dir: &std::path::Path,
        destination: &Destination,
        output: &OutputManager,
    ) -> Result<bool> {
        if self.config.dry_run {
            let command = butler.push_command_line(staging_dir, destination);
            log::info!("Dry run, not running: {}", command);
            output.warn(&format!("Dry run: skipping {}", command));
            return Ok(false);
        }

        output.progress(&format!("Pushing to {}", destination));
        butler.push(staging_dir, destination).await?;
        output.success(&format!("Pushed to {}", destination));
        Ok(true)
    }
}
