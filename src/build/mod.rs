//! Release build step.
//!
//! Runs the project's release build (by default `cargo build --release`) in
//! the project directory and fails the release on a non-zero exit. Output of
//! the build tool goes straight to the terminal.

use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// External command producing the release binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    args: Vec<String>,
}

impl BuildCommand {
    /// `cargo build --release`
    pub fn cargo_release() -> Self {
        Self::new("cargo", ["build", "--release"])
    }

    /// Arbitrary program and arguments
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append extra arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the build in `project_dir`, blocking until it exits.
    pub async fn run(&self, project_dir: &Path) -> Result<()> {
        let program = which::which(&self.program).map_err(|_| BuildError::ToolchainNotFound {
            program: self.program.clone(),
        })?;

        log::info!("Running {} in {}", self.display(), project_dir.display());

        let status = Command::new(&program)
            .args(&self.args)
            .current_dir(project_dir)
            .status()
            .await
            .map_err(|source| BuildError::Spawn {
                command: self.display(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::Failed {
                command: self.display(),
                code: status.code(),
            }
            .into());
        }

        log::debug!("{} finished", self.display());
        Ok(())
    }
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self::cargo_release()
    }
}

/// Path of a release binary inside `target_dir`: `<target_dir>/release/<binary><suffix>`
pub fn artifact_path(target_dir: &Path, binary: &str, suffix: &str) -> PathBuf {
    target_dir.join("release").join(format!("{binary}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cargo_release() {
        let cmd = BuildCommand::default();
        assert_eq!(cmd.program(), "cargo");
        assert_eq!(cmd.args(), ["build", "--release"]);
        assert_eq!(cmd.display(), "cargo build --release");
    }

    #[test]
    fn test_extra_args_append() {
        let cmd = BuildCommand::cargo_release().with_args(["--features", "discord"]);
        assert_eq!(cmd.display(), "cargo build --release --features discord");
    }

    #[test]
    fn test_artifact_path_appends_suffix() {
        let path = artifact_path(Path::new("target"), "dynamaze", ".exe");
        assert_eq!(path, Path::new("target/release/dynamaze.exe"));

        let path = artifact_path(Path::new("target"), "dynamaze", "");
        assert_eq!(path, Path::new("target/release/dynamaze"));
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = BuildCommand::new("definitely-not-a-real-build-tool-xyz", Vec::<String>::new());
        let err = cmd.run(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Build(BuildError::ToolchainNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_fails_with_code() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = BuildCommand::new("sh", ["-c", "exit 7"]);
        let err = cmd.run(dir.path()).await.unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = BuildCommand::new("sh", ["-c", "touch built"]);
        cmd.run(dir.path()).await.unwrap();
        assert!(dir.path().join("built").exists());
    }
}
