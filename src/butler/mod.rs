//! The itch.io `butler` publishing tool.
//!
//! butler is fetched fresh on every run (no caching), extracted next to the
//! project, probed once with `-V` and then used for a single `push`.

pub mod http;

pub use http::{download, download_url, extract_zip, make_executable, verify_sha256};

use crate::channel::Destination;
use crate::error::{PublishError, Result, ToolError};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Default butler download location; `{platform}` is replaced with the platform tag
pub const DEFAULT_BUTLER_URL: &str =
    "https://broth.itch.ovh/butler/{platform}-amd64/LATEST/archive/default";

/// Name of the butler executable on this host
pub fn executable_name() -> &'static str {
    if cfg!(windows) { "butler.exe" } else { "butler" }
}

/// Where and how to fetch butler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButlerSource {
    /// URL template containing `{platform}`
    pub url_template: String,
    /// Optional pinned SHA-256 of the archive
    pub sha256: Option<String>,
}

impl Default for ButlerSource {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_BUTLER_URL.to_string(),
            sha256: None,
        }
    }
}

impl ButlerSource {
    /// Download, verify (if pinned) and extract butler for `platform_tag` into `tool_dir`.
    pub async fn acquire(&self, platform_tag: &str, tool_dir: &Path) -> Result<ButlerTool> {
        let url = download_url(&self.url_template, platform_tag)?;
        let data = download(&url).await?;

        match &self.sha256 {
            Some(expected) => {
                log::info!("Validating butler archive hash");
                verify_sha256(&data, expected).await?;
            }
            None => log::debug!("No butler hash pinned, skipping verification"),
        }

        let files = extract_zip(&data, tool_dir).await?;
        log::debug!("Extracted {} file(s) into {}", files.len(), tool_dir.display());

        let path = tool_dir.join(executable_name());
        if !path.is_file() {
            return Err(ToolError::MissingExecutable { path }.into());
        }
        make_executable(&path).await?;

        Ok(ButlerTool::new(path))
    }
}

/// An extracted butler executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButlerTool {
    path: PathBuf,
}

impl ButlerTool {
    /// Wrap an existing butler executable
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Executable path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `butler -V` to confirm the binary starts. Output is only logged.
    pub async fn probe(&self) -> Result<()> {
        let command = format!("{} -V", self.path.display());
        let output = Command::new(&self.path)
            .arg("-V")
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;

        log::debug!(
            "{}: {}{}",
            command,
            String::from_utf8_lossy(&output.stdout).trim(),
            String::from_utf8_lossy(&output.stderr).trim()
        );

        if !output.status.success() {
            return Err(ToolError::ProbeFailed {
                code: output.status.code(),
            }
            .into());
        }
        Ok(())
    }

    /// Arguments of the push invocation
    pub fn push_args(staging_dir: &Path, destination: &Destination) -> Vec<String> {
        vec![
            "push".to_string(),
            staging_dir.display().to_string(),
            destination.to_string(),
        ]
    }

    /// Human-readable push command line
    pub fn push_command_line(&self, staging_dir: &Path, destination: &Destination) -> String {
        std::iter::once(self.path.display().to_string())
            .chain(Self::push_args(staging_dir, destination))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `butler push <staging_dir> <namespace>:<channel>`
    pub async fn push(&self, staging_dir: &Path, destination: &Destination) -> Result<()> {
        let command = self.push_command_line(staging_dir, destination);
        log::info!("Running {}", command);

        let status = Command::new(&self.path)
            .args(Self::push_args(staging_dir, destination))
            .status()
            .await
            .map_err(|source| PublishError::Spawn { command, source })?;

        if !status.success() {
            return Err(PublishError::PushFailed {
                destination: destination.to_string(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Channel, OsName};

    #[test]
    fn test_push_args_shape() {
        let dest = Destination::dynamaze(Channel::Native(OsName::new("linux").unwrap()));
        let args = ButlerTool::push_args(Path::new("dist"), &dest);
        assert_eq!(args, ["push", "dist", "boringcactus/dynamaze:linux"]);
    }

    #[test]
    fn test_default_source_is_unpinned() {
        let source = ButlerSource::default();
        assert!(source.url_template.contains(http::PLATFORM_PLACEHOLDER));
        assert!(source.sha256.is_none());
    }

    #[tokio::test]
    async fn test_probe_missing_binary_fails_to_spawn() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = ButlerTool::new(tmp.path().join(executable_name()));
        let err = tool.probe().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Tool(ToolError::Spawn { .. })
        ));
    }
}
