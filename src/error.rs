//! Error types for dynamaze_release operations.
//!
//! Every step of a release pipeline has its own error enum; all of them fold
//! into [`ReleaseError`], which also knows how to suggest a fix and which
//! process exit code to report.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dynamaze_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all dynamaze_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Release build errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Staging directory errors
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Publishing tool acquisition errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Push errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// File system error with path context.
    ///
    /// Created by [`ErrorExt::fs_context`].
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// Operation being performed (e.g. "creating staging directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Release build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Build program could not be located on PATH
    #[error("Build program '{program}' not found on PATH")]
    ToolchainNotFound {
        /// Program name
        program: String,
    },

    /// Build program could not be started
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// Build program exited unsuccessfully
    #[error("'{command}' exited with {}", describe_code(.code))]
    Failed {
        /// Command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },
}

/// Staging directory errors
#[derive(Error, Debug)]
pub enum StageError {
    /// Staging directory is left over from a previous run
    #[error("Staging directory {} already exists", .path.display())]
    AlreadyExists {
        /// Staging directory path
        path: PathBuf,
    },

    /// A path listed in the stage manifest does not exist
    #[error("{} does not exist", .path.display())]
    MissingSource {
        /// Missing path
        path: PathBuf,
    },

    /// A file entry points at something that is not a regular file
    #[error("{} is not a file", .path.display())]
    NotAFile {
        /// Offending path
        path: PathBuf,
    },

    /// A directory entry points at something that is not a directory
    #[error("{} is not a directory", .path.display())]
    NotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// Nothing was staged
    #[error("Staging directory {} is empty", .path.display())]
    Empty {
        /// Staging directory path
        path: PathBuf,
    },

    /// `--clean` would remove the project root or one of its ancestors
    #[error(
        "Refusing to clean {}: it contains the project directory {}",
        .path.display(),
        .project_dir.display()
    )]
    UnsafeCleanTarget {
        /// Staging directory path
        path: PathBuf,
        /// Project root it would take with it
        project_dir: PathBuf,
    },

    /// Publishing tool would be extracted into the staged files
    #[error(
        "Tool directory {} is inside staging directory {}",
        .tool_dir.display(),
        .path.display()
    )]
    ToolDirInStaging {
        /// Tool directory path
        tool_dir: PathBuf,
        /// Staging directory path
        path: PathBuf,
    },

    /// Staged contents differ from the manifest
    #[error(
        "Staging directory {} has unexpected contents: expected {expected:?}, found {found:?}",
        .path.display()
    )]
    UnexpectedLayout {
        /// Staging directory path
        path: PathBuf,
        /// Entry names the manifest asks for
        expected: Vec<String>,
        /// Entry names actually present
        found: Vec<String>,
    },

    /// Error walking a source directory
    #[error("{0}")]
    Walk(#[from] walkdir::Error),

    /// Path prefix stripping error
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

/// Publishing tool acquisition errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Download URL template produced something that is not a URL
    #[error("Invalid download URL '{url}': {source}")]
    InvalidUrl {
        /// Rendered URL
        url: String,
        /// Parse error
        #[source]
        source: url::ParseError,
    },

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Download of {url} failed with HTTP {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Downloaded archive does not match the pinned digest
    #[error("hash mismatch of downloaded file: expected {expected}, got {actual}")]
    HashMismatch {
        /// Expected hash value
        expected: String,
        /// Actual hash value
        actual: String,
    },

    /// Archive could not be read
    #[error("Failed to read ZIP archive: {reason}")]
    Zip {
        /// Reason for the error
        reason: String,
    },

    /// Archive entry would land outside the extraction directory
    #[error("Invalid ZIP entry path (potential traversal attack): {name}")]
    UnsafeEntry {
        /// Entry name
        name: String,
    },

    /// Archive did not contain the expected executable
    #[error("Publishing tool not found at {} after extraction", .path.display())]
    MissingExecutable {
        /// Expected path
        path: PathBuf,
    },

    /// Tool could not be started
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// Version probe exited unsuccessfully
    #[error("Version probe exited with {}", describe_code(.code))]
    ProbeFailed {
        /// Exit code, if any
        code: Option<i32>,
    },
}

/// Push errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Push could not be started
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// Push exited unsuccessfully
    #[error("Push to '{destination}' exited with {}", describe_code(.code))]
    PushFailed {
        /// `<namespace>:<channel>` destination
        destination: String,
        /// Exit code, if any
        code: Option<i32>,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Stage(StageError::AlreadyExists { path }) => vec![
                format!("Remove the leftover directory: rm -rf {}", path.display()),
                "Or re-run with --clean to replace it".to_string(),
            ],
            ReleaseError::Stage(StageError::UnsafeCleanTarget { .. }) => vec![
                "Point --dist at a dedicated subdirectory such as dist".to_string(),
            ],
            ReleaseError::Stage(StageError::ToolDirInStaging { .. }) => vec![
                "Extract butler outside the staging directory with --tool-dir".to_string(),
            ],
            ReleaseError::Stage(StageError::MissingSource { path }) => vec![
                format!("Make sure {} exists before releasing", path.display()),
                "For the web channel, build the WebAssembly package first".to_string(),
            ],
            ReleaseError::Build(BuildError::ToolchainNotFound { program }) => vec![
                format!("Install {program} or add it to PATH"),
                "Use --build-program to choose another build tool".to_string(),
            ],
            ReleaseError::Build(BuildError::Failed { .. }) => {
                vec!["Fix the build errors above and run the release again".to_string()]
            }
            ReleaseError::Tool(ToolError::HashMismatch { .. }) => vec![
                "The butler archive changed upstream; verify it and update --butler-sha256"
                    .to_string(),
            ],
            ReleaseError::Tool(ToolError::Http(_) | ToolError::HttpStatus { .. }) => vec![
                "Check network access to the butler download host".to_string(),
                "Override the download location with --butler-url".to_string(),
            ],
            ReleaseError::Publish(PublishError::PushFailed { .. }) => vec![
                "Check that BUTLER_API_KEY is set to a valid itch.io API key".to_string(),
                "Verify the target with --target <user>/<game>".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Process exit code to report for this error.
    ///
    /// A failing child process passes its own exit code through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Build(BuildError::Failed {
                code: Some(code), ..
            })
            | ReleaseError::Tool(ToolError::ProbeFailed { code: Some(code) })
            | ReleaseError::Publish(PublishError::PushFailed {
                code: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| ReleaseError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_passes_exit_code_through() {
        let err = ReleaseError::Build(BuildError::Failed {
            command: "cargo build --release".to_string(),
            code: Some(101),
        });
        assert_eq!(err.exit_code(), 101);
    }

    #[test]
    fn test_signal_termination_exits_with_one() {
        let err = ReleaseError::Publish(PublishError::PushFailed {
            destination: "boringcactus/dynamaze:web".to_string(),
            code: None,
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_stage_errors_exit_with_one() {
        let err = ReleaseError::Stage(StageError::AlreadyExists {
            path: PathBuf::from("dist"),
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_already_exists_suggests_clean() {
        let err = ReleaseError::Stage(StageError::AlreadyExists {
            path: PathBuf::from("dist"),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("--clean")));
    }

    #[test]
    fn test_unsafe_clean_target_suggests_subdirectory() {
        let err = ReleaseError::Stage(StageError::UnsafeCleanTarget {
            path: PathBuf::from("/game"),
            project_dir: PathBuf::from("/game"),
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestions()[0].contains("--dist"));
    }

    #[test]
    fn test_fs_context_keeps_path() {
        let io: std::result::Result<(), _> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.fs_context("reading file", "assets/tile.png").unwrap_err();
        assert_eq!(err.to_string(), "reading file assets/tile.png: gone");
    }
}
