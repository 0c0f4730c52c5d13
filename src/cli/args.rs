//! Command line argument parsing and validation.
//!
//! Every global option can also come from a `DYNAMAZE_*` environment
//! variable so CI jobs can configure releases without editing scripts.

use crate::build::BuildCommand;
use crate::butler::{ButlerSource, DEFAULT_BUTLER_URL, http::PLATFORM_PLACEHOLDER};
use crate::channel::{DEFAULT_NAMESPACE, OsName};
use crate::pipeline::{ReleaseConfig, ReleaseKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build, stage and push DynaMaze to itch.io
#[derive(Parser, Debug)]
#[command(
    name = "dynamaze_release",
    version,
    about = "Build, stage and push DynaMaze to itch.io",
    long_about = "Stage a DynaMaze build into a fresh directory and push it to itch.io with butler.

Usage:
  dynamaze_release native                 # channel from TRAVIS_OS_NAME
  dynamaze_release native --os-name osx
  dynamaze_release web                    # push assets, pkg/ and index.html
  dynamaze_release --dry-run --clean web"
)]
pub struct Args {
    /// Release to run
    #[command(subcommand)]
    pub command: Command,

    /// Project root containing assets/ and Cargo.toml
    #[arg(long, global = true, env = "DYNAMAZE_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Staging directory, relative to the project root
    #[arg(long, global = true, env = "DYNAMAZE_DIST_DIR", default_value = "dist")]
    pub dist: PathBuf,

    /// Remove an existing staging directory instead of failing
    #[arg(long, global = true)]
    pub clean: bool,

    /// Do everything except the final push
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// itch.io <user>/<game> to push to
    #[arg(
        long = "target",
        value_name = "NAMESPACE",
        global = true,
        env = "DYNAMAZE_ITCH_TARGET",
        default_value = DEFAULT_NAMESPACE
    )]
    pub namespace: String,

    /// butler download URL; {platform} is replaced with the platform tag
    #[arg(long, global = true, env = "DYNAMAZE_BUTLER_URL", default_value = DEFAULT_BUTLER_URL)]
    pub butler_url: String,

    /// Expected SHA-256 of the butler archive
    #[arg(long, global = true, env = "DYNAMAZE_BUTLER_SHA256")]
    pub butler_sha256: Option<String>,

    /// Directory butler is extracted into (default: the project root)
    #[arg(long, global = true, env = "DYNAMAZE_TOOL_DIR")]
    pub tool_dir: Option<PathBuf>,

    /// Show detailed progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Release subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the game and push the native binary
    Native {
        /// OS name; also the channel name
        #[arg(long, env = "TRAVIS_OS_NAME")]
        os_name: Option<String>,

        /// Binary name without suffix
        #[arg(long, default_value = "dynamaze")]
        binary: String,

        /// Cargo target directory, relative to the project root
        #[arg(long, default_value = "target")]
        target_dir: PathBuf,

        /// Replace `cargo build --release` with another program
        #[arg(long)]
        build_program: Option<String>,

        /// Argument for the build (repeatable, use --build-arg=--flag for dashes)
        #[arg(long = "build-arg", allow_hyphen_values = true)]
        build_args: Vec<String>,

        /// Stage an existing release binary without building
        #[arg(long, conflicts_with_all = ["build_program", "build_args"])]
        skip_build: bool,
    },

    /// Push the pre-built WebAssembly bundle
    Web {
        /// OS whose butler build to download (default: this machine)
        #[arg(long)]
        butler_os: Option<String>,
    },
}

impl Command {
    /// Subcommand name
    pub fn name(&self) -> &'static str {
        match self {
            Command::Native { .. } => "native",
            Command::Web { .. } => "web",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !self.butler_url.contains(PLATFORM_PLACEHOLDER) {
            return Err(format!(
                "--butler-url must contain {PLATFORM_PLACEHOLDER}: '{}'",
                self.butler_url
            ));
        }

        if let Some(hash) = &self.butler_sha256
            && (hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(format!(
                "--butler-sha256 must be 64 hex characters, got '{hash}'"
            ));
        }

        if self.namespace.split('/').filter(|p| !p.is_empty()).count() != 2 {
            return Err(format!(
                "--target must look like <user>/<game>, got '{}'",
                self.namespace
            ));
        }

        match &self.command {
            Command::Native {
                os_name, binary, ..
            } => {
                if os_name.as_deref().is_some_and(|os| os.trim().is_empty()) {
                    return Err("--os-name (or TRAVIS_OS_NAME) must not be empty".to_string());
                }
                if binary.is_empty() {
                    return Err("--binary must not be empty".to_string());
                }
            }
            Command::Web { butler_os } => {
                if butler_os.as_deref().is_some_and(|os| os.trim().is_empty()) {
                    return Err("--butler-os must not be empty".to_string());
                }
            }
        }

        Ok(())
    }

    /// Shared pipeline settings
    pub fn release_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            project_dir: self.project_dir.clone(),
            dist_dir: self.dist.clone(),
            clean: self.clean,
            dry_run: self.dry_run,
            namespace: self.namespace.clone(),
            butler: ButlerSource {
                url_template: self.butler_url.clone(),
                sha256: self.butler_sha256.clone(),
            },
            tool_dir: self.tool_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Release kind for the chosen subcommand.
    ///
    /// Falls back to the host OS name when no OS name was supplied.
    pub fn release_kind(&self) -> Result<ReleaseKind, crate::error::CliError> {
        match &self.command {
            Command::Native {
                os_name,
                binary,
                target_dir,
                build_program,
                build_args,
                skip_build,
            } => {
                let os = match os_name {
                    Some(name) => OsName::new(name.clone())?,
                    None => {
                        let host = OsName::host();
                        log::warn!("TRAVIS_OS_NAME not set, releasing for host OS '{}'", host);
                        host
                    }
                };
                let build = if *skip_build {
                    None
                } else {
                    Some(match build_program {
                        Some(program) => BuildCommand::new(program.clone(), build_args.clone()),
                        None => BuildCommand::cargo_release().with_args(build_args.clone()),
                    })
                };
                Ok(ReleaseKind::Native {
                    os,
                    binary: binary.clone(),
                    target_dir: target_dir.clone(),
                    build,
                })
            }
            Command::Web { butler_os } => Ok(ReleaseKind::Web {
                butler_os: match butler_os {
                    Some(name) => OsName::new(name.clone())?,
                    None => OsName::host(),
                },
            }),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message);
    }

    /// Check if quiet output is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("dynamaze_release").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["web"]);
        assert_eq!(args.dist, PathBuf::from("dist"));
        assert_eq!(args.namespace, DEFAULT_NAMESPACE);
        assert!(!args.clean);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_native_build_program_and_args() {
        let args = parse(&[
            "native",
            "--os-name",
            "linux",
            "--build-program",
            "sh",
            "--build-arg=-c",
            "--build-arg",
            "exit 0",
        ]);
        let ReleaseKind::Native { build, os, .. } = args.release_kind().unwrap() else {
            panic!("expected native kind");
        };
        assert_eq!(os.as_str(), "linux");
        assert_eq!(build.unwrap().display(), "sh -c exit 0");
    }

    #[test]
    fn test_extra_cargo_args_are_appended() {
        let args = parse(&["native", "--os-name", "osx", "--build-arg=--locked"]);
        let ReleaseKind::Native { build, .. } = args.release_kind().unwrap() else {
            panic!("expected native kind");
        };
        assert_eq!(build.unwrap().display(), "cargo build --release --locked");
    }

    #[test]
    fn test_skip_build() {
        let args = parse(&["native", "--os-name", "windows", "--skip-build"]);
        let ReleaseKind::Native { build, .. } = args.release_kind().unwrap() else {
            panic!("expected native kind");
        };
        assert!(build.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["web", "--clean", "--dry-run", "--dist", "out"]);
        let config = args.release_config();
        assert!(config.clean);
        assert!(config.dry_run);
        assert_eq!(config.dist_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_bad_sha_rejected() {
        let args = parse(&["web", "--butler-sha256", "abc"]);
        assert!(args.validate().unwrap_err().contains("64 hex"));
    }

    #[test]
    fn test_url_without_placeholder_rejected() {
        let args = parse(&["web", "--butler-url", "https://example.com/butler.zip"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_bad_namespace_rejected() {
        let args = parse(&["web", "--target", "dynamaze"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_empty_os_name_rejected() {
        let args = parse(&["native", "--os-name", ""]);
        assert!(args.validate().is_err());
    }
}
