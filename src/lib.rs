//! # DynaMaze Release
//!
//! Ships DynaMaze builds to itch.io.
//!
//! A release builds the game (native only), stages the files a channel
//! expects into a fresh directory, downloads the `butler` publishing tool and
//! pushes the directory to `boringcactus/dynamaze:<channel>`.
//!
//! ## Features
//!
//! - **Fail-fast**: every step runs to completion before the next; the first
//!   failure ends the run and a failing child's exit code is passed through
//! - **Exact staging**: the staging directory is checked against the channel's
//!   manifest before anything is pushed
//! - **Fresh tooling**: butler is downloaded on every run, optionally pinned to
//!   a SHA-256 digest
//!
//! ## Usage
//!
//! ```bash
//! dynamaze_release native                  # channel from TRAVIS_OS_NAME
//! dynamaze_release native --os-name osx    # pushes boringcactus/dynamaze:osx
//! dynamaze_release web                     # pushes boringcactus/dynamaze:web
//! dynamaze_release --clean --dry-run web   # everything but the push
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod butler;
pub mod channel;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod stage;

pub use build::BuildCommand;
pub use butler::{ButlerSource, ButlerTool};
pub use channel::{Channel, Destination, OsName};
pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use pipeline::{ReleaseConfig, ReleaseKind, ReleaseOutcome, ReleasePipeline};
pub use stage::{StageManifest, StagingDir};
