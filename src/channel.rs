//! Distribution channels and push destinations.
//!
//! A channel is either a native operating-system build (named the way the CI
//! environment names the OS, e.g. `linux`, `osx`, `windows`) or the `web`
//! build. The destination handed to butler is `<namespace>:<channel>`.

use crate::error::CliError;
use std::fmt;

/// itch.io `<user>/<game>` that releases are pushed to by default
pub const DEFAULT_NAMESPACE: &str = "boringcactus/dynamaze";

/// Channel name used for the WebAssembly build
pub const WEB_CHANNEL: &str = "web";

/// Operating-system name as reported by CI (`TRAVIS_OS_NAME`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OsName(String);

impl OsName {
    /// Wrap an OS name. Only emptiness is rejected.
    pub fn new(name: impl Into<String>) -> Result<Self, CliError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CliError::MissingArgument {
                argument: "--os-name (or TRAVIS_OS_NAME)".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// OS name of the machine running this process, in CI naming.
    pub fn host() -> Self {
        let name = match std::env::consts::OS {
            "macos" => "osx",
            other => other,
        };
        Self(name.to_string())
    }

    /// The name exactly as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Platform tag used in butler download URLs
    pub fn platform_tag(&self) -> &str {
        platform_tag(&self.0)
    }

    /// Executable suffix of binaries built for this OS
    pub fn binary_suffix(&self) -> &'static str {
        binary_suffix(&self.0)
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a CI OS name to the vendor's platform naming.
///
/// `osx` becomes `darwin`; every other name passes through unchanged.
pub fn platform_tag(os: &str) -> &str {
    match os {
        "osx" => "darwin",
        other => other,
    }
}

/// Executable suffix for binaries built on `os`.
pub fn binary_suffix(os: &str) -> &'static str {
    match os {
        "windows" => ".exe",
        _ => "",
    }
}

/// Remote channel a staged build is pushed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Native desktop build, channel named after the OS
    Native(OsName),
    /// WebAssembly build
    Web,
}

impl Channel {
    /// Literal channel name
    pub fn name(&self) -> &str {
        match self {
            Channel::Native(os) => os.as_str(),
            Channel::Web => WEB_CHANNEL,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Push target: `<namespace>:<channel>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    namespace: String,
    channel: Channel,
}

impl Destination {
    /// Create a destination
    pub fn new(namespace: impl Into<String>, channel: Channel) -> Self {
        Self {
            namespace: namespace.into(),
            channel,
        }
    }

    /// Destination under [`DEFAULT_NAMESPACE`]
    pub fn dynamaze(channel: Channel) -> Self {
        Self::new(DEFAULT_NAMESPACE, channel)
    }

    /// itch.io `<user>/<game>`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Channel part
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.channel)
    }
}
