use serde::Deserialize;
use std::fmt;

/// Operating-system family that decides which catalogue applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Windows,
    #[serde(alias = "macos")]
    Darwin,
    /// Linux, the BSDs and anything unrecognized.
    #[serde(alias = "linux", alias = "unix")]
    Posix,
}

impl PlatformKind {
    /// Platform of the running host.
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Unknown names fall back to `Posix` so the broader default catalogue applies.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" => PlatformKind::Windows,
            "darwin" | "macos" | "ios" => PlatformKind::Darwin,
            _ => PlatformKind::Posix,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Windows => "windows",
            PlatformKind::Darwin => "darwin",
            PlatformKind::Posix => "posix",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
