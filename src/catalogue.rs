//! Per-platform catalogue of protected root directories.
//!
//! Entries are plain strings; nothing here touches the filesystem. The
//! classifier canonicalizes them at query time.

use crate::platform::PlatformKind;
use std::collections::HashMap;

const BASELINE: &[&str] = &["/etc", "/bin", "/sbin", "/boot", "/sys", "/proc", "/dev"];

const POSIX_EXTRA: &[&str] = &["/root", "/lib", "/lib64", "/usr", "/var", "/opt"];

// `/private` as a whole is not listed: its temp directories stay usable.
const DARWIN_EXTRA: &[&str] = &[
    "/System",
    "/Library",
    "/private/etc",
    "/private/var",
    "/var",
    "/usr",
    "/Applications",
];

const DARWIN_EXEMPT: &[&str] = &["/private/tmp", "/private/var/tmp", "/private/var/folders"];

const WINDOWS_FIXED: &[&str] = &[
    "C:\\Windows",
    "C:\\Windows\\System32",
    "C:\\Program Files",
    "C:\\Program Files (x86)",
    "C:\\ProgramData",
];

const WINDOWS_ENV_VARS: &[&str] = &["WINDIR", "SYSTEMROOT"];

pub const WINDOWS_DEFAULT_DIR: &str = "C:\\Windows";

/// Source of environment variables for the Windows catalogue.
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Ordered protected roots plus the locations carved out of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedPathSet {
    entries: Vec<String>,
    exempt: Vec<String>,
}

impl ProtectedPathSet {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn exempt(&self) -> &[String] {
        &self.exempt
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    /// Appends an entry unless an identical string is already present.
    pub fn push(&mut self, entry: impl Into<String>) {
        push_unique(&mut self.entries, entry.into());
    }

    pub fn push_exempt(&mut self, entry: impl Into<String>) {
        push_unique(&mut self.exempt, entry.into());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// Builds the catalogue for `platform`. Only the Windows branch consults `env`.
pub fn protected_paths(platform: PlatformKind, env: &dyn EnvLookup) -> ProtectedPathSet {
    let mut set = ProtectedPathSet::default();
    match platform {
        PlatformKind::Windows => {
            for p in WINDOWS_FIXED {
                set.push(*p);
            }
            for key in WINDOWS_ENV_VARS {
                let value = env
                    .var(key)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| WINDOWS_DEFAULT_DIR.to_string());
                set.push(value);
            }
        }
        PlatformKind::Darwin => {
            for p in BASELINE.iter().chain(DARWIN_EXTRA) {
                set.push(*p);
            }
            for p in DARWIN_EXEMPT {
                set.push_exempt(*p);
            }
        }
        PlatformKind::Posix => {
            for p in BASELINE.iter().chain(POSIX_EXTRA) {
                set.push(*p);
            }
        }
    }
    set
}
