//! Detects paths that point at, or beneath, operating-system locations such
//! as `/etc`, `/System` or `C:\Windows`.
//!
//! The free functions use a classifier for the running host that is built on
//! first use and shared read-only afterwards. Build a [`Classifier`] directly
//! to inject a platform, environment or extra entries.

pub mod canonical;
pub mod catalogue;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod platform;
pub mod security;
pub mod server;


pub use canonical::CanonicalPath;
pub use catalogue::{protected_paths, EnvLookup, ProcessEnv, ProtectedPathSet};
pub use classifier::{Classifier, Verdict};
pub use errors::{ClassifyError, DangerousPathError};
pub use platform::PlatformKind;

use std::path::Path;
use std::sync::OnceLock;

fn default_classifier() -> &'static Classifier {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT.get_or_init(Classifier::detect)
}

/// Protected roots for the running platform, as display strings.
pub fn get_dangerous_paths() -> Vec<String> {
    default_classifier().catalogue().entries().to_vec()
}

/// True if `path` is a protected root or lies beneath one.
pub fn is_system_path(path: impl AsRef<Path>) -> bool {
    default_classifier().is_protected(path)
}

pub fn is_sensitive_path(path: impl AsRef<Path>) -> bool {
    is_system_path(path)
}

/// With `raise_error` set, a protected path is returned as an error instead
/// of `Ok(true)`.
pub fn is_dangerous_path(path: impl AsRef<Path>, raise_error: bool) -> Result<bool, DangerousPathError> {
    let path = path.as_ref();
    let verdict = default_classifier().verdict(path);
    if verdict.protected && raise_error {
        return Err(DangerousPathError::new(path, verdict.matched));
    }
    Ok(verdict.protected)
}

pub fn assert_safe(path: impl AsRef<Path>) -> Result<(), DangerousPathError> {
    default_classifier().assert_safe(path)
}

/// Like [`is_system_path`] but reports paths that cannot be resolved.
pub fn classify(path: impl AsRef<Path>) -> Result<bool, ClassifyError> {
    default_classifier().classify(path)
}
