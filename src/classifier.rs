//! Containment checks of candidate paths against a protected catalogue.
//!
//! Both the candidate and every catalogue entry are canonicalized on each
//! call, so symlinked entries (`/var` on macOS) and symlinked candidates
//! (`/tmp/link -> /etc`) compare by the location they actually denote.

use crate::canonical::CanonicalPath;
use crate::catalogue::{protected_paths, EnvLookup, ProcessEnv, ProtectedPathSet};
use crate::errors::{ClassifyError, DangerousPathError};
use crate::platform::PlatformKind;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of a single classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub protected: bool,
    /// Catalogue entry that contains the candidate.
    pub matched: Option<String>,
}

impl Verdict {
    fn safe() -> Self {
        Self {
            protected: false,
            matched: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    platform: PlatformKind,
    catalogue: ProtectedPathSet,
}

impl Classifier {
    pub fn new(platform: PlatformKind, catalogue: ProtectedPathSet) -> Self {
        Self {
            platform,
            catalogue,
        }
    }

    pub fn for_platform(platform: PlatformKind, env: &dyn EnvLookup) -> Self {
        Self::new(platform, protected_paths(platform, env))
    }

    /// Catalogue of the running host, reading the process environment.
    pub fn detect() -> Self {
        Self::for_platform(PlatformKind::detect(), &ProcessEnv)
    }

    pub fn with_extra<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for e in entries {
            self.catalogue.push(e);
        }
        self
    }

    pub fn with_exempt<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for e in entries {
            self.catalogue.push_exempt(e);
        }
        self
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform
    }

    pub fn catalogue(&self) -> &ProtectedPathSet {
        &self.catalogue
    }

    /// Classifies `path`, surfacing resolution failures instead of guessing.
    pub fn classify(&self, path: impl AsRef<Path>) -> Result<bool, ClassifyError> {
        Ok(self.try_verdict(path)?.protected)
    }

    pub fn try_verdict(&self, path: impl AsRef<Path>) -> Result<Verdict, ClassifyError> {
        let candidate = CanonicalPath::resolve(path)?;
        Ok(self.match_candidate(&candidate))
    }

    /// Never fails. When `path` cannot be resolved the lexical absolute form is
    /// classified instead; when not even that can be formed (no working
    /// directory for a relative path) the path is reported as protected.
    pub fn verdict(&self, path: impl AsRef<Path>) -> Verdict {
        let path = path.as_ref();
        self.settle(path, CanonicalPath::resolve(path), || CanonicalPath::lexical(path))
    }

    pub(crate) fn settle(
        &self,
        path: &Path,
        resolved: Result<CanonicalPath, ClassifyError>,
        lexical: impl FnOnce() -> Result<CanonicalPath, ClassifyError>,
    ) -> Verdict {
        let candidate = match resolved {
            Ok(c) => c,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "falling back to lexical path");
                match lexical() {
                    Ok(c) => c,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "path unresolvable, treating as protected");
                        return Verdict {
                            protected: true,
                            matched: None,
                        };
                    }
                }
            }
        };
        self.match_candidate(&candidate)
    }

    pub fn is_protected(&self, path: impl AsRef<Path>) -> bool {
        self.verdict(path).protected
    }

    pub fn assert_safe(&self, path: impl AsRef<Path>) -> Result<(), DangerousPathError> {
        let path = path.as_ref();
        let verdict = self.verdict(path);
        if verdict.protected {
            return Err(DangerousPathError::new(path, verdict.matched));
        }
        Ok(())
    }

    fn match_candidate(&self, candidate: &CanonicalPath) -> Verdict {
        for entry in self.catalogue.entries() {
            let Some(root) = resolve_entry(entry) else {
                continue;
            };
            if !candidate.starts_with(&root) {
                continue;
            }
            if let Some(exempt) = self.exemption_for(candidate) {
                debug!(candidate = %candidate, exempt = %exempt, "candidate inside exempt location");
                return Verdict::safe();
            }
            return Verdict {
                protected: true,
                matched: Some(entry.clone()),
            };
        }
        Verdict::safe()
    }

    fn exemption_for(&self, candidate: &CanonicalPath) -> Option<&str> {
        self.catalogue
            .exempt()
            .iter()
            .find(|e| resolve_entry(e).is_some_and(|root| candidate.starts_with(&root)))
            .map(String::as_str)
    }
}

/// Entries that are not absolute on this host, or fail to resolve, never match.
fn resolve_entry(entry: &str) -> Option<CanonicalPath> {
    if !Path::new(entry).is_absolute() {
        debug!(entry, "skipping catalogue entry that is not absolute on this host");
        return None;
    }
    match CanonicalPath::resolve(entry) {
        Ok(root) => Some(root),
        Err(err) => {
            debug!(entry, error = %err, "skipping unresolvable catalogue entry");
            None
        }
    }
}
