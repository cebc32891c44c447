//! Absolute, symlink-resolved path values that compare segment by segment.

use crate::errors::ClassifyError;
use soft_canonicalize::soft_canonicalize;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Windows and default macOS volumes ignore case.
const FOLD_CASE: bool = cfg!(any(windows, target_os = "macos"));

#[derive(Debug, Clone)]
pub struct CanonicalPath {
    path: PathBuf,
    segments: Vec<OsString>,
}

impl CanonicalPath {
    /// Resolves `path` against the current working directory. The empty path
    /// denotes the working directory itself.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let abs = absolute(path.as_ref(), None)?;
        resolve_absolute(&abs).map(Self::from_path)
    }

    /// Resolves `path`, joining it onto `base` when relative.
    pub fn resolve_from(path: impl AsRef<Path>, base: &Path) -> Result<Self, ClassifyError> {
        let abs = absolute(path.as_ref(), Some(base))?;
        resolve_absolute(&abs).map(Self::from_path)
    }

    /// Absolute form with `.` and `..` removed textually; symlinks are not followed.
    pub fn lexical(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let abs = absolute(path.as_ref(), None)?;
        Ok(Self::from_path(normalize_lexically(&abs)))
    }

    fn from_path(path: PathBuf) -> Self {
        let segments = segments(&path);
        Self { path, segments }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// True when `self` equals `ancestor` or lies beneath it. Whole segments
    /// only, so `/etc2` is not under `/etc`.
    pub fn starts_with(&self, ancestor: &CanonicalPath) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl PartialEq for CanonicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for CanonicalPath {}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn absolute(path: &Path, base: Option<&Path>) -> Result<PathBuf, ClassifyError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let base = match base {
        Some(b) => absolute(b, None)?,
        None => std::env::current_dir().map_err(|source| ClassifyError::Unresolvable {
            path: path.to_path_buf(),
            source,
        })?,
    };
    Ok(base.join(path))
}

/// Strict canonicalization first; paths with missing components go through
/// `soft_canonicalize`, which still follows existing (and dangling) symlinks.
fn resolve_absolute(abs: &Path) -> Result<PathBuf, ClassifyError> {
    if let Ok(canonical) = dunce::canonicalize(abs) {
        return Ok(canonical);
    }
    soft_canonicalize(abs)
        .map(|p| dunce::simplified(&p).to_path_buf())
        .map_err(|source| {
            if is_symlink_loop(&source) {
                ClassifyError::SymlinkLoop {
                    path: abs.to_path_buf(),
                }
            } else {
                ClassifyError::Unresolvable {
                    path: abs.to_path_buf(),
                    source,
                }
            }
        })
}

#[cfg(target_os = "linux")]
const ELOOP: i32 = 40;
#[cfg(all(unix, not(target_os = "linux")))]
const ELOOP: i32 = 62;
// ERROR_CANT_RESOLVE_FILENAME
#[cfg(windows)]
const ELOOP: i32 = 1921;
#[cfg(not(any(unix, windows)))]
const ELOOP: i32 = -1;

// ELOOP has no stable ErrorKind yet; soft_canonicalize reports its own cycle
// detection as "too many levels of symbolic links".
fn is_symlink_loop(err: &io::Error) -> bool {
    if err.raw_os_error() == Some(ELOOP) {
        return true;
    }
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("symbolic link") || msg.contains("symlink")
}

fn normalize_lexically(abs: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in abs.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn segments(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => Some(OsString::from("/")),
            other => Some(fold(other.as_os_str())),
        })
        .collect()
}

/// Non-UTF-8 names are kept byte-exact rather than folded.
fn fold(s: &std::ffi::OsStr) -> OsString {
    match s.to_str() {
        Some(utf8) if FOLD_CASE => OsString::from(utf8.to_lowercase()),
        _ => s.to_os_string(),
    }
}
