//! Command-line front end: argument parsing and the `list` / `check` commands.

use crate::classifier::Classifier;
use std::io::{self, Write};
use std::path::PathBuf;

pub const USAGE: &str = "usage: bad-path <list|check|serve> [--config FILE] [--strict] [PATH...]";

pub const EXIT_SAFE: u8 = 0;
pub const EXIT_PROTECTED: u8 = 1;
/// Bad usage, or unresolvable paths under `--strict`.
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: String,
    pub config_path: Option<PathBuf>,
    pub strict: bool,
    pub paths: Vec<String>,
}

/// Parses arguments without the program name.
pub fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let mut command = None;
    let mut config_path = None;
    let mut strict = false;
    let mut paths = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--strict" => strict = true,
            "--" => {
                paths.extend(args[i + 1..].iter().cloned());
                break;
            }
            other if command.is_none() => command = Some(other.to_string()),
            other => paths.push(other.to_string()),
        }
        i += 1;
    }
    let command = command.ok_or(USAGE)?;
    Ok(Args { command, config_path, strict, paths })
}

pub fn list(classifier: &Classifier, out: &mut dyn Write) -> io::Result<u8> {
    for entry in classifier.catalogue().entries() {
        writeln!(out, "{entry}")?;
    }
    Ok(EXIT_SAFE)
}

/// Writes one tab-separated line per path and returns the exit code.
pub fn check(
    classifier: &Classifier,
    paths: &[String],
    strict: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8> {
    if paths.is_empty() {
        writeln!(err, "check requires at least one path")?;
        return Ok(EXIT_USAGE);
    }
    let mut any_protected = false;
    let mut any_unresolved = false;
    for path in paths {
        let verdict = if strict {
            match classifier.try_verdict(path) {
                Ok(v) => v,
                Err(e) => {
                    writeln!(out, "unresolved\t{path}\t{e}")?;
                    any_unresolved = true;
                    continue;
                }
            }
        } else {
            classifier.verdict(path)
        };
        if verdict.protected {
            any_protected = true;
            writeln!(out, "protected\t{path}\t{}", verdict.matched.as_deref().unwrap_or("-"))?;
        } else {
            writeln!(out, "safe\t{path}")?;
        }
    }
    Ok(if any_unresolved {
        EXIT_USAGE
    } else if any_protected {
        EXIT_PROTECTED
    } else {
        EXIT_SAFE
    })
}
