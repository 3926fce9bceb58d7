//! Error types for applying diffs.
//!
//! Merge conflicts are not errors: they are reported through
//! [`MergeOutcome`](crate::merge::resolve::MergeOutcome) and
//! [`ApplyResult`](crate::merge::apply::ApplyResult). What remains are I/O
//! failures at the store boundary, each naming the file it concerns, and the
//! missing-file policy. Configuration errors live here too.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors returned by a [`TextStore`](crate::store::TextStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A target file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's new content could not be staged next to it. Nothing in the
    /// batch was written.
    #[error("failed to stage {}: {source}; no file was written", .path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving a staged file into place failed after earlier files of the same
    /// batch had landed. Those were restored to their previous content,
    /// except for the paths listed in `unrestored`.
    #[error(
        "failed to write {}: {source} (rolled back {rolled_back} file(s){})",
        .path.display(),
        unrestored_note(.unrestored)
    )]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        rolled_back: usize,
        unrestored: Vec<PathBuf>,
    },

    /// Two writes of one batch resolve to the same file. Nothing was written.
    #[error("batch writes {} more than once; no file was written", .path.display())]
    DuplicateTarget { path: PathBuf },
}

fn unrestored_note(unrestored: &[PathBuf]) -> String {
    if unrestored.is_empty() {
        return String::new();
    }
    let paths: Vec<String> = unrestored
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    format!(", could not restore: {}", paths.join(", "))
}

/// Errors returned by [`apply_diffs`](crate::merge::apply::apply_diffs).
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A record targets a file that does not exist and the configuration
    /// asks for missing files to abort the run.
    #[error("target file does not exist: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors loading `tdmerge.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema. `line` is
    /// 1-based and known when the parser reports a span.
    #[error("{}{message}", location(.path.as_deref(), .line.as_ref()))]
    Invalid {
        path: Option<PathBuf>,
        line: Option<usize>,
        message: String,
    },
}

impl ConfigError {
    /// Attach the file the error came from.
    #[must_use]
    pub fn in_file(self, file: &Path) -> Self {
        match self {
            Self::Invalid { line, message, .. } => Self::Invalid {
                path: Some(file.to_owned()),
                line,
                message,
            },
            read @ Self::Read { .. } => read,
        }
    }
}

fn location(path: Option<&Path>, line: Option<&usize>) -> String {
    match (path, line) {
        (Some(p), Some(l)) => format!("{}: line {l}: ", p.display()),
        (Some(p), None) => format!("{}: ", p.display()),
        (None, Some(l)) => format!("line {l}: "),
        (None, None) => String::new(),
    }
}
