//! File access for the merge engine.
//!
//! The engine needs few services from its environment: name each target
//! file canonically, read it (to detect its line separator) and write a
//! batch of files as one unit. [`TextStore`] is that seam. [`FsStore`] implements it on the real
//! file system; [`MemoryStore`] keeps everything in memory for tests and dry
//! runs.
//!
//! # Batch atomicity (`FsStore`)
//!
//! 1. **Stage**: every new content is written to a temp file in the target's
//!    directory and fsynced. The previous content is kept in memory. A
//!    failure here drops the temp files; no target was touched.
//! 2. **Commit**: temp files are renamed over their targets in order. If a
//!    rename fails, the targets already replaced are restored from their
//!    previous content and the error names the failed path.
//! 3. Parent directories are fsynced so the renames survive power loss.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::model::text::LineSeparator;

// ---------------------------------------------------------------------------
// TextStore
// ---------------------------------------------------------------------------

/// New content for one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub text: String,
}

impl PendingWrite {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Read and write access to the files targeted by diff records.
pub trait TextStore {
    /// The canonical spelling of the file `path` names.
    ///
    /// Records are grouped by this key, so every spelling of one file must
    /// resolve to the same path.
    fn resolve(&self, path: &Path) -> PathBuf {
        normalize(path)
    }

    /// Read a file as UTF-8 text. Returns `Ok(None)` if it does not exist.
    ///
    /// # Errors
    /// Returns [`StoreError::Read`] for any other failure.
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError>;

    /// The separator to write `path` with: the one of its first line break,
    /// or `fallback` if it has none. Returns `Ok(None)` if the file does not
    /// exist.
    ///
    /// # Errors
    /// Propagates read failures.
    fn detect_separator(
        &self,
        path: &Path,
        fallback: LineSeparator,
    ) -> Result<Option<LineSeparator>, StoreError> {
        Ok(self
            .read_text(path)?
            .map(|text| LineSeparator::detect(&text).unwrap_or(fallback)))
    }

    /// Write every file in `writes`, all or nothing.
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateTarget`] if two writes resolve to the
    /// same file, otherwise a [`StoreError`] naming the file that failed.
    fn write_atomically(&mut self, writes: &[PendingWrite]) -> Result<(), StoreError>;
}

/// Drop `.` components. `..` stays: folding it lexically can change the
/// file a path names when a directory is a symlink.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Reject a batch that names one file twice; the later write would silently
/// replace the earlier one.
fn ensure_unique_targets<'a>(
    targets: impl IntoIterator<Item = &'a Path>,
) -> Result<(), StoreError> {
    let mut seen = BTreeSet::new();
    for target in targets {
        if !seen.insert(target) {
            return Err(StoreError::DuplicateTarget {
                path: target.to_owned(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FsStore
// ---------------------------------------------------------------------------

/// A [`TextStore`] over the file system. Relative paths resolve against
/// `root`.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextStore for FsStore {
    /// Absolute and free of `.` components; relative paths are taken
    /// against `root`.
    fn resolve(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        };
        let absolute = std::path::absolute(&joined).unwrap_or(joined);
        normalize(&absolute)
    }

    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError> {
        let target = self.resolve(path);
        match fs::read_to_string(&target) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: target,
                source,
            }),
        }
    }

    fn write_atomically(&mut self, writes: &[PendingWrite]) -> Result<(), StoreError> {
        let targets: Vec<PathBuf> = writes.iter().map(|w| self.resolve(&w.path)).collect();
        ensure_unique_targets(targets.iter().map(PathBuf::as_path))?;

        let mut staged = Vec::with_capacity(writes.len());
        for (write, target) in writes.iter().zip(targets) {
            let file = StagedFile::stage(&target, &write.text).map_err(|source| {
                StoreError::Stage {
                    path: target.clone(),
                    source,
                }
            })?;
            staged.push(file);
        }
        debug!(files = staged.len(), "staged batch");

        let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
        for file in staged {
            let StagedFile {
                target,
                temp,
                previous,
            } = file;
            if let Err(e) = temp.persist(&target) {
                let (rolled_back, unrestored) = roll_back(&committed);
                return Err(StoreError::Commit {
                    path: target,
                    source: e.error,
                    rolled_back,
                    unrestored,
                });
            }
            committed.push((target, previous));
        }

        let parents: BTreeSet<&Path> = committed
            .iter()
            .filter_map(|(target, _)| target.parent())
            .collect();
        for parent in parents {
            if let Err(e) = sync_dir(parent) {
                debug!(dir = %parent.display(), "directory fsync failed: {e}");
            }
        }

        Ok(())
    }
}

/// New content sitting next to its target, not yet moved into place.
struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
    previous: Option<Vec<u8>>,
}

impl StagedFile {
    fn stage(target: &Path, text: &str) -> io::Result<Self> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let previous = match fs::read(target) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(text.as_bytes())?;
        temp.as_file().sync_all()?;
        if previous.is_some() {
            let permissions = fs::metadata(target)?.permissions();
            temp.as_file().set_permissions(permissions)?;
        }

        Ok(Self {
            target: target.to_owned(),
            temp,
            previous,
        })
    }
}

/// Restore already-replaced targets, newest first. Returns how many were
/// restored and which could not be.
fn roll_back(committed: &[(PathBuf, Option<Vec<u8>>)]) -> (usize, Vec<PathBuf>) {
    let mut restored = 0;
    let mut unrestored = Vec::new();
    for (target, previous) in committed.iter().rev() {
        let result = match previous {
            Some(bytes) => fs::write(target, bytes),
            None => fs::remove_file(target),
        };
        match result {
            Ok(()) => restored += 1,
            Err(e) => {
                error!(path = %target.display(), "rollback failed: {e}");
                unrestored.push(target.clone());
            }
        }
    }
    (restored, unrestored)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory [`TextStore`].
///
/// `fail_on` makes every batch that touches the given path fail while
/// staging, leaving all files unchanged.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, String>,
    fail_on: Option<PathBuf>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(normalize(&path.into()), text.into());
        self
    }

    /// Fail any batch that writes `path`.
    #[must_use]
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_on = Some(normalize(&path.into()));
        self
    }

    /// Current content of a file.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(&normalize(path.as_ref())).map(String::as_str)
    }
}

impl TextStore for MemoryStore {
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError> {
        Ok(self.files.get(&self.resolve(path)).cloned())
    }

    fn write_atomically(&mut self, writes: &[PendingWrite]) -> Result<(), StoreError> {
        let targets: Vec<PathBuf> = writes.iter().map(|w| self.resolve(&w.path)).collect();
        ensure_unique_targets(targets.iter().map(PathBuf::as_path))?;

        if let Some(bad) = &self.fail_on
            && targets.contains(bad)
        {
            return Err(StoreError::Stage {
                path: bad.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected failure"),
            });
        }
        for (write, target) in writes.iter().zip(targets) {
            self.files.insert(target, write.text.clone());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
