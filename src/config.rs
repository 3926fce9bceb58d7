//! Configuration (`tdmerge.toml`).
//!
//! Every field has a default, and a missing file means all defaults.
//!
//! ```toml
//! [apply]
//! missing_files = "skip"
//! fallback_line_separator = "lf"
//!
//! [merge]
//! algorithm = "myers"
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::text::LineSeparator;

/// Default config file name, looked up in the root directory.
pub const CONFIG_FILE_NAME: &str = "tdmerge.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How diffs are written back.
    #[serde(default)]
    pub apply: ApplyConfig,

    /// How diffs are merged.
    #[serde(default)]
    pub merge: MergeConfig,
}

// ---------------------------------------------------------------------------
// ApplyConfig
// ---------------------------------------------------------------------------

/// Write-back settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyConfig {
    /// What to do with records whose target file does not exist.
    #[serde(default)]
    pub missing_files: MissingFilePolicy,

    /// Separator for files that contain no line break yet.
    #[serde(default)]
    pub fallback_line_separator: LineSeparator,
}

/// Handling of records that target a file that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFilePolicy {
    /// Log a warning and leave the file alone.
    #[default]
    Skip,
    /// Abort before anything is written.
    Error,
}

impl fmt::Display for MissingFilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Merge settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Line diff algorithm the three-way merge aligns with.
    #[serde(default)]
    pub algorithm: DiffAlgorithm,
}

/// Two-way line diff algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) diff.
    #[default]
    Myers,
    /// Patience diff; anchors on unique lines.
    Patience,
    /// Classic longest common subsequence.
    Lcs,
}

impl DiffAlgorithm {
    /// The matching `similar` algorithm.
    #[must_use]
    pub const fn to_similar(self) -> similar::Algorithm {
        match self {
            Self::Myers => similar::Algorithm::Myers,
            Self::Patience => similar::Algorithm::Patience,
            Self::Lcs => similar::Algorithm::Lcs,
        }
    }
}

impl fmt::Display for DiffAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Myers => write!(f, "myers"),
            Self::Patience => write!(f, "patience"),
            Self::Lcs => write!(f, "lcs"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read,
    /// and [`ConfigError::Invalid`] (naming the file) if it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|e| e.in_file(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Invalid {
            path: None,
            line: e
                .span()
                .map(|span| toml_str[..span.start].matches('\n').count() + 1),
            message: e.message().to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
