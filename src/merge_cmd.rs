//! `tdmerge merge`: one three-way merge of three files.
//!
//! The output uses BASE's line separator; the inputs are normalized to it
//! before merging so that separator-only differences never conflict.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tdmerge::config::{CONFIG_FILE_NAME, Config};
use tdmerge::merge::merge_with;
use tdmerge::model::text::{LineSeparator, convert_line_separators};
use tdmerge::store::{FsStore, PendingWrite, TextStore};

/// Arguments for `tdmerge merge`.
#[derive(Args)]
pub struct MergeArgs {
    /// The changed side kept on top of conflicts
    pub left: PathBuf,

    /// The common ancestor
    pub base: PathBuf,

    /// The changed side shown below conflicts
    pub right: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file [default: ./tdmerge.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &MergeArgs) -> Result<ExitCode> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;

    let left = read(&args.left)?;
    let base = read(&args.base)?;
    let right = read(&args.right)?;

    let separator = LineSeparator::detect(&base).unwrap_or(config.apply.fallback_line_separator);
    let normalize = |text: &str| convert_line_separators(text, separator);

    let outcome = merge_with(
        &normalize(&left),
        &normalize(&base),
        &normalize(&right),
        config.merge.algorithm.to_similar(),
    );
    let conflicted = outcome.has_conflict();
    let merged = normalize(outcome.text());

    match &args.output {
        Some(out) => {
            let mut store = FsStore::new(".");
            store
                .write_atomically(&[PendingWrite::new(out, merged)])
                .context("failed to write merge result")?;
            info!(path = %out.display(), conflicted, "wrote merge result");
        }
        None => print!("{merged}"),
    }

    if conflicted {
        eprintln!("merge produced conflicts");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
