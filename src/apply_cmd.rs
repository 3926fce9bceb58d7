//! `tdmerge apply`: write a batch of test diffs back to their files.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tdmerge::config::{CONFIG_FILE_NAME, Config};
use tdmerge::merge::apply::{FileReport, FileStatus};
use tdmerge::merge::{ApplyPlan, ApplyResult, apply_diffs_with, plan_diffs};
use tdmerge::model::record::{DiffInput, DiffRecord};
use tdmerge::store::FsStore;

use crate::format::OutputFormat;

/// Arguments for `tdmerge apply`.
#[derive(Args)]
pub struct ApplyArgs {
    /// JSON file with diff records or a test tree (`-` or absent: stdin)
    pub input: Option<PathBuf>,

    /// Directory that relative file paths resolve against
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file [default: <ROOT>/tdmerge.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compute every merge but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// What `apply` prints.
#[derive(Serialize)]
struct ApplyReport<'a> {
    result: ApplyResult,
    dry_run: bool,
    files: &'a [FileReport],
    detached: usize,
    duplicates: usize,
}

pub fn run(args: &ApplyArgs) -> Result<ExitCode> {
    let records = read_records(args.input.as_deref())?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.root.join(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;
    let mut store = FsStore::new(&args.root);

    let plan = if args.dry_run {
        plan_diffs(records, &store, &config)
    } else {
        apply_diffs_with(records, &mut store, &config)
    }
    .context("failed to apply diffs")?;

    print_report(&plan, args.dry_run, args.format)?;

    Ok(match plan.result() {
        ApplyResult::HasConflict => ExitCode::FAILURE,
        ApplyResult::Success | ApplyResult::NoDiffs => ExitCode::SUCCESS,
    })
}

fn read_records(input: Option<&Path>) -> Result<Vec<DiffRecord>> {
    let raw = match input {
        None => read_stdin()?,
        Some(p) if p.as_os_str() == "-" => read_stdin()?,
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?,
    };
    let input: DiffInput = serde_json::from_str(&raw)
        .context("input is neither a list of diff records nor a test tree")?;
    Ok(input.into_records())
}

fn read_stdin() -> Result<String> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read stdin")?;
    Ok(raw)
}

fn print_report(plan: &ApplyPlan, dry_run: bool, format: OutputFormat) -> Result<()> {
    let report = ApplyReport {
        result: plan.result(),
        dry_run,
        files: &plan.files,
        detached: plan.detached,
        duplicates: plan.duplicates,
    };

    match format {
        OutputFormat::Json => println!("{}", format.serialize(&report)?),
        OutputFormat::Text => {
            for file in report.files {
                let status = match file.status {
                    FileStatus::Updated => "updated",
                    FileStatus::Conflicted => "CONFLICT",
                    FileStatus::Skipped => "skipped (missing)",
                };
                println!("{status:<18} {}", file.path.display());
            }
            if report.detached > 0 || report.duplicates > 0 {
                println!(
                    "ignored {} detached and {} duplicate record(s)",
                    report.detached, report.duplicates
                );
            }
            let suffix = if dry_run { " (dry run)" } else { "" };
            println!("result: {}{suffix}", report.result);
        }
    }
    Ok(())
}
