use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tdmerge::telemetry::{self, LogFormat};

mod apply_cmd;
mod format;
mod merge_cmd;

/// Write failing tests' actual output back into their expected-data files
///
/// Several failing tests may target the same file. Their outputs are folded
/// through a line-based three-way merge against the file's expected text,
/// so independent changes are all kept and overlapping ones are marked:
///
///   <<<<<<< LEFT
///   ...already folded...
///   =======
///   ...next test's output...
///   >>>>>>> RIGHT
///
/// QUICK START:
///
///   # records: [{"file_path": "...", "expected": "...", "actual": "..."}]
///   tdmerge apply diffs.json --root path/to/testdata
///
///   # preview without writing
///   tdmerge apply diffs.json --dry-run --format json
///
/// EXIT STATUS:
///
///   0  success, or nothing to apply
///   1  at least one file was written with conflict markers
///   2  error (nothing written)
#[derive(Parser)]
#[command(name = "tdmerge")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(verbatim_doc_comment)]
#[command(
    after_help = "See 'tdmerge <command> --help' for more information on a specific command."
)]
struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace); TDMERGE_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply diff records (or a test tree) to their files
    ///
    /// Reads JSON from INPUT or stdin. Records without a file path are
    /// ignored, as are records repeating an earlier record's actual text
    /// for the same file. All files are written as one batch: if any write
    /// fails, none of them change.
    Apply(apply_cmd::ApplyArgs),

    /// Three-way merge of LEFT and RIGHT against BASE
    ///
    /// Prints the result (or writes it to -o) with BASE's line separator.
    /// Exits 1 if the result contains conflict markers.
    Merge(merge_cmd::MergeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.log_format, cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Apply(args) => apply_cmd::run(args),
        Commands::Merge(args) => merge_cmd::run(args),
    }
}
