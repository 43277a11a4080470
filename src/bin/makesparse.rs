use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, log_enabled, Level};

use makesparse::{ErrorKind, Sparsifier, Target, MAX_BLOCK_SIZE};

const EXIT_USAGE: i32 = 255;
const EXIT_ACCESS: i32 = 1;
const EXIT_SCAN: i32 = 2;

/// Punch holes in the zero blocks of a file
///
/// The file contents are scanned for blocks that are entirely zero, and the
/// storage behind those blocks is released. The logical file contents are
/// not changed in any way. Requires a file system that supports hole
/// punching.
#[derive(Parser)]
#[command(version, author)]
struct Cli {
    /// File to make sparse
    file: PathBuf,
    /// Scan in blocks of this many bytes instead of the preferred I/O size
    #[arg(
        short,
        long,
        value_name = "BYTES",
        value_parser = clap::value_parser!(u64).range(1..=MAX_BLOCK_SIZE as u64)
    )]
    block_size: Option<u64>,
    /// Find zero blocks without deallocating them
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Show a progress bar
    #[arg(short, long)]
    progress: bool,
    /// Log more details, repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("{bytes}/{total_bytes} [{wide_bar}] {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style)
}

fn makesparse(cli: &Cli) -> Result<()> {
    let target = Target::open(&cli.file)?;
    if target.is_empty() {
        info!("{}: empty, nothing to scan", target.path().display());
        return Ok(());
    }
    let chunk_size = cli
        .block_size
        .map_or(target.block_size(), |size| size as usize);

    let progress = if cli.progress {
        progress_bar(target.len())
    } else {
        ProgressBar::hidden()
    };
    let sparsifier = Sparsifier::new(chunk_size)?
        .dry_run(cli.dry_run)
        .progress(progress.clone());

    let allocated_before = if log_enabled!(Level::Info) {
        Some(target.allocated_bytes()?)
    } else {
        None
    };

    let report = target.sparsify(&sparsifier);
    progress.finish_and_clear();
    let report = report?;

    info!(
        "scanned {} blocks of {} bytes, {} zero, {} bytes punched",
        report.blocks_scanned, chunk_size, report.zero_blocks, report.bytes_punched
    );
    if let Some(before) = allocated_before {
        info!(
            "allocated {} bytes before, {} bytes after",
            before,
            target.allocated_bytes()?
        );
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<makesparse::Error>().map(makesparse::Error::kind) {
        Some(ErrorKind::Scan) => EXIT_SCAN,
        _ => EXIT_ACCESS,
    }
}

fn message(err: &anyhow::Error) -> String {
    format!("error: {}", err)
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
        let _ = err.print();
        process::exit(code);
    });
    init_logging(cli.verbose);

    makesparse(&cli).unwrap_or_else(|err| {
        eprintln!("{}", message(&err));
        process::exit(exit_code(&err));
    });
}
