use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use tile_2048::trace::{self, SESSION_EXT};
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(name = "replay", about = "Verify that recorded 2048 sessions replay identically")]
struct Args {
    /// A single .g2s file or a directory containing .g2s files
    input: PathBuf,

    /// Only scan the top level of a directory
    #[arg(long)]
    no_recursive: bool,

    /// Number of worker threads (defaults to Rayon default)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,

    /// Print every session, not only failures
    #[arg(short, long)]
    verbose: bool,
}

enum Outcome {
    Match,
    Diverged { recorded: u64, replayed: u64 },
    Unreadable(trace::TraceError),
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Some(n) = args.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let files = collect_sessions(&args.input, !args.no_recursive)?;
    if files.is_empty() {
        warn!("No .{SESSION_EXT} files found in {}", args.input.display());
        return Ok(());
    }
    info!("Verifying {} session(s)", files.len());

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:40}] {pos}/{len}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let outcomes: Vec<(PathBuf, Outcome)> = files
        .into_par_iter()
        .map(|path| {
            let outcome = verify(&path);
            pb.inc(1);
            (path, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut matched = 0;
    let mut failed = 0;
    for (path, outcome) in &outcomes {
        match outcome {
            Outcome::Match => {
                matched += 1;
                if args.verbose {
                    println!("ok       {}", path.display());
                }
            }
            Outcome::Diverged { recorded, replayed } => {
                failed += 1;
                error!("{} diverged: recorded score {recorded}, replayed {replayed}", path.display());
            }
            Outcome::Unreadable(e) => {
                failed += 1;
                error!("{} unreadable: {e}", path.display());
            }
        }
    }

    println!("Replay complete: {matched} matched, {failed} failed");
    if failed > 0 {
        anyhow::bail!("{failed} session(s) did not replay cleanly");
    }
    Ok(())
}

fn verify(path: &Path) -> Outcome {
    match trace::parse_session_file(path) {
        Ok(session) => {
            let out = trace::replay(&session);
            if out.matches {
                Outcome::Match
            } else {
                Outcome::Diverged { recorded: session.meta.final_score, replayed: out.final_score }
            }
        }
        Err(e) => Outcome::Unreadable(e),
    }
}

fn collect_sessions(input: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input path '{}' is neither a file nor directory", input.display());
    }
    let walker = if recursive {
        WalkDir::new(input).into_iter()
    } else {
        WalkDir::new(input).max_depth(1).into_iter()
    };
    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == SESSION_EXT) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
