#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use sudoku_solver::puzzle::grid::Grid;
use sudoku_solver::solver::engine::{Engine, EngineError};
use sudoku_solver::solver::mask::MaskWord;
use sudoku_solver::solver::search::SearchStats;
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the sudoku solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "sudoku-solver", version, about = "A bitmask Sudoku solver")]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand,
    /// it's treated as the path to a puzzle file to solve.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `line`, `file`, `dir`, `repl`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands for the sudoku solver.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a puzzle given directly as a token string
    /// (one character per cell, '0' for empty, 'A'..'Z' for values above 9).
    Line {
        /// The puzzle as a flat token string.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every puzzle in a file, one puzzle per line.
    /// Blank lines and lines starting with '#' are skipped.
    File {
        /// Path to the puzzle file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Walk a directory tree and solve every `.sudoku` file found.
    Dir {
        /// Path to the directory to walk.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Read puzzles interactively from standard input, one per line.
    Repl {
        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output, providing more verbose logging during solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Re-check the produced grid against the givens and the no-duplicate
    /// rule after a successful solve.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Enable printing of puzzle and search statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print the solved grid row by row in addition to the one-line form.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Use 64-bit value masks, raising the side-length ceiling from 25 to 49.
    #[arg(long, default_value_t = false)]
    pub(crate) wide: bool,
}

/// A cooperative stop flag threaded through the batch loops and checked
/// between puzzles. The engine itself has no cancellation points, so a solve
/// in flight always runs to completion.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the running state.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Requests that batch loops holding this token stop before their next
    /// puzzle.
    #[allow(dead_code)]
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Engines keyed by side length, built on first use and reused for every
/// later puzzle of that size in the batch.
struct EngineCache<M: MaskWord> {
    engines: FxHashMap<usize, Engine<M>>,
}

impl<M: MaskWord> Default for EngineCache<M> {
    fn default() -> Self {
        Self {
            engines: FxHashMap::default(),
        }
    }
}

impl<M: MaskWord> EngineCache<M> {
    fn engine_for(&mut self, side: usize) -> Result<&Engine<M>, EngineError> {
        match self.engines.entry(side) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Engine::new(side)?)),
        }
    }
}

/// Solves a single puzzle string with a throwaway engine cache.
pub(crate) fn solve_line(input: &str, common: &CommonOptions) -> Result<(), String> {
    if common.wide {
        solve_one::<u64>(input, None, &mut EngineCache::default(), common)
    } else {
        solve_one::<u32>(input, None, &mut EngineCache::default(), common)
    }
}

/// Solves every puzzle line of a file.
///
/// # Errors
///
/// If the file cannot be read. Individual bad lines are reported to stderr
/// and do not stop the batch.
pub(crate) fn solve_file(
    path: &Path,
    common: &CommonOptions,
    cancel: &CancelToken,
) -> Result<(), String> {
    if common.wide {
        solve_file_with::<u64>(path, common, cancel)
    } else {
        solve_file_with::<u32>(path, common, cancel)
    }
}

fn solve_file_with<M: MaskWord>(
    path: &Path,
    common: &CommonOptions,
    cancel: &CancelToken,
) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Puzzle file does not exist: {}", path.display()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Unable to read {}: {e}", path.display()))?;

    let mut cache = EngineCache::<M>::default();
    if !solve_content(&content, path, &mut cache, common, cancel) {
        println!("Cancelled.");
    }
    Ok(())
}

/// Walks a directory and solves every `.sudoku` file found.
///
/// # Errors
///
/// If the path is not a directory or a matching file cannot be read.
pub(crate) fn solve_dir(
    path: &Path,
    common: &CommonOptions,
    cancel: &CancelToken,
) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!(
            "Provided path is not a directory: {}",
            path.display()
        ));
    }
    if common.wide {
        solve_dir_with::<u64>(path, common, cancel)
    } else {
        solve_dir_with::<u32>(path, common, cancel)
    }
}

fn solve_dir_with<M: MaskWord>(
    path: &Path,
    common: &CommonOptions,
    cancel: &CancelToken,
) -> Result<(), String> {
    let mut cache = EngineCache::<M>::default();

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
    {
        if cancel.is_cancelled() {
            println!("Cancelled.");
            return Ok(());
        }

        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "sudoku") {
            eprintln!("Skipping non-puzzle file: {}", file_path.display());
            continue;
        }

        let content = std::fs::read_to_string(file_path)
            .map_err(|e| format!("Unable to read {}: {e}", file_path.display()))?;
        if !solve_content(&content, file_path, &mut cache, common, cancel) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    Ok(())
}

/// Reads puzzles interactively from standard input until EOF, a blank line
/// or "quit".
///
/// # Errors
///
/// If standard input or output fails.
pub(crate) fn run_repl(common: &CommonOptions) -> Result<(), String> {
    if common.wide {
        run_repl_with::<u64>(common)
    } else {
        run_repl_with::<u32>(common)
    }
}

fn run_repl_with<M: MaskWord>(common: &CommonOptions) -> Result<(), String> {
    let stdin = io::stdin();
    let mut cache = EngineCache::<M>::default();
    println!("Enter one puzzle per line; blank line or \"quit\" exits.");

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        let line = line.trim();
        if read == 0 || line.is_empty() || line == "quit" {
            return Ok(());
        }

        if let Err(e) = solve_one::<M>(line, None, &mut cache, common) {
            eprintln!("{e}");
        }
    }
}

/// Solves every puzzle line of a batch file's content, sharing the engine
/// cache. Returns `false` when the token was cancelled before finishing.
fn solve_content<M: MaskWord>(
    content: &str,
    source: &Path,
    cache: &mut EngineCache<M>,
    common: &CommonOptions,
    cancel: &CancelToken,
) -> bool {
    for (number, line) in puzzle_lines(content) {
        if cancel.is_cancelled() {
            return false;
        }
        let label = format!("{}:{number}", source.display());
        if let Err(e) = solve_one::<M>(line, Some(&label), cache, common) {
            eprintln!("{label}: {e}");
        }
    }
    true
}

/// Extracts the puzzle lines of a batch file as (1-based line number, line):
/// one puzzle per line, blank lines and `#` comments skipped.
fn puzzle_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect_vec()
}

/// Parses one puzzle, solves it and reports the outcome, statistics and
/// verification per the common options.
fn solve_one<M: MaskWord>(
    input: &str,
    label: Option<&str>,
    cache: &mut EngineCache<M>,
    common: &CommonOptions,
) -> Result<(), String> {
    let parse_start = Instant::now();
    let given = input.parse::<Grid>().map_err(|e| e.to_string())?;
    let parse_time = parse_start.elapsed();

    let engine = cache.engine_for(given.side()).map_err(|e| e.to_string())?;

    if let Some(name) = label {
        println!("Solving: {name}");
    }

    if common.debug {
        println!("Puzzle:\n{given}");
        println!("Side: {}", given.side());
        println!("Region: {}", given.region());
        println!("Empty cells: {}", given.empty_count());
    }

    epoch::advance().unwrap();

    let mut work = given.clone();
    let solve_start = Instant::now();
    let (solved, search_stats) = engine.solve_with_stats(&mut work);
    let elapsed = solve_start.elapsed();

    epoch::advance().unwrap();
    let allocated_bytes = stats::allocated::mib().unwrap().read().unwrap();
    let resident_bytes = stats::resident::mib().unwrap().read().unwrap();
    let allocated_mib = allocated_bytes as f64 / (1024.0 * 1024.0);
    let resident_mib = resident_bytes as f64 / (1024.0 * 1024.0);

    if common.verify {
        verify_solution(&given, &work, solved);
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            &given,
            &search_stats,
            allocated_mib,
            resident_mib,
        );
    }

    if solved {
        println!("Solution: {}", work.to_line());
        if common.print_solution {
            println!("{work}");
        }
        println!("\nSOLVED");
    } else {
        println!("\nUNSOLVABLE");
    }

    Ok(())
}

/// Verifies a successful solve against the original givens.
///
/// Prints whether the verification was successful. If verification fails,
/// it panics.
pub(crate) fn verify_solution(given: &Grid, result: &Grid, solved: bool) {
    if solved {
        let ok = is_valid_completion(given, result);
        println!("Verified: {ok:?}");
        assert!(ok, "Solution failed verification!");
    } else {
        println!("No solution to verify");
    }
}

/// Checks that `result` is fully filled with values in range, free of
/// duplicates in every row, column and box, and preserves every given.
fn is_valid_completion(given: &Grid, result: &Grid) -> bool {
    let side = given.side();
    let region = given.region();
    if result.side() != side {
        return false;
    }

    let full = (1u64 << side) - 1;
    let mut rows = vec![0u64; side];
    let mut cols = vec![0u64; side];
    let mut boxes = vec![0u64; side];

    for row in 0..side {
        for col in 0..side {
            let value = result.get(row, col);
            let was = given.get(row, col);
            if value == 0 || usize::from(value) > side || (was != 0 && was != value) {
                return false;
            }

            let bit = 1u64 << (value - 1);
            let box_index = (row / region) * region + col / region;
            if rows[row] & bit != 0 || cols[col] & bit != 0 || boxes[box_index] & bit != 0 {
                return false;
            }
            rows[row] |= bit;
            cols[col] |= bit;
            boxes[box_index] |= bit;
        }
    }

    rows.iter().chain(&cols).chain(&boxes).all(|&m| m == full)
}

/// Helper function to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of puzzle and search statistics.
fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    given: &Grid,
    s: &SearchStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Puzzle Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Side length", given.side());
    stat_line("Region size", given.region());
    stat_line("Givens", given.side() * given.side() - given.empty_count());
    stat_line("Empty cells", given.empty_count());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    stat_line_with_rate("Naked singles", s.naked_singles, elapsed_secs);
    stat_line_with_rate("Hidden singles", s.hidden_singles, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sudoku_solver::puzzle::grid::{EXAMPLE_NINE, EXAMPLE_NINE_SOLVED};

    #[test]
    fn test_puzzle_lines_skip_comments_and_blanks() {
        let content = "# header\n\n   \n123\n# note\n456\n";
        assert_eq!(puzzle_lines(content), vec![(4, "123"), (6, "456")]);
    }

    #[test]
    fn test_valid_completion_accepts_solution() {
        let given: Grid = EXAMPLE_NINE.parse().unwrap();
        let solved: Grid = EXAMPLE_NINE_SOLVED.parse().unwrap();
        assert!(is_valid_completion(&given, &solved));
    }

    #[test]
    fn test_valid_completion_rejects_clobbered_given() {
        let mut given: Grid = EXAMPLE_NINE.parse().unwrap();
        let solved: Grid = EXAMPLE_NINE_SOLVED.parse().unwrap();
        // The solution keeps the original 7 here, so a changed given must fail.
        given.set(0, 1, 1);
        assert!(!is_valid_completion(&given, &solved));
    }

    #[test]
    fn test_valid_completion_rejects_incomplete_grid() {
        let given: Grid = EXAMPLE_NINE.parse().unwrap();
        assert!(!is_valid_completion(&given, &given));
    }

    #[test]
    fn test_cancel_token_stops_batch() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut cache = EngineCache::<u32>::default();
        let common = CommonOptions::default();
        let finished = solve_content(
            EXAMPLE_NINE,
            Path::new("memory"),
            &mut cache,
            &common,
            &cancel,
        );
        assert!(!finished);
    }

    #[test]
    fn test_engine_cache_reuses_and_propagates_errors() {
        let mut cache = EngineCache::<u32>::default();
        assert!(cache.engine_for(9).is_ok());
        assert!(cache.engine_for(9).is_ok());
        assert_eq!(
            cache.engine_for(6).unwrap_err(),
            EngineError::NotSquareSide { side: 6 }
        );
        assert_eq!(
            cache.engine_for(49).unwrap_err(),
            EngineError::SideTooLarge { side: 49, bits: 32 }
        );
    }
}
