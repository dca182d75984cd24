//! # sudoku-solver
//!
//! A command-line solver for Sudoku puzzles and their N²×N² generalisations,
//! built on bitmask constraint tracking and heuristic backtracking.
//!
//! A puzzle is a flat token string, one character per cell in row-major
//! order: `'0'` for an empty cell, `'1'..'9'` for values 1..9 and
//! `'A'..'Z'` (case-insensitive) for values 10..35. The grid side must be a
//! perfect square (4, 9, 16, 25, ...), so classic 9×9 puzzles are 81
//! characters.
//!
//! ## Usage
//!
//! ```sh
//! # Solve every puzzle in a file (one per line, '#' comments allowed)
//! sudoku-solver puzzles.sudoku
//!
//! # Solve a single puzzle given on the command line
//! sudoku-solver line --input "070000043040009610800634900094052000358460020000800530080070091902100005007040802"
//!
//! # Walk a directory tree and solve every .sudoku file found
//! sudoku-solver dir --path puzzles/
//!
//! # Read puzzles interactively
//! sudoku-solver repl
//! ```
//!
//! Common options: `--debug` for verbose output, `--verify` to re-check the
//! produced solution, `--stats` for the statistics table,
//! `--print-solution` for a row-by-row rendering, and `--wide` to use 64-bit
//! value masks (sides up to 49 instead of 25).
//!
//! Unsolvable puzzles are reported as `UNSOLVABLE` and are not process
//! errors; bad input and unsupported sizes exit with status 1.

use clap::{CommandFactory, Parser};

use crate::command_line::cli::{CancelToken, Cli, Commands};

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// usage figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Main entry point of the sudoku solver application.
///
/// Parses command-line arguments, dispatches to the appropriate command
/// handler, and manages the overall execution flow.
fn main() {
    let cli = Cli::parse();

    // Handle the case where a path is provided globally without a subcommand.
    // This defaults to solving a puzzle file.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            let cancel = CancelToken::new();
            exit_on_error(command_line::cli::solve_file(&path, &cli.common, &cancel));
            return;
        }
    }

    match cli.command {
        Some(Commands::Line { input, common }) => {
            exit_on_error(command_line::cli::solve_line(&input, &common));
        }

        Some(Commands::File { path, common }) => {
            let cancel = CancelToken::new();
            exit_on_error(command_line::cli::solve_file(&path, &common, &cancel));
        }

        Some(Commands::Dir { path, common }) => {
            let cancel = CancelToken::new();
            exit_on_error(command_line::cli::solve_dir(&path, &common, &cancel));
        }

        Some(Commands::Repl { common }) => {
            exit_on_error(command_line::cli::run_repl(&common));
        }

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sudoku-solver", &mut std::io::stdout());
        }

        None => {
            // Reached only when no subcommand and no global path were given.
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(1);
        }
    }
}

/// Reports a handler error to stderr and exits with status 1.
fn exit_on_error(result: Result<(), String>) {
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
