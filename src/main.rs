//! # dpll-sat
//!
//! Command-line front end of the solver. It reads problems in DIMACS CNF
//! format from a file, from the command line, or from every `.cnf` file
//! below a directory, and prints the verdict together with search and
//! memory statistics.
//!
//! ## Usage
//!
//! ```sh
//! dpll-sat problem.cnf
//! dpll-sat file --path problem.cnf --backjump chronological --proposition vsids
//! dpll-sat text --input "1 -2 0\n2 3 0" --print-solution
//! dpll-sat dir --path benchmarks/ --cutoff 30
//! dpll-sat completions zsh
//! ```
//!
//! Common options:
//!
//! -   `-d, --debug`: debug logging (`RUST_LOG` is honoured otherwise).
//! -   `-v, --verify <BOOL>`: check a found model (default: `true`).
//! -   `-s, --stats <BOOL>`: print the statistics table (default: `true`).
//! -   `-p, --print-solution`: print the model as a `v` line.
//! -   `--cutoff <SECS>`: wall-clock budget (default: 1200).
//! -   `--backjump <conflict-driven|chronological>`.
//! -   `--proposition <false|random|two-clause|vsids>`.
//! -   `--assignment <false|true|random|majority|minority>`.
//! -   `--seed <N>`: seed for the random heuristics.
//! -   `--no-pure-literals`: disable pure-literal deletion.
//!
//! The process exits with 10 on SATISFIABLE, 20 on UNSATISFIABLE and 0 when
//! the answer is UNKNOWN, following the usual SAT competition convention;
//! errors exit with 1.

use crate::command_line::cli::{Cli, Commands, CommonOptions, solve_dir, solve_file, solve_text};
use clap::{CommandFactory, Parser};
use dpll_sat::sat::solver::DpllResult;
use log::LevelFilter;
use std::process::ExitCode;

mod command_line {
    pub(crate) mod cli;
}

/// Global allocator using `tikv-jemallocator`, which also provides the
/// memory figures of the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(common: &CommonOptions) {
    let mut builder = env_logger::Builder::from_default_env();
    if common.debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

const fn exit_code(result: DpllResult) -> u8 {
    match result {
        DpllResult::Satisfiable => 10,
        DpllResult::Unsatisfiable => 20,
        DpllResult::Unknown => 0,
    }
}

fn run(cli: Cli) -> Result<u8, String> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            init_logging(&common);
            solve_file(&path, &common).map(exit_code)
        }
        Some(Commands::Text { input, common }) => {
            init_logging(&common);
            solve_text(&input, &common).map(exit_code)
        }
        Some(Commands::Dir { path, common }) => {
            init_logging(&common);
            solve_dir(&path, &common).map(|()| 0)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(0)
        }
        None => {
            init_logging(&cli.common);
            let Some(path) = cli.path else {
                return Err("No command provided. Use --help for more information.".to_string());
            };
            solve_file(&path, &cli.common).map(exit_code)
        }
    }
}

/// Parses the command line, dispatches to the requested command and maps
/// the verdict to the exit status.
fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
