#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use dpll_sat::sat::cnf::CnfFormula;
use dpll_sat::sat::config::{BackjumpPolicy, DpllConfig};
use dpll_sat::sat::dimacs::{parse_file, parse_str};
use dpll_sat::sat::dpll::dpll_with_config;
use dpll_sat::sat::phase_selection::{
    AssignmentHeuristic, FalseFirst, RandomAssignment, TrueFirst, VoteAssignment,
};
use dpll_sat::sat::solver::{DpllOutcome, DpllResult};
use dpll_sat::sat::variable_selection::{
    FalseComparator, PropositionHeuristic, RandomComparator, TwoClauseComparator,
};
use dpll_sat::sat::vsids::VsidsComparator;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface of the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "dpll-sat", version, about = "An iterative DPLL SAT solver")]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file, solved when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `dir`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable when solving the global path.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// DIMACS clauses as a string (e.g. "1 -2 0\n2 3 0").
        /// A literal `\n` is read as a line break.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` file below a directory.
    Dir {
        /// Directory to walk.
        #[arg(long)]
        path: PathBuf,

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

/// Branching strategy for the proposition of each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum PropositionChoice {
    /// Lowest unassigned proposition.
    #[default]
    False,
    Random,
    /// Most occurrences in open binary clauses.
    TwoClause,
    Vsids,
}

impl fmt::Display for PropositionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::False => write!(f, "false"),
            Self::Random => write!(f, "random"),
            Self::TwoClause => write!(f, "two-clause"),
            Self::Vsids => write!(f, "vsids"),
        }
    }
}

impl PropositionChoice {
    pub(crate) fn to_heuristic(self, seed: Option<u64>) -> Box<dyn PropositionHeuristic> {
        match self {
            Self::False => Box::new(FalseComparator),
            Self::Random => Box::new(seed.map_or_else(RandomComparator::new, RandomComparator::with_seed)),
            Self::TwoClause => Box::new(TwoClauseComparator::new(FalseComparator)),
            Self::Vsids => Box::new(VsidsComparator::new(FalseComparator)),
        }
    }
}

/// Strategy for the value tried first on a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum AssignmentChoice {
    #[default]
    False,
    True,
    Random,
    /// The polarity with more occurrences in open clauses.
    Majority,
    /// The polarity with fewer occurrences in open clauses.
    Minority,
}

impl fmt::Display for AssignmentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::False => write!(f, "false"),
            Self::True => write!(f, "true"),
            Self::Random => write!(f, "random"),
            Self::Majority => write!(f, "majority"),
            Self::Minority => write!(f, "minority"),
        }
    }
}

impl AssignmentChoice {
    pub(crate) fn to_heuristic(self, seed: Option<u64>) -> Box<dyn AssignmentHeuristic> {
        match self {
            Self::False => Box::new(FalseFirst),
            Self::True => Box::new(TrueFirst),
            Self::Random => Box::new(
                seed.map_or_else(RandomAssignment::default, RandomAssignment::with_seed),
            ),
            Self::Majority => Box::new(VoteAssignment::majority()),
            Self::Minority => Box::new(VoteAssignment::minority()),
        }
    }
}

/// Defines common command-line options shared across the subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the formula.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment as DIMACS literals.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Wall-clock budget in seconds; the answer is UNKNOWN once it runs out.
    #[arg(long, default_value_t = 1200.0)]
    pub(crate) cutoff: f64,

    /// What to do after a conflict: `conflict-driven` or `chronological`.
    #[arg(long, default_value_t = BackjumpPolicy::ConflictDriven)]
    pub(crate) backjump: BackjumpPolicy,

    #[arg(long, value_enum, default_value_t = PropositionChoice::False)]
    pub(crate) proposition: PropositionChoice,

    #[arg(long, value_enum, default_value_t = AssignmentChoice::False)]
    pub(crate) assignment: AssignmentChoice,

    /// Seed for the random heuristics.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Never apply pure-literal deletion.
    #[arg(long, default_value_t = false)]
    pub(crate) no_pure_literals: bool,
}

impl CommonOptions {
    /// Builds the solver configuration from the options.
    ///
    /// # Errors
    ///
    /// If the cutoff is negative or not finite.
    pub(crate) fn config(&self) -> Result<DpllConfig, String> {
        let cutoff = Duration::try_from_secs_f64(self.cutoff)
            .map_err(|e| format!("invalid cutoff {}: {e}", self.cutoff))?;

        Ok(DpllConfig::default()
            .with_cutoff(cutoff)
            .with_backjump(self.backjump)
            .with_pure_literal_deletion(!self.no_pure_literals))
    }
}

/// Parses and solves a DIMACS file.
///
/// # Errors
///
/// If the file cannot be read or parsed, or if a model fails verification.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<DpllResult, String> {
    let time = Instant::now();
    let formula = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&formula, common, Some(path), parse_time)
}

/// Parses and solves DIMACS clauses given on the command line.
///
/// # Errors
///
/// If the input cannot be parsed, or if a model fails verification.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<DpllResult, String> {
    let time = Instant::now();
    let formula = parse_str(&input.replace("\\n", "\n")).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    solve_and_report(&formula, common, None, parse_time)
}

/// Solves a directory of CNF files.
///
/// Iterates over all `.cnf` files below `path`, solving and reporting each.
///
/// # Errors
///
/// If `path` is not a directory, or if any file fails to parse or verify.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    let mut tally = [0usize; 3];
    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            debug!("skipping non-CNF file {}", file_path.display());
            continue;
        }

        match solve_file(file_path, common)? {
            DpllResult::Satisfiable => tally[0] += 1,
            DpllResult::Unsatisfiable => tally[1] += 1,
            DpllResult::Unknown => tally[2] += 1,
        }
    }

    println!(
        "\n{} satisfiable, {} unsatisfiable, {} unknown",
        tally[0], tally[1], tally[2]
    );
    Ok(())
}

/// Checks a found model against the formula.
///
/// # Errors
///
/// If the model does not satisfy every clause.
pub(crate) fn verify_solution(formula: &CnfFormula, outcome: &DpllOutcome) -> Result<(), String> {
    let Some(assignment) = &outcome.assignment else {
        return Ok(());
    };

    let ok = formula.verify(assignment);
    println!("Verified: {ok}");
    if ok {
        Ok(())
    } else {
        Err("Solution failed verification!".to_string())
    }
}

/// Solves `formula` with the configured heuristics.
///
/// # Errors
///
/// If the options describe an invalid configuration.
pub(crate) fn solve(formula: &CnfFormula, common: &CommonOptions) -> Result<DpllOutcome, String> {
    let config = common.config()?;
    let prop = common.proposition.to_heuristic(common.seed);
    let assign = common.assignment.to_heuristic(common.seed);

    debug!(
        "solving with {} propositions, {} assignments, {} backjump",
        common.proposition, common.assignment, config.backjump
    );

    Ok(dpll_with_config(formula, prop, assign, &config))
}

/// Solves `formula` and reports the verdict, statistics and verification.
///
/// # Errors
///
/// If the configuration is invalid or the model fails verification.
pub(crate) fn solve_and_report(
    formula: &CnfFormula,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<DpllResult, String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    debug!(
        "{} propositions, {} clauses, {} literals",
        formula.num_props(),
        formula.num_clauses(),
        formula.num_literals()
    );

    let outcome = solve(formula, common)?;
    info!("{}", outcome.stats);

    if common.verify {
        verify_solution(formula, &outcome)?;
    }

    if common.stats {
        print_stats(parse_time, formula, &outcome, memory_usage());
    }

    if common.print_solution
        && let Some(model) = outcome.model()
    {
        let literals = model.iter().map(i32::to_string).collect::<Vec<_>>();
        println!("v {} 0", literals.join(" "));
    }

    println!("\n{}", verdict_line(outcome.result));
    Ok(outcome.result)
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
pub(crate) fn memory_usage() -> Option<(f64, f64)> {
    if let Err(e) = epoch::advance() {
        warn!("unable to refresh jemalloc statistics: {e}");
        return None;
    }

    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;

    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

pub(crate) const fn verdict_line(result: DpllResult) -> &'static str {
    match result {
        DpllResult::Satisfiable => "SATISFIABLE",
        DpllResult::Unsatisfiable => "UNSATISFIABLE",
        DpllResult::Unknown => "UNKNOWN",
    }
}

/// Prints a single statistic in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints a statistic together with its rate per second.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
///
/// # Arguments
///
/// * `parse_time` - Duration spent parsing the input.
/// * `formula` - The input formula.
/// * `outcome` - What the solver reported.
/// * `memory` - Allocated and resident memory in MiB, if jemalloc reported them.
pub(crate) fn print_stats(
    parse_time: Duration,
    formula: &CnfFormula,
    outcome: &DpllOutcome,
    memory: Option<(f64, f64)>,
) {
    let s = &outcome.stats;
    let elapsed_secs = s.elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Propositions", formula.num_props());
    stat_line("Clauses", formula.num_clauses());
    stat_line("Literals", formula.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line("Iterations", s.iterations);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line("Pure literals", s.pure_literals);
    stat_line("Backjumps", s.backjumps);
    stat_line("Learned clauses", s.learned_clauses);
    stat_line("Learned LBD (EMA)", format!("{:.2}", s.lbd_ema));
    stat_line("Max decision level", s.max_decision_level);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> CommonOptions {
        let cli = Cli::parse_from(std::iter::once("dpll-sat").chain(args.iter().copied()));
        cli.common
    }

    #[test]
    fn test_default_options() {
        let common = options(&[]);
        assert!(common.verify);
        assert!(common.stats);
        assert!(!common.print_solution);
        assert_eq!(common.proposition, PropositionChoice::False);
        assert_eq!(common.assignment, AssignmentChoice::False);

        let config = common.config().unwrap();
        assert_eq!(config, DpllConfig::default());
    }

    #[test]
    fn test_options_build_config() {
        let common = options(&[
            "--cutoff",
            "2.5",
            "--backjump",
            "chronological",
            "--proposition",
            "two-clause",
            "--assignment",
            "minority",
            "--no-pure-literals",
            "--stats",
            "false",
        ]);
        assert!(!common.stats);
        assert_eq!(common.proposition, PropositionChoice::TwoClause);
        assert_eq!(common.assignment, AssignmentChoice::Minority);

        let config = common.config().unwrap();
        assert_eq!(config.cutoff, Duration::from_millis(2500));
        assert_eq!(config.backjump, BackjumpPolicy::Chronological);
        assert!(!config.pure_literal_deletion);
    }

    #[test]
    fn test_negative_cutoff_is_rejected() {
        let common = CommonOptions {
            cutoff: -1.0,
            ..CommonOptions::default()
        };
        assert!(common.config().is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::parse_from(["dpll-sat", "text", "--input", "1 0", "--seed", "7"]);
        match cli.command {
            Some(Commands::Text { input, common }) => {
                assert_eq!(input, "1 0");
                assert_eq!(common.seed, Some(7));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["dpll-sat", "problem.cnf"]);
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_every_heuristic_solves() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-1, 2], vec![-2, 3], vec![-3, -1]]);
        for prop in PropositionChoice::value_variants() {
            for assign in AssignmentChoice::value_variants() {
                let common = CommonOptions {
                    cutoff: 10.0,
                    proposition: *prop,
                    assignment: *assign,
                    seed: Some(3),
                    ..CommonOptions::default()
                };
                let outcome = solve(&formula, &common).unwrap();
                assert!(outcome.is_sat(), "{prop} / {assign}");
                assert!(verify_solution(&formula, &outcome).is_ok());
            }
        }
    }

    #[test]
    fn test_verdict_line() {
        assert_eq!(verdict_line(DpllResult::Satisfiable), "SATISFIABLE");
        assert_eq!(verdict_line(DpllResult::Unsatisfiable), "UNSATISFIABLE");
        assert_eq!(verdict_line(DpllResult::Unknown), "UNKNOWN");
    }
}
