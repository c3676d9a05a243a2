//! CLI entry point for the lattice solver.
//!
//! Usage:
//!   ice-lattice solve [options]
//!
//! Options:
//!   -m, --num-cols <n>        Number of columns (default: 3)
//!   -n, --num-rows <n>        Number of rows (default: 3)
//!   --config <file>           Model config JSON (weights, substitutions, boundary)
//!   --strategy <name>         brute-force or propagating (default: brute-force)
//!   --specific                Substitute the specific weights into the result
//!   --weight-table <file>     Evaluate numerically with a `<key>,<value>` table
//!   -s, --suppress            Do not print individual solutions
//!   --json                    Print a JSON summary instead of text
//!   -v                        Raise log verbosity (repeatable)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use ice_lattice::{
    partition_function, solve, Dimensions, LatticeState, ModelConfig, Polynomial, SearchStrategy,
    SolverConfig, SpecificWeighting, WeightTable,
};

#[derive(Parser)]
#[command(name = "ice-lattice")]
#[command(about = "Enumerate ice-type lattice configurations and their partition function")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find every legal configuration and sum its weights
    Solve {
        /// Number of columns
        #[arg(short = 'm', long = "num-cols", default_value = "3")]
        columns: usize,

        /// Number of rows
        #[arg(short = 'n', long = "num-rows", default_value = "3")]
        rows: usize,

        /// Model config JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Search backend
        #[arg(long, value_enum, default_value_t = SearchStrategy::BruteForce)]
        strategy: SearchStrategy,

        /// Substitute specific weights (column variables z1, z2, ...)
        #[arg(long)]
        specific: bool,

        /// Numeric weight table, one `<key>,<value>` per line
        #[arg(long, value_name = "FILE")]
        weight_table: Option<PathBuf>,

        /// Do not print individual solutions
        #[arg(short, long)]
        suppress: bool,

        /// Print a JSON summary
        #[arg(long)]
        json: bool,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    columns: usize,
    rows: usize,
    strategy: SearchStrategy,
    solution_count: usize,
    states_tested: usize,
    branches: usize,
    time_elapsed_ms: u64,
    specific: bool,
    partition_function: String,
    latex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    numeric_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solutions: Option<Vec<String>>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // fails only when a logger is already installed
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Never);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            columns,
            rows,
            config,
            strategy,
            specific,
            weight_table,
            suppress,
            json,
        } => {
            let model = match &config {
                Some(path) => ModelConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => ModelConfig::default(),
            };
            let table = weight_table
                .as_deref()
                .map(|path| {
                    WeightTable::load(path)
                        .with_context(|| format!("failed to read weight table {}", path.display()))
                })
                .transpose()?;

            let dims = Dimensions::new(columns, rows)?;
            let state = LatticeState::initial(dims, &model.boundary_fill(dims))?;
            let legal = model.legal_pieces();
            debug!("{} legal pieces, boundary {:?}", legal.len(), model.boundary_fill(dims));

            let result = solve(&state, &legal, &SolverConfig { strategy })?;

            let z: Polynomial = if specific {
                let values = model.specific_weights();
                partition_function(&result.solutions, &SpecificWeighting::new(&model.weights, &values))?
            } else {
                partition_function(&result.solutions, &model.weights)?
            };
            let numeric_value = table
                .as_ref()
                .map(|t| t.numeric_partition_function(&result.solutions))
                .transpose()?;

            if json {
                let output = SolveOutput {
                    columns,
                    rows,
                    strategy,
                    solution_count: result.solutions.len(),
                    states_tested: result.stats.states_tested,
                    branches: result.stats.branches,
                    time_elapsed_ms: result.time_elapsed_ms,
                    specific,
                    partition_function: z.to_string(),
                    latex: z.to_latex(),
                    numeric_value,
                    solutions: if suppress {
                        None
                    } else {
                        Some(result.solutions.iter().map(|s| s.to_string()).collect())
                    },
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!("\nInitial state:\n");
            print!("{}", state);
            println!();

            let count = result.solutions.len();
            println!(
                "Found {} solution{}{}\n",
                count,
                if count == 1 { "" } else { "s" },
                if suppress || count == 0 { "." } else { ":" }
            );
            if !suppress {
                for solution in &result.solutions {
                    println!("{}", solution);
                }
            }

            println!("Partition function: {}", z);
            println!("LaTeX: {}", z.to_latex());
            if let Some(value) = numeric_value {
                println!("Numeric value: {}", value);
            }
        }
    }

    Ok(())
}
