//! Command-line entry point of the MPVRP-CC solver.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

use mpvrp_cc::config::{ChangeoverBaseline, SolverConfig};
use mpvrp_cc::io::load_instance;
use mpvrp_cc::utils::{print_solution, save_solution};
use mpvrp_cc::Solver;

#[derive(Parser)]
#[command(name = "mpvrp-cc", version, about = "Multi-product vehicle routing with changeover cost")]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve an instance (.dat or .json)
    Solve {
        instance: PathBuf,
        /// Time limit in seconds
        #[arg(short, long, default_value_t = 60.0)]
        time_limit: f64,
        /// Write the solution file here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Measure changeovers from the product each truck delivered last
        #[arg(long)]
        carry_forward: bool,
        /// Seed of the local search
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Check an instance without solving it
    Validate { instance: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Solve {
            instance,
            time_limit,
            output,
            carry_forward,
            seed,
        } => solve(instance, time_limit, output, carry_forward, seed, !cli.quiet),
        Command::Validate { instance } => validate(instance),
    }
}

fn solve(
    path: PathBuf,
    time_limit: f64,
    output: Option<PathBuf>,
    carry_forward: bool,
    seed: u64,
    verbose: bool,
) -> Result<()> {
    if !time_limit.is_finite() || time_limit < 0.0 {
        bail!("time limit must be a non-negative number of seconds");
    }

    let instance = load_instance(&path)
        .with_context(|| format!("failed to load instance {}", path.display()))?;

    let baseline = if carry_forward {
        ChangeoverBaseline::CarryForward
    } else {
        ChangeoverBaseline::PerRound
    };
    let config = SolverConfig::new()
        .with_time_limit(Duration::from_secs_f64(time_limit))
        .with_changeover_baseline(baseline)
        .with_seed(seed)
        .with_verbose(verbose);

    let mut solver = Solver::new(instance, config);
    info!(
        "Configuration: {} products, {} trucks, {} depots, {} stations",
        solver.instance.products.len(),
        solver.instance.trucks.len(),
        solver.instance.depots.len(),
        solver.instance.stations.len()
    );

    if let Err(report) = solver.solve_validated().context("solver aborted")? {
        error!("Instance is invalid ({} issues), not solving", report.issues.len());
        std::process::exit(1);
    }
    let metrics = solver.metrics();

    let solution_report = solver.validate_solution()?;
    for message in solution_report.messages() {
        warn!("{}", message);
    }

    print_solution(&solver.instance, &solver.solution, &metrics);

    if let Some(output) = output {
        save_solution(&solver.instance, &solver.solution, &metrics, &output)
            .with_context(|| format!("failed to write solution {}", output.display()))?;
        info!("Solution written to {}", output.display());
    }

    Ok(())
}

fn validate(path: PathBuf) -> Result<()> {
    let instance = load_instance(&path)
        .with_context(|| format!("failed to load instance {}", path.display()))?;

    let report = mpvrp_cc::validation::validate_instance(&instance);
    if report.is_valid() {
        info!(
            "Instance {} is valid: {} products, {} trucks, {} depots, {} stations",
            instance.name,
            instance.products.len(),
            instance.trucks.len(),
            instance.depots.len(),
            instance.stations.len()
        );
        return Ok(());
    }

    for message in report.messages() {
        error!("{}", message);
    }
    std::process::exit(1);
}
