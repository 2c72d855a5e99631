//! Basic example of using the MPVRP-CC library.

use mpvrp_cc::config::SolverConfig;
use mpvrp_cc::io::load_instance;
use mpvrp_cc::utils::{format_duration, print_solution, save_solution};
use mpvrp_cc::Solver;
use std::env;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get instance path from command line or use default
    let args: Vec<String> = env::args().collect();
    let instance_path = if args.len() > 1 {
        &args[1]
    } else {
        "instances/MPVRP_01_s5_d1_p2.dat"
    };

    // Load instance
    println!("Loading instance from: {}", instance_path);
    let instance = load_instance(instance_path)?;
    println!(
        "Loaded instance: {} with {} stations and {} products",
        instance.name,
        instance.stations.len(),
        instance.products.len()
    );

    // Configure solver
    let config = SolverConfig::new()
        .with_time_limit(Duration::from_secs(30))
        .with_oracle_time_fraction(0.5)
        .with_granularity(20)
        .with_seed(42);

    let mut solver = Solver::new(instance, config);

    let report = solver.validate_instance();
    if !report.is_valid() {
        for message in report.messages() {
            println!("Invalid instance: {}", message);
        }
        return Ok(());
    }

    println!("Starting decomposition");
    solver.solve()?;
    let metrics = solver.metrics();

    // Print results
    println!("Solved in {}", format_duration(solver.run_time));
    print_solution(&solver.instance, &solver.solution, &metrics);

    let solution_report = solver.validate_solution()?;
    println!("Solution valid: {}", solution_report.is_valid());

    // Save solution
    let output_path = format!("Sol_{}", solver.instance.name);
    println!("Saving solution to: {}", output_path);
    save_solution(&solver.instance, &solver.solution, &metrics, &output_path)?;

    Ok(())
}
