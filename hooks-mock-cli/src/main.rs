//! Hooks Mock CLI Application
//!
//! Runs declarative hook scenarios (TOML) against the hooks-mock registry:
//! - Registers, removes and fires hooks step by step
//! - Checks queries and assertions against expected outcomes
//! - Reports per-scenario results and optionally dumps the final registry

use anyhow::{bail, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;

mod config;
mod report;
mod runner;

use runner::{ScenarioReport, ScenarioRunner};

/// Hooks Mock - Run hook registry scenarios
#[derive(Parser, Debug)]
#[command(name = "hooks-mock-cli")]
#[command(about = "Run hook registration/firing scenarios against an in-memory registry")]
#[command(long_about = None)]
#[command(version)]
struct Args {
    /// Scenario file(s) to run
    #[arg(value_name = "FILE", required = true)]
    scenarios: Vec<PathBuf>,

    /// Print each scenario's final registry state as JSON
    #[arg(long)]
    dump: bool,

    /// Stop a scenario at its first failed step
    #[arg(long)]
    fail_fast: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Hooks Mock CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using hooks-mock library v{}", hooks_mock::VERSION);

    let reports = run_scenarios(&args.scenarios, args.fail_fast)?;

    for scenario_report in &reports {
        if !args.quiet || !scenario_report.passed() {
            print!("{}", report::render(scenario_report));
        }
        if args.dump {
            println!("{}", serde_json::to_string_pretty(&scenario_report.snapshot)?);
        }
    }
    if !args.quiet {
        println!("{}", report::summary(&reports));
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        bail!("{} of {} scenarios failed", failed, reports.len());
    }
    Ok(())
}

/// Load every scenario, then run them in parallel, one registry each
fn run_scenarios(paths: &[PathBuf], fail_fast: bool) -> Result<Vec<ScenarioReport>> {
    let scenarios = paths
        .iter()
        .map(|path| config::load_scenario(path).map(|scenario| (path.clone(), scenario)))
        .collect::<Result<Vec<_>>>()?;

    let reports = scenarios
        .into_par_iter()
        .map(|(path, scenario)| {
            ScenarioRunner::new(&scenario)
                .with_fail_fast(fail_fast)
                .run(&scenario, path)
        })
        .collect();

    Ok(reports)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
