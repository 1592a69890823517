use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use matchsticks::{Outcome, Solver, Strategy, SQUARE_SIDES};
use tracing::info;

/// Decide whether the given positive integers split into k groups of equal sum
#[derive(Parser, Debug)]
#[command(name = "matchsticks", version, about)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of groups, 4 lays the elements out as a square
    #[arg(short = 'k', long = "parts", env = "MATCHSTICKS_PARTS", default_value_t = SQUARE_SIDES)]
    parts: usize,

    #[arg(long, value_enum, default_value_t = StrategyArg::Backtrack)]
    strategy: StrategyArg,

    /// Give up after this many placements and print "inconclusive"
    #[arg(long, env = "MATCHSTICKS_STEP_BUDGET")]
    step_budget: Option<u64>,

    /// Positive integers to partition
    elements: Vec<u64>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum StrategyArg {
    Backtrack,
    Exhaustive,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Backtrack => Strategy::Backtrack,
            StrategyArg::Exhaustive => Strategy::Exhaustive,
        }
    }
}

impl Cli {
    fn solver(&self) -> Solver {
        let solver = Solver::new(self.parts).with_strategy(self.strategy.into());
        match self.step_budget {
            Some(steps) => solver.with_step_budget(steps),
            None => solver,
        }
    }
}

fn configure_logging(verbosity: u8) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;

    let mut directives = match verbosity {
        0 => "matchsticks=warn",
        1 => "matchsticks=debug",
        _ => "matchsticks=trace",
    }
    .to_string();
    if let Ok(overrides) = std::env::var("RUST_LOG") {
        directives = overrides;
    }
    let env_filter = tracing_subscriber::filter::EnvFilter::new(directives);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(verbosity >= 2);
    let sub = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer);
    tracing::subscriber::set_global_default(sub).context("Failed to set default logger")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.verbose)?;

    let solver = cli.solver();
    let outcome = solver
        .solve(&cli.elements)
        .with_context(|| format!("cannot partition into {} groups", solver.k()))?;

    let answer = match &outcome {
        Outcome::Partitioned(partition) => {
            info!(sum = partition.target(), "found {partition}");
            "true"
        }
        Outcome::Infeasible(reason) => {
            info!("{reason}");
            "false"
        }
        Outcome::Inconclusive { steps } => {
            info!("gave up after {steps} steps");
            "inconclusive"
        }
    };
    println!("{answer}");
    Ok(())
}
