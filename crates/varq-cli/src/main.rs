//! varq command-line interface.
//!
//! # Usage
//!
//! ```bash
//! # Optimize the default two-qubit Ising problem
//! varq run
//!
//! # Depth-2 MaxCut from a config file with BFGS and a fixed seed
//! varq run --config maxcut.yaml --depth 2 --strategy bfgs --seed 7
//!
//! # Nelder-Mead and BFGS from the same start
//! varq compare --shots 2048 --json
//!
//! # Show the observables
//! varq hamiltonian --matrix
//! ```

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use varq_qaoa::{InitStrategy, QaoaConfig, QaoaRunner, Strategy};

use crate::output::*;

/// QAOA objective evaluation and classical optimization
#[derive(Parser, Debug)]
#[command(name = "varq")]
#[command(version)]
#[command(about = "QAOA objective evaluation and classical optimization")]
struct Cli {
    /// Path to a YAML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print machine-readable JSON instead of a report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize the QAOA angles
    Run(RunArgs),

    /// Run every optimizer from the same initial angles
    Compare(RunArgs),

    /// Print the cost and mixing observables
    Hamiltonian {
        /// Also print dense matrices (up to 4 qubits)
        #[arg(long)]
        matrix: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Overrides applied on top of the file and environment.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Number of QAOA layers
    #[arg(short = 'p', long)]
    depth: Option<usize>,

    /// Optimizer (nelder-mead, bfgs); ignored by `compare`
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Seed for random initial angles and shot sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Estimate expectations from this many shots per term
    #[arg(long)]
    shots: Option<u32>,

    /// Initial angle strategy
    #[arg(long, value_enum)]
    init: Option<InitArg>,

    /// Optimizer tolerance
    #[arg(long)]
    tol: Option<f64>,

    /// Maximum optimizer iterations
    #[arg(long)]
    maxiter: Option<usize>,

    /// Maximum oracle evaluations
    #[arg(long)]
    maxfev: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InitArg {
    Random,
    LinearRamp,
}

impl RunArgs {
    fn apply(&self, config: &mut QaoaConfig) {
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(strategy) = self.strategy {
            config.optimizer.strategy = strategy;
        }
        match self.init {
            Some(InitArg::Random) if !matches!(config.init, InitStrategy::Random { .. }) => {
                config.init = InitStrategy::Random { seed: None };
            }
            Some(InitArg::LinearRamp) => config.init = InitStrategy::LinearRamp,
            _ => {}
        }
        if let Some(shots) = self.shots {
            config.set_shots(shots);
        }
        if let Some(seed) = self.seed {
            config.set_seed(seed);
        }
        if let Some(tol) = self.tol {
            config.optimizer.tolerance = Some(tol);
        }
        if let Some(maxiter) = self.maxiter {
            config.optimizer.max_iterations = Some(maxiter);
        }
        if let Some(maxfev) = self.maxfev {
            config.optimizer.max_evaluations = Some(maxfev);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QaoaConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("loading {}", path.display()),
        None => "loading configuration".to_string(),
    })?;
    if let Commands::Run(args) | Commands::Compare(args) = &cli.command {
        args.apply(&mut config);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level);
    config.validate().context("invalid configuration")?;
    debug!(?config, "effective configuration");

    match &cli.command {
        Commands::Run(_) => run(config, cli.json),
        Commands::Compare(_) => compare(config, cli.json),
        Commands::Hamiltonian { matrix } => hamiltonian(config, *matrix, cli.json),
        Commands::Config => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn run(config: QaoaConfig, json: bool) -> Result<()> {
    let runner = QaoaRunner::from_config(config)?;
    let num_qubits = runner.observables().num_qubits();

    if json {
        let result = runner.run()?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_header("varq: QAOA");
    print_result("Qubits", num_qubits);
    print_result("Depth", runner.config().depth);
    print_result("Initial angles", &runner.config().init);

    let spinner = create_spinner("optimizing");
    let result = runner.run();
    spinner.finish_and_clear();

    print_run(&result?, num_qubits);
    Ok(())
}

fn compare(config: QaoaConfig, json: bool) -> Result<()> {
    let runner = QaoaRunner::from_config(config)?;
    let num_qubits = runner.observables().num_qubits();

    if json {
        let results = runner.compare(&Strategy::ALL)?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_header("varq: optimizer comparison");
    print_result("Qubits", num_qubits);
    print_result("Depth", runner.config().depth);

    let spinner = create_spinner("running all optimizers");
    let results = runner.compare(&Strategy::ALL);
    spinner.finish_and_clear();

    let results = results?;
    for result in &results {
        print_run(result, num_qubits);
    }
    print_comparison(&results);
    Ok(())
}

fn hamiltonian(config: QaoaConfig, matrix: bool, json: bool) -> Result<()> {
    let runner = QaoaRunner::from_config(config)?;
    let observables = runner.observables();
    let n = observables.num_qubits();

    if json {
        let value = json!({
            "num_qubits": n,
            "cost": observables.cost(),
            "mixer": observables.mixer(),
            "ground_energy": observables.ground_energy(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_header("varq: observables");
    print_result("Qubits", n);
    print_observable("Cost", observables.cost());
    print_observable("Mixer", observables.mixer());
    if let Some(ground) = observables.ground_energy() {
        println!();
        print_result("Ground energy", format!("{ground:.6}"));
    }

    if matrix {
        if n > 4 {
            print_info("matrices are only printed for up to 4 qubits");
        } else {
            print_section("Cost matrix");
            print_matrix(observables.cost(), n)?;
            print_section("Mixer matrix");
            print_matrix(observables.mixer(), n)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use varq_qaoa::OracleConfig;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "varq", "run", "--depth", "3", "--strategy", "bfgs", "--seed", "7", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.depth, Some(3));
        assert_eq!(args.strategy, Some(Strategy::Bfgs));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["varq", "run", "--strategy", "cobyla"]).is_err());
    }

    #[test]
    fn test_args_override_config() {
        let args = RunArgs {
            depth: Some(2),
            shots: Some(100),
            seed: Some(5),
            init: Some(InitArg::LinearRamp),
            maxfev: Some(50),
            ..Default::default()
        };
        let mut config = QaoaConfig::default();
        args.apply(&mut config);

        assert_eq!(config.depth, 2);
        assert_eq!(config.init, InitStrategy::LinearRamp);
        assert_eq!(
            config.oracle,
            OracleConfig::Sampling {
                shots: 100,
                seed: Some(5)
            }
        );
        assert_eq!(config.optimizer.max_evaluations, Some(50));
        config.validate().unwrap();
    }

    #[test]
    fn test_random_init_keeps_configured_seed() {
        let mut config = QaoaConfig {
            init: InitStrategy::Random { seed: Some(9) },
            ..Default::default()
        };
        RunArgs {
            init: Some(InitArg::Random),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.init, InitStrategy::Random { seed: Some(9) });
    }
}
