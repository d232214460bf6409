//! ib-core - worst-case expectations over infradistributions.
//!
//! Commands print a single JSON document on stdout. Logs and structured
//! errors go to stderr.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ib_common::{Error, Result, StructuredError};
use ib_config::{load_config, EvalConfig};
use ib_core::distribution::{Distribution, Family};
use ib_core::exit_codes::ExitCode;
use ib_core::integration::{gauss_hermite_quadrature, monte_carlo_with_config};
use ib_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use ib_core::{Scenario, Tensor};
use ib_math::{gauss_hermite_params, MAX_NODES};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ib-core")]
#[command(version, about = "Worst-case expectations over infradistributions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Evaluation config file (TOML). Falls back to IB_CONFIG, then the XDG config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr: human or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every integrand of a scenario against its polytope
    Eval(EvalArgs),
    /// Compare quadrature with Monte Carlo for each Normal point of a scenario
    Check(CheckArgs),
    /// Print an n-point Gauss-Hermite rule
    Nodes(NodesArgs),
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Scenario file (.json or .toml)
    scenario: PathBuf,

    /// Quadrature node count (overrides scenario and config)
    #[arg(long)]
    nodes: Option<usize>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Scenario file (.json or .toml)
    scenario: PathBuf,

    /// Quadrature node count (overrides scenario and config)
    #[arg(long)]
    nodes: Option<usize>,

    /// Monte Carlo sample count (overrides config)
    #[arg(long)]
    samples: Option<usize>,

    /// Monte Carlo seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Largest acceptable absolute gap
    #[arg(long, default_value_t = 0.01)]
    tolerance: f64,
}

#[derive(Args, Debug)]
struct NodesArgs {
    /// Number of nodes
    n: usize,
}

/// A tensor flattened in row-major order.
#[derive(Serialize)]
struct TensorOut<T> {
    shape: Vec<usize>,
    values: Vec<T>,
}

impl<T: Clone> TensorOut<T> {
    fn from_array(t: &ndarray::ArrayD<T>) -> Self {
        TensorOut {
            shape: t.shape().to_vec(),
            values: t.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize)]
struct EvalOutput {
    scenario: Option<String>,
    points: usize,
    nodes: usize,
    entropy: TensorOut<f64>,
    results: Vec<EvalResult>,
}

#[derive(Serialize)]
struct EvalResult {
    integrand: String,
    infimum: TensorOut<f64>,
    minimizing_point: TensorOut<usize>,
}

#[derive(Serialize)]
struct CheckOutput {
    scenario: Option<String>,
    nodes: usize,
    samples: usize,
    tolerance: f64,
    passed: bool,
    comparisons: Vec<Comparison>,
    skipped: Vec<SkippedPoint>,
}

#[derive(Serialize)]
struct Comparison {
    point: usize,
    integrand: String,
    quadrature: TensorOut<f64>,
    monte_carlo: TensorOut<f64>,
    max_abs_diff: f64,
}

#[derive(Serialize)]
struct SkippedPoint {
    point: usize,
    family: &'static str,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Eval(args) => run_eval(&cli.global, args),
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Nodes(args) => run_nodes(args),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", StructuredError::from(&err).to_json());
            ExitCode::for_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_eval_config(path: Option<&Path>) -> Result<EvalConfig> {
    let (config, source) = load_config(path)?;
    info!(source = %source, "loaded evaluation config");
    Ok(config)
}

/// Node count: CLI flag, then scenario, then config.
fn node_count(flag: Option<usize>, scenario: &Scenario, config: &EvalConfig) -> Result<usize> {
    let n = flag.or(scenario.nodes).unwrap_or(config.quadrature_nodes);
    if n == 0 || n > MAX_NODES {
        return Err(Error::invalid_parameter(
            "nodes",
            format!("must be in 1..={MAX_NODES}, got {n}"),
        ));
    }
    Ok(n)
}

fn run_eval(global: &GlobalOpts, args: &EvalArgs) -> Result<ExitCode> {
    let config = load_eval_config(global.config.as_deref())?;
    let scenario = Scenario::load(&args.scenario)?;
    let nodes = node_count(args.nodes, &scenario, &config)?;
    let polytope = scenario.polytope()?;

    if scenario.integrands.is_empty() {
        warn!("scenario has no integrands; only entropy is reported");
    }

    let mut results = Vec::with_capacity(scenario.integrands.len());
    for integrand in &scenario.integrands {
        let f = |x: &Tensor| integrand.apply(x);
        let infimum = polytope.evaluate_with_nodes(f, nodes)?;
        let argmin = polytope.minimizing_points_with_nodes(f, nodes)?;
        results.push(EvalResult {
            integrand: integrand.label(),
            infimum: TensorOut::from_array(&infimum),
            minimizing_point: TensorOut::from_array(&argmin),
        });
    }

    emit(&EvalOutput {
        scenario: scenario.name.clone(),
        points: polytope.num_points(),
        nodes,
        entropy: TensorOut::from_array(&polytope.entropy()),
        results,
    })?;
    Ok(ExitCode::Ok)
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> Result<ExitCode> {
    let mut config = load_eval_config(global.config.as_deref())?;
    if let Some(samples) = args.samples {
        config = config.with_mc_samples(samples);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if !(args.tolerance.is_finite() && args.tolerance >= 0.0) {
        return Err(Error::invalid_parameter("tolerance", "must be finite and non-negative"));
    }

    let scenario = Scenario::load(&args.scenario)?;
    let nodes = node_count(args.nodes, &scenario, &config)?;

    let mut comparisons = Vec::new();
    let mut skipped = Vec::new();
    for (i, point) in scenario.points.iter().enumerate() {
        let mu = point.distribution.build()?;
        let normal = match &mu {
            Distribution::Normal(normal) => normal,
            other => {
                skipped.push(SkippedPoint {
                    point: i,
                    family: other.name(),
                });
                continue;
            }
        };
        for integrand in &scenario.integrands {
            let f = |x: &Tensor| integrand.apply(x);
            let quadrature = gauss_hermite_quadrature(normal, f, nodes)?;
            let monte_carlo = monte_carlo_with_config(&mu, f, &config)?;
            let max_abs_diff = quadrature
                .iter()
                .zip(monte_carlo.iter())
                .map(|(q, m)| (q - m).abs())
                .fold(0.0, |acc: f64, d| {
                    if acc.is_nan() || d.is_nan() {
                        f64::NAN
                    } else {
                        acc.max(d)
                    }
                });
            comparisons.push(Comparison {
                point: i,
                integrand: integrand.label(),
                quadrature: TensorOut::from_array(&quadrature),
                monte_carlo: TensorOut::from_array(&monte_carlo),
                max_abs_diff,
            });
        }
    }

    let passed = comparisons.iter().all(|c| c.max_abs_diff <= args.tolerance);
    emit(&CheckOutput {
        scenario: scenario.name.clone(),
        nodes,
        samples: config.mc_samples,
        tolerance: args.tolerance,
        passed,
        comparisons,
        skipped,
    })?;
    Ok(if passed {
        ExitCode::Ok
    } else {
        ExitCode::CheckFailed
    })
}

fn run_nodes(args: &NodesArgs) -> Result<ExitCode> {
    let rule = gauss_hermite_params(args.n).ok_or_else(|| {
        Error::invalid_parameter("n", format!("must be in 1..={MAX_NODES}, got {}", args.n))
    })?;
    emit(&serde_json::json!({
        "n": args.n,
        "nodes": rule.nodes,
        "weights": rule.weights,
    }))?;
    Ok(ExitCode::Ok)
}
