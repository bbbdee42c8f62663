//! Run command implementation
//!
//! Runs a built-in limit state with the configured reliability method and
//! prints the design point.

use reliability_core::types::{ConvergenceReport, DesignPoint, Message};
use reliability_methods::model::ProgressControl;
use reliability_methods::{MethodKind, MethodSettings};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{CliConfig, OutputFormat};
use crate::scenarios::Scenario;
use crate::Result;

/// Command line overrides of the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub scenario: Option<Scenario>,
    pub method: Option<MethodKind>,
    pub format: Option<OutputFormat>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
}

/// Alpha of one stochast in the report.
#[derive(Debug, Serialize)]
pub struct AlphaReport {
    pub stochast: String,
    pub alpha: f64,
    pub influence_factor: f64,
    pub u: f64,
    pub x: f64,
}

/// Result of a run, printed as a table or as JSON.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub scenario: Scenario,
    pub method: MethodKind,
    pub beta: f64,
    pub probability_of_failure: f64,
    pub reference_beta: Option<f64>,
    pub convergence: ConvergenceReport,
    pub alphas: Vec<AlphaReport>,
    pub messages: Vec<Message>,
    pub elapsed_ms: u128,
}

impl RunReport {
    fn new(
        scenario: Scenario,
        method: MethodKind,
        design_point: DesignPoint,
        elapsed_ms: u128,
    ) -> Self {
        let alphas = design_point
            .alphas
            .iter()
            .map(|a| AlphaReport {
                stochast: a.stochast.name().to_string(),
                alpha: a.alpha,
                influence_factor: a.influence_factor,
                u: a.u,
                x: a.x,
            })
            .collect();
        Self {
            scenario,
            method,
            beta: design_point.beta,
            probability_of_failure: design_point.probability_of_failure(),
            reference_beta: scenario.reference_beta(),
            convergence: design_point.convergence_report,
            alphas,
            messages: design_point.messages,
            elapsed_ms,
        }
    }
}

/// Applies the command line overrides to `config`.
pub fn apply_options(config: &mut CliConfig, options: &RunOptions) {
    if let Some(scenario) = options.scenario {
        config.scenario = scenario;
    }
    if let Some(kind) = options.method {
        if config.method.kind() != kind {
            config.method = MethodSettings::default_for(kind);
        }
    }
    if let Some(format) = options.format {
        config.output = format;
    }
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    if let Some(threads) = options.threads {
        config.run.max_parallel_processes = threads;
    }
}

/// Runs the scenario of `config` and returns the report.
pub fn execute(config: &CliConfig) -> Result<RunReport> {
    let mut method = config.method.clone();
    if let Some(seed) = config.seed {
        method.set_seed(seed);
    }
    method.validate()?;

    let runner = config
        .scenario
        .runner(config.run.clone())?
        .with_progress(|report| {
            debug!(
                fraction = report.fraction,
                iteration = report.iteration,
                beta = report.beta,
                convergence = report.convergence,
                "progress"
            );
            ProgressControl::Continue
        });

    info!(
        "Running {} on {} with {} thread(s)",
        method.kind(),
        config.scenario,
        config.run.max_parallel_processes
    );
    let start = Instant::now();
    let design_point = method.build().design_point(&runner)?;
    let elapsed_ms = start.elapsed().as_millis();

    if !design_point.convergence_report.is_converged {
        warn!("{} did not converge", method.kind());
    }
    info!("Finished in {} ms", elapsed_ms);

    Ok(RunReport::new(
        config.scenario,
        method.kind(),
        design_point,
        elapsed_ms,
    ))
}

/// Run the run command
pub fn run(mut config: CliConfig, options: &RunOptions) -> Result<()> {
    apply_options(&mut config, options);
    config.validate()?;

    let report = execute(&config)?;
    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &RunReport) {
    println!();
    println!("Scenario : {}", report.scenario);
    println!("Method   : {}", report.method);
    println!();
    println!("┌──────────────────────┬──────────────┐");
    println!("│ Reliability index    │ {:>12.4} │", report.beta);
    println!(
        "│ Failure probability  │ {:>12.4e} │",
        report.probability_of_failure
    );
    if let Some(reference) = report.reference_beta {
        println!("│ Exact index          │ {:>12.4} │", reference);
    }
    println!(
        "│ Converged            │ {:>12} │",
        report.convergence.is_converged
    );
    println!(
        "│ Model runs           │ {:>12} │",
        report.convergence.total_model_runs
    );
    println!("└──────────────────────┴──────────────┘");
    println!();
    println!("┌────────────┬──────────┬──────────┬──────────┐");
    println!("│ Stochast   │ Alpha    │ u        │ x        │");
    println!("├────────────┼──────────┼──────────┼──────────┤");
    for alpha in &report.alphas {
        println!(
            "│ {:<10} │ {:>8.4} │ {:>8.4} │ {:>8.4} │",
            alpha.stochast, alpha.alpha, alpha.u, alpha.x
        );
    }
    println!("└────────────┴──────────┴──────────┴──────────┘");
    for message in &report.messages {
        println!("{}", message);
    }
}
