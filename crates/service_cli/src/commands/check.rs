//! Check command implementation
//!
//! Prints the resolved configuration and the execution environment.

use tracing::info;

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;

    let resolved = toml::to_string_pretty(config).map_err(|e| CliError::Output(e.to_string()))?;

    println!("reliability {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Logical CPUs     : {}", num_cpus::get());
    println!("Physical CPUs    : {}", num_cpus::get_physical());
    println!(
        "Worker threads   : {}",
        config.run.max_parallel_processes
    );
    println!("Method           : {}", config.method.kind());
    println!();
    println!("# Resolved configuration");
    println!("{}", resolved);

    info!("Configuration OK");
    Ok(())
}
