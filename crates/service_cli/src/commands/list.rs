//! List command implementation
//!
//! Lists the built-in scenarios and the available methods.

use reliability_methods::MethodKind;

use crate::scenarios::Scenario;
use crate::Result;

/// Run the list command
pub fn run() -> Result<()> {
    println!("Scenarios:");
    for scenario in Scenario::ALL {
        let reference = scenario
            .reference_beta()
            .map_or_else(|| "-".to_string(), |beta| format!("{:.4}", beta));
        println!(
            "  {:<18} beta = {:<8} {}",
            scenario.name(),
            reference,
            scenario.description()
        );
    }
    println!();
    println!("Methods:");
    for kind in MethodKind::ALL {
        println!("  {}", kind);
    }
    Ok(())
}
