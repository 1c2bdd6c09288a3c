//! Strategies listing command implementation.

use super::CliError;
use delve::strategy::StrategyRegistry;

/// Execute the strategies command.
///
/// # Errors
///
/// Infallible today; kept fallible for symmetry with other commands.
pub(crate) fn execute() -> Result<(), CliError> {
    let registry = StrategyRegistry::builtin();
    println!("Registered strategies:");
    for name in registry.names() {
        println!("  {name}");
    }
    println!();
    println!("Pass as NAME or NAME:CONFIG, one per player, in turn order.");
    Ok(())
}
