//! Command-line interface for planning delivery routes and exercising the
//! inventory engine offline.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod inventory;
mod plan;

pub use error::CliError;

use inventory::{InventoryArgs, run_inventory};
use plan::{PlanArgs, run_plan};

const ARG_PLAN_REQUEST: &str = "request";
const ARG_PLAN_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_PLAN_SEED: &str = "seed";
const ARG_PLAN_REROUTE_SCOPE: &str = "reroute-scope";
const ARG_PLAN_REROUTE_TRUCK: &str = "reroute-truck";
const ARG_PLAN_CHANGE_LIMIT: &str = "change-limit";
const ARG_PLAN_LOCK_HOPS: &str = "lock-hops";
const ENV_PLAN_REQUEST: &str = "HAULPLAN_CMDS_PLAN_REQUEST_PATH";

const ARG_INVENTORY_SCENARIO: &str = "scenario";
const ARG_INVENTORY_STOCK_DB: &str = "stock-db";
const ARG_INVENTORY_SEED_DEMO: &str = "seed-demo";
const ENV_INVENTORY_SCENARIO: &str = "HAULPLAN_CMDS_INVENTORY_SCENARIO_PATH";

/// Run the haulplan CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration, inputs or the engines
/// reject the invocation.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Inventory(args) => run_inventory(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "haulplan",
    about = "Offline route planning and inventory tooling for delivery fleets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan routes for a JSON planning request and optionally re-route them.
    Plan(PlanArgs),
    /// Replay a JSON inventory scenario against a fresh engine.
    Inventory(InventoryArgs),
}

#[cfg(test)]
mod tests;
