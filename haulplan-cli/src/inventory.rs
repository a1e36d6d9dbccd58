//! Inventory command implementation for the haulplan CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use haulplan_data::store::SqliteStockSink;
use haulplan_inventory::{
    EventOutcome, FeasibilityLine, FeasibilityOutcome, InventoryEngine, InventoryMetrics,
    ReleaseOutcome, ReleaseRequest, ReserveOutcome, ReserveRequest, SeedStock, StockEvent,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_INVENTORY_SCENARIO, ARG_INVENTORY_SEED_DEMO, ARG_INVENTORY_STOCK_DB, CliError,
    ENV_INVENTORY_SCENARIO,
};

/// CLI arguments for the `inventory` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Replay a JSON inventory scenario against a fresh engine. \
                  Stock events are applied first, then reservations, \
                  releases and finally the feasibility check. Accepted \
                  ledger changes can be persisted to a SQLite database.",
    about = "Replay an inventory scenario"
)]
#[ortho_config(prefix = "HAULPLAN")]
pub(crate) struct InventoryArgs {
    /// Path to a JSON file containing the scenario.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) scenario_path: Option<Utf8PathBuf>,
    /// SQLite database receiving accepted ledger changes.
    #[arg(long = ARG_INVENTORY_STOCK_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) stock_db: Option<Utf8PathBuf>,
    /// Start from the demo stock instead of an empty ledger.
    #[arg(
        long = ARG_INVENTORY_SEED_DEMO,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) seed_demo: Option<bool>,
}

impl InventoryArgs {
    pub(crate) fn into_config(self) -> Result<InventoryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InventoryConfig::try_from(merged)
    }
}

/// Resolved `inventory` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InventoryConfig {
    pub(crate) scenario_path: Utf8PathBuf,
    pub(crate) stock_db: Option<Utf8PathBuf>,
    pub(crate) seed_demo: bool,
}

impl TryFrom<InventoryArgs> for InventoryConfig {
    type Error = CliError;

    fn try_from(args: InventoryArgs) -> Result<Self, Self::Error> {
        let scenario_path = args.scenario_path.ok_or(CliError::MissingArgument {
            field: ARG_INVENTORY_SCENARIO,
            env: ENV_INVENTORY_SCENARIO,
        })?;
        Ok(Self {
            scenario_path,
            stock_db: args.stock_db,
            seed_demo: args.seed_demo.unwrap_or(false),
        })
    }
}

/// Operations replayed by the `inventory` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct InventoryScenario {
    /// Stock events applied as one batch.
    pub(crate) events: Vec<StockEvent>,
    /// Reservation requests, in order.
    pub(crate) reserve: Vec<ReserveRequest>,
    /// Release requests, in order.
    pub(crate) release: Vec<ReleaseRequest>,
    /// Lines checked after every other step.
    pub(crate) feasibility: Option<Vec<FeasibilityLine>>,
}

/// JSON document printed by the `inventory` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct InventoryReport {
    pub(crate) events: Option<EventOutcome>,
    pub(crate) reservations: Vec<ReserveOutcome>,
    pub(crate) releases: Vec<ReleaseOutcome>,
    pub(crate) feasibility: Option<FeasibilityOutcome>,
    pub(crate) metrics: InventoryMetrics,
}

pub(crate) fn run_inventory(args: InventoryArgs) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_inventory_with(args, &mut handle)
}

pub(crate) fn run_inventory_with(
    args: InventoryArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let report = execute_inventory(&config)?;
    write_json(writer, &report)
}

pub(crate) fn execute_inventory(config: &InventoryConfig) -> Result<InventoryReport, CliError> {
    require_existing(&config.scenario_path, ARG_INVENTORY_SCENARIO)?;
    let scenario: InventoryScenario = load_json(&config.scenario_path, ARG_INVENTORY_SCENARIO)?;
    let engine = build_engine(config)?;
    replay(&engine, &scenario)
}

fn build_engine(config: &InventoryConfig) -> Result<InventoryEngine, CliError> {
    let seed = if config.seed_demo {
        SeedStock::demo()
    } else {
        SeedStock::empty()
    };
    let mut engine = InventoryEngine::new().with_seed(&seed);
    if let Some(path) = config.stock_db.as_ref() {
        let sink = SqliteStockSink::open(path).map_err(|source| CliError::OpenStockStore {
            path: path.clone(),
            source,
        })?;
        engine = engine.with_sink(Arc::new(sink));
    }
    Ok(engine)
}

pub(crate) fn replay(
    engine: &InventoryEngine,
    scenario: &InventoryScenario,
) -> Result<InventoryReport, CliError> {
    let events = if scenario.events.is_empty() {
        None
    } else {
        Some(engine.apply_events(&scenario.events))
    };
    let reservations = scenario
        .reserve
        .iter()
        .map(|request| engine.reserve(request))
        .collect::<Result<Vec<_>, _>>()?;
    let releases = scenario
        .release
        .iter()
        .map(|request| engine.release(request))
        .collect::<Result<Vec<_>, _>>()?;
    let feasibility = scenario
        .feasibility
        .as_deref()
        .map(|lines| engine.check_feasibility(lines))
        .transpose()?;
    Ok(InventoryReport {
        events,
        reservations,
        releases,
        feasibility,
        metrics: engine.metrics(),
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<InventoryConfig, CliError> {
    let merged = InventoryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    InventoryConfig::try_from(merged)
}
