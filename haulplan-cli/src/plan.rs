//! Plan command implementation for the haulplan CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use haulplan_core::GeometrySelector;
use haulplan_data::routing::{OsrmGeometryConfig, OsrmGeometryProvider};
use haulplan_routing::{
    Plan, PlanRequest, RerouteOutcome, RerouteReason, RerouteRequest, RerouteScope, RoutingEngine,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_PLAN_CHANGE_LIMIT, ARG_PLAN_LOCK_HOPS, ARG_PLAN_OSRM_BASE_URL, ARG_PLAN_REQUEST,
    ARG_PLAN_REROUTE_SCOPE, ARG_PLAN_REROUTE_TRUCK, ARG_PLAN_SEED, CliError, ENV_PLAN_REQUEST,
};

/// Change budget used when `--change-limit` is not given.
pub(crate) const DEFAULT_CHANGE_LIMIT: f64 = 0.3;
/// Locked leading stops used when `--lock-hops` is not given.
pub(crate) const DEFAULT_LOCK_HOPS: u8 = 1;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan delivery routes for a JSON-encoded PlanRequest. Route \
                  geometry comes from an OSRM instance when a base URL is \
                  given and falls back to straight lines otherwise. Passing \
                  --reroute-scope re-routes the new plan straight away.",
    about = "Plan delivery routes"
)]
#[ortho_config(prefix = "HAULPLAN")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a PlanRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_PLAN_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Seed for reproducible drive speeds, margins and re-route shifts.
    #[arg(long = ARG_PLAN_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Re-route the plan with this scope (`global` or `truck`).
    #[arg(long = ARG_PLAN_REROUTE_SCOPE, value_name = "scope")]
    #[serde(default)]
    pub(crate) reroute_scope: Option<String>,
    /// Truck to re-route when the scope is `truck`.
    #[arg(long = ARG_PLAN_REROUTE_TRUCK, value_name = "id")]
    #[serde(default)]
    pub(crate) reroute_truck: Option<String>,
    /// Share of each in-scope route's deliveries that may change.
    #[arg(long = ARG_PLAN_CHANGE_LIMIT, value_name = "fraction")]
    #[serde(default)]
    pub(crate) change_limit: Option<f64>,
    /// Leading deliveries that stay untouched by the re-route.
    #[arg(long = ARG_PLAN_LOCK_HOPS, value_name = "n")]
    #[serde(default)]
    pub(crate) lock_hops: Option<u8>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Re-route settings resolved from the CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RerouteSettings {
    pub(crate) scope: RerouteScope,
    pub(crate) truck_id: Option<String>,
    pub(crate) change_limit: f64,
    pub(crate) lock_hops: u8,
}

impl RerouteSettings {
    fn request_for(&self, plan_id: &str) -> RerouteRequest {
        RerouteRequest {
            plan_id: plan_id.to_owned(),
            scope: self.scope,
            truck_id: self.truck_id.clone(),
            change_limit: self.change_limit,
            lock_hops: self.lock_hops,
            reason: Some(RerouteReason::Manual),
        }
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) seed: Option<u64>,
    pub(crate) reroute: Option<RerouteSettings>,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        let reroute = args
            .reroute_scope
            .as_deref()
            .map(parse_scope)
            .transpose()?
            .map(|scope| RerouteSettings {
                scope,
                truck_id: args.reroute_truck.clone(),
                change_limit: args.change_limit.unwrap_or(DEFAULT_CHANGE_LIMIT),
                lock_hops: args.lock_hops.unwrap_or(DEFAULT_LOCK_HOPS),
            });
        Ok(Self {
            request_path,
            osrm_base_url: args.osrm_base_url,
            seed: args.seed,
            reroute,
        })
    }
}

fn parse_scope(value: &str) -> Result<RerouteScope, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "global" => Ok(RerouteScope::Global),
        "truck" => Ok(RerouteScope::Truck),
        _ => Err(CliError::InvalidArgument {
            field: ARG_PLAN_REROUTE_SCOPE,
            value: value.to_owned(),
            expected: "global or truck",
        }),
    }
}

/// JSON document printed by the `plan` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlanOutput {
    pub(crate) plan: Plan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reroute: Option<RerouteOutcome>,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_plan_with(args, &mut handle)
}

pub(crate) fn run_plan_with(args: PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_plan(&config)?;
    write_json(writer, &output)
}

pub(crate) fn execute_plan(config: &PlanConfig) -> Result<PlanOutput, CliError> {
    require_existing(&config.request_path, ARG_PLAN_REQUEST)?;
    let request: PlanRequest = load_json(&config.request_path, ARG_PLAN_REQUEST)?;
    let engine = build_engine(config)?;
    let plan = engine.plan(&request)?;
    log::info!(
        "planned {} routes for {} stops as plan {}",
        plan.routes.len(),
        request.stops.len(),
        plan.id
    );
    let reroute = config
        .reroute
        .as_ref()
        .map(|settings| engine.reroute(&settings.request_for(&plan.id)))
        .transpose()?;
    Ok(PlanOutput { plan, reroute })
}

fn build_engine(config: &PlanConfig) -> Result<RoutingEngine, CliError> {
    let engine = match config.seed {
        Some(seed) => RoutingEngine::seeded(seed),
        None => RoutingEngine::new(),
    };
    let Some(base_url) = config.osrm_base_url.as_ref() else {
        return Ok(engine);
    };
    let provider = OsrmGeometryProvider::with_config(OsrmGeometryConfig::new(base_url.clone()))
        .map_err(|source| CliError::BuildGeometryProvider {
            base_url: base_url.clone(),
            source,
        })?;
    Ok(engine.with_geometry(GeometrySelector::with_primary(provider)))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
