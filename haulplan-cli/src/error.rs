//! Error types emitted by the haulplan CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haulplan_data::routing::ProviderBuildError;
use haulplan_data::store::SqliteStockSinkError;
use haulplan_inventory::InventoryError;
use haulplan_routing::RoutingError;
use thiserror::Error;

/// Errors emitted by the haulplan CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option carried a value outside its accepted set.
    #[error("invalid --{field} value {value:?}: expected {expected}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening a JSON input file failed.
    #[error("failed to open {field} at {path:?}: {source}")]
    OpenInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A JSON input file could not be decoded.
    #[error("failed to parse {field} at {path:?}: {source}")]
    ParseInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Building the OSRM geometry provider failed.
    #[error("failed to build OSRM provider for {base_url}: {source}")]
    BuildGeometryProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Opening the SQLite stock database failed.
    #[error("failed to open stock database at {path:?}: {source}")]
    OpenStockStore {
        path: Utf8PathBuf,
        #[source]
        source: SqliteStockSinkError,
    },
    /// The routing engine rejected a request.
    #[error("routing failed: {0}")]
    Routing(#[from] RoutingError),
    /// The inventory engine rejected a request.
    #[error("inventory request rejected: {0}")]
    Inventory(#[from] InventoryError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
