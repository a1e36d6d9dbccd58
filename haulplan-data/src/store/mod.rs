//! SQLite persistence for stock ledger changes.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use haulplan_inventory::{LocationKind, StockKey, StockSink, StockSinkError};
use jiff::Timestamp;
use parking_lot::Mutex;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, params};
use thiserror::Error;

/// Errors raised by [`SqliteStockSink`].
#[derive(Debug, Error)]
pub enum SqliteStockSinkError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `inventory_stock` table failed.
    #[error("failed to create inventory_stock table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a stock row failed.
    #[error("failed to persist {location_kind} {location_id} {item_id}")]
    PersistRow {
        /// Kind of site.
        location_kind: LocationKind,
        /// Site identifier.
        location_id: String,
        /// Item identifier.
        item_id: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Reading a stock row failed.
    #[error("failed to read stock row")]
    Query {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// [`StockSink`] writing the latest quantity per key to SQLite.
///
/// Rows live in `inventory_stock(location_type, location_id, item_id,
/// quantity, last_updated)` keyed by the first three columns.
#[derive(Debug)]
pub struct SqliteStockSink {
    connection: Mutex<Connection>,
}

impl SqliteStockSink {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStockSinkError`] when the directory, database or
    /// schema cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStockSinkError> {
        ensure_parent_dir(path)?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStockSinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Database held in memory for the lifetime of the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStockSinkError`] when the schema cannot be created.
    pub fn in_memory() -> Result<Self, SqliteStockSinkError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteStockSinkError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, SqliteStockSinkError> {
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS inventory_stock (
                    location_type TEXT NOT NULL,
                    location_id TEXT NOT NULL,
                    item_id TEXT NOT NULL,
                    quantity REAL NOT NULL,
                    last_updated TEXT NOT NULL,
                    PRIMARY KEY (location_type, location_id, item_id)
                )",
                [],
            )
            .map_err(|source| SqliteStockSinkError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Write `qty` for `key`, replacing any earlier row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStockSinkError::PersistRow`] when the write fails.
    pub fn store(&self, key: &StockKey, qty: f64) -> Result<(), SqliteStockSinkError> {
        self.connection
            .lock()
            .execute(
                "INSERT INTO inventory_stock
                    (location_type, location_id, item_id, quantity, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (location_type, location_id, item_id)
                 DO UPDATE SET quantity = excluded.quantity,
                               last_updated = excluded.last_updated",
                params![
                    key.location_kind.as_str(),
                    key.location_id,
                    key.item_id,
                    qty,
                    Timestamp::now().to_string(),
                ],
            )
            .map(|_| ())
            .map_err(|source| SqliteStockSinkError::PersistRow {
                location_kind: key.location_kind,
                location_id: key.location_id.clone(),
                item_id: key.item_id.clone(),
                source,
            })
    }

    /// Stored quantity for `key`, if any row exists.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStockSinkError::Query`] when the read fails.
    pub fn quantity(&self, key: &StockKey) -> Result<Option<f64>, SqliteStockSinkError> {
        self.connection
            .lock()
            .query_row(
                "SELECT quantity FROM inventory_stock
                 WHERE location_type = ?1 AND location_id = ?2 AND item_id = ?3",
                params![key.location_kind.as_str(), key.location_id, key.item_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| SqliteStockSinkError::Query { source })
    }
}

impl StockSink for SqliteStockSink {
    fn upsert(&self, key: &StockKey, qty: f64) -> Result<(), StockSinkError> {
        self.store(key, qty)
            .map_err(|err| StockSinkError::new(format_chain(&err)))
    }
}

fn format_chain(err: &SqliteStockSinkError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteStockSinkError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    let create_error = |source| SqliteStockSinkError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(create_error)?;
    dir.create_dir_all(relative).map_err(create_error)
}
