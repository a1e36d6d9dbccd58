//! Behavioural tests for mirroring ledger changes into SQLite.
#![cfg(feature = "store-sqlite")]

use std::sync::Arc;

use camino::Utf8PathBuf;
use haulplan_data::store::SqliteStockSink;
use haulplan_inventory::{InventoryEngine, StockEvent, StockKey};
use jiff::Timestamp;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct World {
    _dir: TempDir,
    sink: Arc<SqliteStockSink>,
    engine: InventoryEngine,
}

#[fixture]
fn world() -> World {
    let dir = TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("stock.db")).expect("utf-8 path");
    let sink = Arc::new(SqliteStockSink::open(&path).expect("open sink"));
    let engine = InventoryEngine::new().with_sink(sink.clone());
    World {
        _dir: dir,
        sink,
        engine,
    }
}

#[given("an inventory engine persisting to a temporary database")]
fn persisting_engine(#[from(world)] world: &World) {
    assert_eq!(world.engine.metrics().total_stock_items, 0);
}

#[when("WH1 is replenished with 8 units of X and a transfer of 3 units to WH2 is applied")]
fn replenish_and_transfer(#[from(world)] world: &World) {
    let ts = Timestamp::UNIX_EPOCH;
    let outcome = world.engine.apply_events(&[
        StockEvent::replenish("r1", ts, "WH1", "X", 8.0),
        StockEvent::transfer("t1", ts, "WH1", "WH2", "X", 3.0),
    ]);
    assert_eq!(outcome.accepted, 2);
}

#[when("a transfer of 3 units of X from an empty WH1 to WH2 is applied")]
fn short_transfer(#[from(world)] world: &World) {
    let outcome = world.engine.apply_events(&[StockEvent::transfer(
        "t1",
        Timestamp::UNIX_EPOCH,
        "WH1",
        "WH2",
        "X",
        3.0,
    )]);
    assert_eq!(outcome.rejected.len(), 1);
}

#[then("the database holds 5 units of X at WH1 and 3 at WH2")]
fn written_through(#[from(world)] world: &World) {
    let stored = |warehouse: &str| {
        world
            .sink
            .quantity(&StockKey::warehouse(warehouse, "X"))
            .expect("read row")
    };
    assert_eq!(stored("WH1"), Some(5.0));
    assert_eq!(stored("WH2"), Some(3.0));
}

#[then("the database holds no row for WH2")]
fn nothing_written(#[from(world)] world: &World) {
    let stored = world
        .sink
        .quantity(&StockKey::warehouse("WH2", "X"))
        .expect("read row");
    assert_eq!(stored, None);
}

#[scenario(path = "tests/features/sqlite_sink.feature", index = 0)]
fn write_through(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_sink.feature", index = 1)]
fn rejected_not_written(world: World) {
    let _ = world;
}
