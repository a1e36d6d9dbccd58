//! Many reservation threads and the consumption feed sharing one engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use haulplan_core::SeededVariability;
use haulplan_inventory::{
    ConsumptionFeed, InventoryConfig, InventoryEngine, ReleaseRequest, ReservationLine,
    ReserveRequest, SeedStock, StockKey,
};
use rstest::{fixture, rstest};

const WAREHOUSE_STOCK: f64 = 100.0;
const THREADS: u32 = 8;
const ROUNDS: u32 = 40;

#[fixture]
fn engine() -> Arc<InventoryEngine> {
    let seed = SeedStock::empty()
        .with(StockKey::warehouse("WH1", "X"), WAREHOUSE_STOCK)
        .with(StockKey::franchisee("FRAN_001", "X"), 10_000.0)
        .with(StockKey::franchisee("FRAN_002", "X"), 10_000.0);
    Arc::new(
        InventoryEngine::new()
            .with_config(
                InventoryConfig::default()
                    .with_feed_interval(Duration::from_millis(1))
                    .with_feed_max_qty(3),
            )
            .with_seed(&seed),
    )
}

fn request(plan_id: &str, qty: f64) -> ReserveRequest {
    ReserveRequest {
        plan_id: plan_id.to_owned(),
        lines: vec![ReservationLine {
            warehouse_id: "WH1".to_owned(),
            order_id: format!("{plan_id}-order"),
            item_id: "X".to_owned(),
            qty,
            non_substitutable: false,
        }],
        ttl_minutes: None,
    }
}

/// Quantities granted and released by one worker.
#[derive(Debug, Default)]
struct Tally {
    granted: f64,
    released: f64,
}

fn reserve_and_release(engine: &InventoryEngine, worker: u32) -> Tally {
    let plan_id = format!("plan-{worker}");
    let mut tally = Tally::default();
    for round in 0..ROUNDS {
        let qty = f64::from(1 + (worker + round) % 3);
        let outcome = engine
            .reserve(&request(&plan_id, qty))
            .expect("request is valid");
        let granted: f64 = outcome.reservations.iter().map(|held| held.qty).sum();
        tally.granted += granted;

        if round % 2 == 1 {
            let ids: Vec<String> = outcome
                .reservations
                .iter()
                .map(|held| held.reservation_id.clone())
                .collect();
            if ids.is_empty() {
                continue;
            }
            let released = engine
                .release(&ReleaseRequest {
                    plan_id: None,
                    reservation_ids: ids.clone(),
                })
                .expect("release is valid");
            assert_eq!(released.released, ids, "a hold is released exactly once");
            tally.released += granted;
        }
        thread::yield_now();
    }
    tally
}

#[rstest]
fn reservations_stay_within_stock_while_the_feed_runs(engine: Arc<InventoryEngine>) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .expect("runtime builds");
    let feed = {
        let _context = runtime.enter();
        ConsumptionFeed::new(Arc::clone(&engine), SeededVariability::seeded(11)).spawn()
    };

    let done = AtomicBool::new(false);
    let tallies: Vec<Tally> = thread::scope(|scope| {
        let observer = scope.spawn(|| {
            let mut samples = 0_u32;
            while !done.load(Ordering::Acquire) {
                let metrics = engine.metrics();
                assert!(
                    metrics.total_reserved_qty <= WAREHOUSE_STOCK,
                    "{} reserved against {WAREHOUSE_STOCK} in stock",
                    metrics.total_reserved_qty
                );
                samples += 1;
                thread::yield_now();
            }
            samples
        });
        let workers: Vec<_> = (0..THREADS)
            .map(|worker| {
                let engine = &engine;
                scope.spawn(move || reserve_and_release(engine, worker))
            })
            .collect();
        let tallies = workers
            .into_iter()
            .map(|worker| worker.join().expect("worker completes"))
            .collect();
        done.store(true, Ordering::Release);
        let samples = observer.join().expect("observer completes");
        assert!(samples > 0, "observer sampled the engine");
        tallies
    });

    for _ in 0..200 {
        if engine.metrics().events_processed > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    runtime.block_on(feed.stop());

    let granted: f64 = tallies.iter().map(|tally| tally.granted).sum();
    let released: f64 = tallies.iter().map(|tally| tally.released).sum();
    let metrics = engine.metrics();
    assert!(metrics.events_processed > 0, "the feed submitted events");
    assert!(granted > 0.0);
    assert_eq!(metrics.total_reserved_qty + released, granted);
    assert!(metrics.total_reserved_qty <= WAREHOUSE_STOCK);
    assert_eq!(
        engine.net_available("WH1", "X"),
        WAREHOUSE_STOCK - metrics.total_reserved_qty
    );
    assert_eq!(
        engine.stock_level(&StockKey::warehouse("WH1", "X")),
        WAREHOUSE_STOCK
    );
}
