//! Background task synthesising franchisee consumption.

use std::sync::Arc;
use std::time::Duration;

use haulplan_core::{SeededVariability, Variability};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{EventOutcome, InventoryEngine, SnapshotFilter, StockEvent};

/// Periodically consumes a random franchisee stock record.
///
/// Each tick goes through [`InventoryEngine::apply_events`], so the feed
/// takes the same lock as request handlers and gets no special treatment.
#[derive(Debug)]
pub struct ConsumptionFeed<V = SeededVariability> {
    engine: Arc<InventoryEngine>,
    variability: V,
    interval: Duration,
    max_qty: u32,
    sequence: u64,
}

impl<V: Variability> ConsumptionFeed<V> {
    /// Feed over `engine`, using its configured interval and quantity cap.
    #[must_use]
    pub fn new(engine: Arc<InventoryEngine>, variability: V) -> Self {
        let config = engine.config();
        let interval = config.feed_interval;
        let max_qty = config.feed_max_qty.max(1);
        Self {
            engine,
            variability,
            interval,
            max_qty,
            sequence: 0,
        }
    }

    /// Submit one synthetic consume event.
    ///
    /// Returns `None` when no franchisee holds any stock record.
    pub fn tick(&mut self) -> Option<EventOutcome> {
        let snapshot = self.engine.snapshot(&SnapshotFilter::franchisees());
        let index = self.variability.index(snapshot.stock.len());
        let Some(record) = snapshot.stock.get(index) else {
            log::debug!("consumption feed found no franchisee stock");
            return None;
        };
        let qty = self.variability.integer(1, i64::from(self.max_qty));
        self.sequence += 1;
        let event = StockEvent::consume(
            format!("feed-{}", self.sequence),
            snapshot.timestamp,
            record.key.location_id.clone(),
            record.key.item_id.clone(),
            qty as f64,
        );
        let outcome = self.engine.apply_events(std::slice::from_ref(&event));
        for rejected in &outcome.rejected {
            log::warn!(
                "consumption feed event {} rejected: {}",
                rejected.id,
                rejected.error
            );
        }
        Some(outcome)
    }
}

impl<V: Variability + 'static> ConsumptionFeed<V> {
    /// Run the feed on the current Tokio runtime until the handle stops it
    /// or is dropped.
    ///
    /// Each tick runs on the blocking pool, since it takes the engine lock
    /// and may wait on sink I/O.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use = "dropping the handle stops the feed"]
    pub fn spawn(self) -> FeedHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = self.interval.max(Duration::from_millis(1));
        let feed = Arc::new(Mutex::new(self));
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let feed = Arc::clone(&feed);
                        let ticked = tokio::task::spawn_blocking(move || {
                            feed.lock().tick();
                        });
                        if let Err(err) = ticked.await {
                            log::warn!("consumption feed tick failed: {err}");
                            break;
                        }
                    }
                }
            }
            log::debug!("consumption feed stopped after {} events", feed.lock().sequence);
        });
        FeedHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Handle to a running [`ConsumptionFeed`].
#[derive(Debug)]
pub struct FeedHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Stop the feed and wait for its task to finish.
    pub async fn stop(self) {
        if self.stop.send(()).is_err() {
            log::debug!("consumption feed had already stopped");
        }
        if let Err(err) = self.task.await {
            log::warn!("consumption feed task ended abnormally: {err}");
        }
    }
}
