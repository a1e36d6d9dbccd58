//! Doubles for the inventory seams.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{StockKey, StockSink, StockSinkError};

/// [`StockSink`] that records every write.
///
/// A failing sink records the attempt and then reports an error.
#[derive(Debug, Default)]
pub struct RecordingStockSink {
    writes: Mutex<Vec<(StockKey, f64)>>,
    fail: bool,
}

impl RecordingStockSink {
    /// Sink accepting every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink rejecting every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Writes seen so far, in call order.
    #[must_use]
    pub fn writes(&self) -> Vec<(StockKey, f64)> {
        self.writes.lock().clone()
    }
}

impl StockSink for RecordingStockSink {
    fn upsert(&self, key: &StockKey, qty: f64) -> Result<(), StockSinkError> {
        self.writes.lock().push((key.clone(), qty));
        if self.fail {
            Err(StockSinkError::new("recording sink configured to fail"))
        } else {
            Ok(())
        }
    }
}

/// [`StockSink`] that stalls on one quantity.
///
/// Before stalling it sends on the channel returned by
/// [`PausingStockSink::new`], so a test can start a competing call while the
/// write is in flight. Writes are recorded once they complete.
#[derive(Debug)]
pub struct PausingStockSink {
    pause_on: f64,
    pause: Duration,
    entered: Mutex<mpsc::Sender<()>>,
    inner: RecordingStockSink,
}

impl PausingStockSink {
    /// Sink pausing for `pause` whenever it is asked to write `pause_on`.
    #[must_use]
    pub fn new(pause_on: f64, pause: Duration) -> (Self, mpsc::Receiver<()>) {
        let (entered, receiver) = mpsc::channel();
        let sink = Self {
            pause_on,
            pause,
            entered: Mutex::new(entered),
            inner: RecordingStockSink::new(),
        };
        (sink, receiver)
    }

    /// Completed writes, in completion order.
    #[must_use]
    pub fn writes(&self) -> Vec<(StockKey, f64)> {
        self.inner.writes()
    }

    /// Last quantity written for `key`.
    #[must_use]
    pub fn latest(&self, key: &StockKey) -> Option<f64> {
        self.inner
            .writes()
            .into_iter()
            .rev()
            .find_map(|(written, qty)| (written == *key).then_some(qty))
    }
}

impl StockSink for PausingStockSink {
    fn upsert(&self, key: &StockKey, qty: f64) -> Result<(), StockSinkError> {
        if (qty - self.pause_on).abs() < f64::EPSILON {
            if self.entered.lock().send(()).is_err() {
                log::debug!("nobody is waiting for the paused write");
            }
            thread::sleep(self.pause);
        }
        self.inner.upsert(key, qty)
    }
}
