//! The inventory engine: one lock around ledger, reservations and event log.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use haulplan_core::{Clock, SystemClock};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::check_qty;
use crate::event::{EventOutcome, EventRejection, RejectedEvent, StockEvent};
use crate::feasibility::{FeasibilityLine, FeasibilityOutcome, group_lines, shortfalls};
use crate::ledger::{Ledger, LocationKind, StockKey, StockRecord};
use crate::reservation::{
    InsufficientStock, ReleaseOutcome, ReleaseRequest, Reservation, ReservationBook,
    ReservationStatus, ReserveOutcome, ReserveRequest,
};
use crate::{InventoryConfig, InventoryError, NullStockSink, SeedStock, StockSink};

/// Selects the ledger entries and reservations returned by
/// [`InventoryEngine::snapshot`].
///
/// Absent fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFilter {
    /// Only entries of this location kind.
    #[serde(default)]
    pub location_kind: Option<LocationKind>,
    /// Only entries at this site.
    #[serde(default)]
    pub location_id: Option<String>,
    /// Only these items.
    #[serde(default)]
    pub item_ids: Option<Vec<String>>,
    /// Attach matching reservations to the snapshot.
    #[serde(default = "include_reservations_default")]
    pub include_reservations: bool,
}

fn include_reservations_default() -> bool {
    true
}

impl Default for SnapshotFilter {
    fn default() -> Self {
        Self {
            location_kind: None,
            location_id: None,
            item_ids: None,
            include_reservations: true,
        }
    }
}

impl SnapshotFilter {
    /// Every franchisee entry, without reservations.
    #[must_use]
    pub fn franchisees() -> Self {
        Self {
            location_kind: Some(LocationKind::Franchisee),
            include_reservations: false,
            ..Self::default()
        }
    }

    /// Entries and reservations at warehouse `warehouse_id`.
    #[must_use]
    pub fn warehouse(warehouse_id: impl Into<String>) -> Self {
        Self {
            location_kind: Some(LocationKind::Warehouse),
            location_id: Some(warehouse_id.into()),
            ..Self::default()
        }
    }

    /// Restrict to `item_ids`.
    #[must_use]
    pub fn with_items<I, S>(mut self, item_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_ids = Some(item_ids.into_iter().map(Into::into).collect());
        self
    }

    fn matches_item(&self, item_id: &str) -> bool {
        self.item_ids
            .as_ref()
            .is_none_or(|items| items.iter().any(|item| item == item_id))
    }

    fn matches_key(&self, key: &StockKey) -> bool {
        self.location_kind.is_none_or(|kind| kind == key.location_kind)
            && self
                .location_id
                .as_ref()
                .is_none_or(|id| *id == key.location_id)
            && self.matches_item(&key.item_id)
    }

    fn matches_reservation(&self, reservation: &Reservation) -> bool {
        self.location_kind != Some(LocationKind::Franchisee)
            && self
                .location_id
                .as_ref()
                .is_none_or(|id| *id == reservation.warehouse_id)
            && self.matches_item(&reservation.item_id)
    }
}

/// Point-in-time view of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Instant the snapshot was taken.
    pub timestamp: Timestamp,
    /// Matching entries in key order.
    pub stock: Vec<StockRecord>,
    /// Matching live reservations when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Vec<Reservation>>,
}

/// Aggregate counters over the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    /// Ledger entries.
    pub total_stock_items: usize,
    /// Sum of all ledger quantities.
    pub total_stock_qty: f64,
    /// Live reservations.
    pub active_reservations: usize,
    /// Sum of live reservation quantities.
    pub total_reserved_qty: f64,
    /// Accepted events since construction.
    pub events_processed: usize,
    /// Plans holding at least one live reservation.
    pub active_plans: usize,
}

#[derive(Debug, Default)]
struct InventoryState {
    ledger: Ledger,
    book: ReservationBook,
    events: Vec<StockEvent>,
    /// Stamp of the most recent batch handed to the sink.
    write_seq: u64,
}

/// Sequence number of the last sink write per key.
///
/// Batches are stamped under the state lock, so a higher stamp always
/// carries the newer quantity. A batch whose stamp is older than the one
/// already written for a key is stale and skipped.
#[derive(Debug, Default)]
struct SinkWatermarks {
    written: HashMap<StockKey, u64>,
}

impl SinkWatermarks {
    fn claim(&mut self, key: &StockKey, seq: u64) -> bool {
        match self.written.get_mut(key) {
            Some(last) if *last > seq => false,
            Some(last) => {
                *last = seq;
                true
            }
            None => {
                self.written.insert(key.clone(), seq);
                true
            }
        }
    }
}

impl InventoryState {
    fn sweep(&mut self, now: Timestamp) {
        self.book.sweep_expired(now);
    }

    /// Ledger quantity minus live holds; negative when a correction has
    /// dropped stock below what is reserved.
    fn net_available(&self, warehouse_id: &str, item_id: &str) -> f64 {
        self.ledger
            .quantity(&StockKey::warehouse(warehouse_id, item_id))
            - self.book.reserved(warehouse_id, item_id)
    }

    fn apply(&mut self, event: &StockEvent) -> Result<Vec<(StockKey, f64)>, EventRejection> {
        let changes = event.mutation()?.apply(&mut self.ledger, event.qty)?;
        self.events.push(event.clone());
        Ok(changes)
    }
}

/// In-memory stock ledger with reservations and an event log.
///
/// All operations take one exclusive lock for their whole duration and
/// start by purging expired reservations. The engine shares no state with
/// the routing engine; callers combining the two sequence the calls and
/// compensate on failure, for example by releasing a plan's reservations
/// when planning fails.
pub struct InventoryEngine {
    state: Mutex<InventoryState>,
    sink_watermarks: Mutex<SinkWatermarks>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn StockSink>,
    config: InventoryConfig,
}

impl fmt::Debug for InventoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("InventoryEngine")
            .field("config", &self.config)
            .field("stock_items", &state.ledger.len())
            .field("reservations", &state.book.len())
            .field("events", &state.events.len())
            .finish_non_exhaustive()
    }
}

impl Default for InventoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryEngine {
    /// Empty engine using the system clock and no persistence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InventoryState::default()),
            sink_watermarks: Mutex::new(SinkWatermarks::default()),
            clock: Arc::new(SystemClock),
            sink: Arc::new(NullStockSink),
            config: InventoryConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: InventoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock used for expiry and timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the persistence sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn StockSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Load `seed` into the ledger, replacing existing quantities.
    ///
    /// Seeding is construction-time setup and is not forwarded to the sink.
    #[must_use]
    pub fn with_seed(mut self, seed: &SeedStock) -> Self {
        let state = self.state.get_mut();
        for (key, qty) in seed.entries() {
            state.ledger.set(key.clone(), qty);
        }
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Entries and, optionally, reservations matching `filter`.
    pub fn snapshot(&self, filter: &SnapshotFilter) -> Snapshot {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.sweep(now);
        let stock = state
            .ledger
            .iter()
            .filter(|(key, _)| filter.matches_key(key))
            .map(|(key, qty)| StockRecord {
                key: key.clone(),
                qty,
            })
            .collect();
        let reservations = filter.include_reservations.then(|| {
            state
                .book
                .all()
                .filter(|reservation| filter.matches_reservation(reservation))
                .cloned()
                .collect()
        });
        Snapshot {
            timestamp: now,
            stock,
            reservations,
        }
    }

    /// Quantity on hand for `key`, ignoring reservations.
    pub fn stock_level(&self, key: &StockKey) -> f64 {
        self.state.lock().ledger.quantity(key)
    }

    /// Quantity of `item_id` at `warehouse_id` not held by a live
    /// reservation, floored at zero.
    pub fn net_available(&self, warehouse_id: &str, item_id: &str) -> f64 {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.sweep(now);
        state.net_available(warehouse_id, item_id).max(0.0)
    }

    /// Hold stock for every line that fits within net availability.
    ///
    /// Lines are processed in order, so a later line sees the holds created
    /// by earlier lines of the same request. Shortfalls are reported in the
    /// outcome rather than as errors.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptyLines`], [`InventoryError::InvalidTtl`]
    /// or [`InventoryError::InvalidQuantity`] for malformed requests; no
    /// reservation is created in that case.
    pub fn reserve(&self, request: &ReserveRequest) -> Result<ReserveOutcome, InventoryError> {
        if request.lines.is_empty() {
            return Err(InventoryError::EmptyLines);
        }
        let ttl = request
            .ttl_minutes
            .unwrap_or(self.config.default_ttl_minutes);
        if !self.config.ttl_bounds.contains(&ttl) {
            return Err(InventoryError::InvalidTtl {
                ttl,
                min: *self.config.ttl_bounds.start(),
                max: *self.config.ttl_bounds.end(),
            });
        }
        for line in &request.lines {
            check_qty(&line.item_id, line.qty)?;
        }

        let now = self.clock.now();
        let expires_ts = now
            .checked_add(SignedDuration::from_mins(i64::from(ttl)))
            .unwrap_or(Timestamp::MAX);
        let mut state = self.state.lock();
        state.sweep(now);

        let mut reservations = Vec::new();
        let mut insufficient = Vec::new();
        let mut non_substitutable_blocked = false;
        for line in &request.lines {
            let available = state.net_available(&line.warehouse_id, &line.item_id);
            if line.qty <= available {
                let reservation = Reservation {
                    reservation_id: Uuid::new_v4().to_string(),
                    plan_id: request.plan_id.clone(),
                    warehouse_id: line.warehouse_id.clone(),
                    order_id: line.order_id.clone(),
                    item_id: line.item_id.clone(),
                    qty: line.qty,
                    created_ts: now,
                    expires_ts: Some(expires_ts),
                };
                state.book.insert(reservation.clone());
                reservations.push(reservation);
                continue;
            }
            let available = available.max(0.0);
            if line.non_substitutable {
                non_substitutable_blocked = true;
                log::error!(
                    "orchestration alert: plan {} order {} cannot reserve non-substitutable \
                     {} x {} at {} ({} available)",
                    request.plan_id,
                    line.order_id,
                    line.qty,
                    line.item_id,
                    line.warehouse_id,
                    available,
                );
            }
            insufficient.push(InsufficientStock {
                warehouse_id: line.warehouse_id.clone(),
                item_id: line.item_id.clone(),
                requested: line.qty,
                available,
            });
        }

        let status = match (reservations.is_empty(), insufficient.is_empty()) {
            (_, true) => ReservationStatus::Ok,
            (true, false) => ReservationStatus::Failed,
            (false, false) => ReservationStatus::Partial,
        };
        log::info!(
            "plan {} reservation {:?}: {} held, {} short",
            request.plan_id,
            status,
            reservations.len(),
            insufficient.len(),
        );
        Ok(ReserveOutcome {
            status,
            reservations,
            insufficient,
            non_substitutable_blocked,
        })
    }

    /// Drop reservations by plan, by id, or both.
    ///
    /// Plan releases report the ids they removed; a plan with no live
    /// reservations is a no-op. Ids that are not held are reported in
    /// `not_found`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptyRelease`] when neither a plan nor ids
    /// are given.
    pub fn release(&self, request: &ReleaseRequest) -> Result<ReleaseOutcome, InventoryError> {
        if request.plan_id.is_none() && request.reservation_ids.is_empty() {
            return Err(InventoryError::EmptyRelease);
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.sweep(now);

        let mut outcome = ReleaseOutcome::default();
        if let Some(plan_id) = &request.plan_id {
            for id in state.book.plan_ids(plan_id) {
                if state.book.remove(&id).is_some() {
                    outcome.released.push(id);
                }
            }
        }
        for id in &request.reservation_ids {
            if state.book.remove(id).is_some() {
                outcome.released.push(id.clone());
            } else {
                outcome.not_found.push(id.clone());
            }
        }
        log::info!(
            "released {} reservations, {} not found",
            outcome.released.len(),
            outcome.not_found.len(),
        );
        Ok(outcome)
    }

    /// Apply each event independently.
    ///
    /// A rejected event leaves the ledger untouched and does not stop later
    /// events. New quantities of touched entries are written to the sink
    /// once the lock is released; sink failures are logged. Overlapping
    /// calls never let an older quantity overwrite a newer one in the sink.
    pub fn apply_events(&self, events: &[StockEvent]) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        let mut touched = Vec::new();
        let seq = {
            let now = self.clock.now();
            let mut state = self.state.lock();
            state.sweep(now);
            for event in events {
                match state.apply(event) {
                    Ok(changes) => {
                        log::info!(
                            "applied {:?} event {} for {} x {}",
                            event.kind,
                            event.id,
                            event.qty,
                            event.item_id,
                        );
                        outcome.accepted += 1;
                        touched.extend(changes);
                    }
                    Err(rejection) => {
                        log::warn!("rejected event {}: {rejection}", event.id);
                        outcome.rejected.push(RejectedEvent {
                            id: event.id.clone(),
                            error: rejection.to_string(),
                        });
                    }
                }
            }
            state.write_seq += 1;
            state.write_seq
        };
        self.persist(seq, &touched);
        outcome
    }

    /// Forward ledger changes stamped `seq` to the sink.
    ///
    /// Runs without the state lock. The watermark lock is held across the
    /// writes so concurrent batches reach the sink one at a time.
    fn persist(&self, seq: u64, changes: &[(StockKey, f64)]) {
        if changes.is_empty() {
            return;
        }
        let mut watermarks = self.sink_watermarks.lock();
        for (key, qty) in changes {
            if !watermarks.claim(key, seq) {
                log::debug!(
                    "skipped stale write of {qty} for {} {} {}",
                    key.location_kind,
                    key.location_id,
                    key.item_id,
                );
                continue;
            }
            if let Err(err) = self.sink.upsert(key, *qty) {
                log::warn!(
                    "failed to persist {} {} {}: {err}",
                    key.location_kind,
                    key.location_id,
                    key.item_id,
                );
            }
        }
    }

    /// Check whether warehouse stock can cover `lines` without holding it.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptyLines`] or
    /// [`InventoryError::InvalidQuantity`] for malformed input.
    pub fn check_feasibility(
        &self,
        lines: &[FeasibilityLine],
    ) -> Result<FeasibilityOutcome, InventoryError> {
        if lines.is_empty() {
            return Err(InventoryError::EmptyLines);
        }
        for line in lines {
            check_qty(&line.item_id, line.qty)?;
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.sweep(now);

        let mut insufficient = Vec::new();
        for group in group_lines(lines) {
            let Some(first) = group.first() else {
                continue;
            };
            let available = state.net_available(&first.warehouse_id, &first.item_id);
            insufficient.extend(shortfalls(&group, available));
        }
        for short in &insufficient {
            if short.non_substitutable_blocked {
                log::error!(
                    "orchestration alert: order {} needs non-substitutable {} x {} at {} ({} available)",
                    short.order_id,
                    short.required,
                    short.item_id,
                    short.warehouse_id,
                    short.available,
                );
            } else {
                log::warn!(
                    "order {} short of {} x {} at {} ({} available)",
                    short.order_id,
                    short.required,
                    short.item_id,
                    short.warehouse_id,
                    short.available,
                );
            }
        }
        Ok(FeasibilityOutcome {
            ok: insufficient.is_empty(),
            insufficient,
        })
    }

    /// Counters over the current state.
    pub fn metrics(&self) -> InventoryMetrics {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.sweep(now);
        InventoryMetrics {
            total_stock_items: state.ledger.len(),
            total_stock_qty: state.ledger.total(),
            active_reservations: state.book.len(),
            total_reserved_qty: state.book.total_qty(),
            events_processed: state.events.len(),
            active_plans: state.book.plan_count(),
        }
    }

    /// Accepted events in application order.
    pub fn events(&self) -> Vec<StockEvent> {
        self.state.lock().events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReservationLine;
    use crate::test_support::{PausingStockSink, RecordingStockSink};
    use haulplan_core::test_support::ManualClock;
    use rstest::{fixture, rstest};
    use std::thread;
    use std::time::Duration;

    struct Harness {
        engine: InventoryEngine,
        clock: Arc<ManualClock>,
        sink: Arc<RecordingStockSink>,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::default());
        let sink = Arc::new(RecordingStockSink::new());
        let seed = SeedStock::empty()
            .with(StockKey::warehouse("WH1", "X"), 10.0)
            .with(StockKey::warehouse("WH1", "Y"), 4.0)
            .with(StockKey::franchisee("FRAN_001", "X"), 3.0);
        let engine = InventoryEngine::new()
            .with_clock(clock.clone())
            .with_sink(sink.clone())
            .with_seed(&seed);
        Harness {
            engine,
            clock,
            sink,
        }
    }

    fn line(item: &str, qty: f64, non_substitutable: bool) -> ReservationLine {
        ReservationLine {
            warehouse_id: "WH1".into(),
            order_id: "ORD-1".into(),
            item_id: item.into(),
            qty,
            non_substitutable,
        }
    }

    fn request(lines: Vec<ReservationLine>, ttl: Option<u32>) -> ReserveRequest {
        ReserveRequest {
            plan_id: "plan-1".into(),
            lines,
            ttl_minutes: ttl,
        }
    }

    #[rstest]
    fn partial_reservation_flags_non_substitutable(harness: Harness) {
        let outcome = harness
            .engine
            .reserve(&request(vec![line("X", 6.0, false), line("Y", 5.0, true)], None))
            .expect("valid request");
        assert_eq!(outcome.status, ReservationStatus::Partial);
        assert_eq!(outcome.reservations.len(), 1);
        assert_eq!(outcome.insufficient[0].available, 4.0);
        assert!(outcome.non_substitutable_blocked);
        assert_eq!(harness.engine.net_available("WH1", "X"), 4.0);
    }

    #[rstest]
    fn later_lines_see_earlier_holds(harness: Harness) {
        let outcome = harness
            .engine
            .reserve(&request(vec![line("X", 6.0, false), line("X", 6.0, false)], None))
            .expect("valid request");
        assert_eq!(outcome.status, ReservationStatus::Partial);
        assert_eq!(outcome.insufficient[0].available, 4.0);
    }

    #[rstest]
    #[case(Some(4))]
    #[case(Some(721))]
    fn ttl_outside_bounds_is_rejected(harness: Harness, #[case] ttl: Option<u32>) {
        let err = harness
            .engine
            .reserve(&request(vec![line("X", 1.0, false)], ttl))
            .expect_err("ttl out of range");
        assert!(matches!(err, InventoryError::InvalidTtl { min: 5, max: 720, .. }));
        assert_eq!(harness.engine.metrics().active_reservations, 0);
    }

    #[rstest]
    fn empty_lines_are_rejected(harness: Harness) {
        assert_eq!(
            harness.engine.reserve(&request(Vec::new(), None)),
            Err(InventoryError::EmptyLines)
        );
    }

    #[rstest]
    fn reservations_lapse_at_expiry(harness: Harness) {
        harness
            .engine
            .reserve(&request(vec![line("X", 10.0, false)], Some(30)))
            .expect("valid request");
        harness.clock.advance_minutes(29);
        assert_eq!(harness.engine.net_available("WH1", "X"), 0.0);
        harness.clock.advance_minutes(1);
        assert_eq!(harness.engine.net_available("WH1", "X"), 10.0);
        let snapshot = harness.engine.snapshot(&SnapshotFilter::default());
        assert_eq!(snapshot.reservations, Some(Vec::new()));
    }

    #[rstest]
    fn release_by_plan_and_id_merge(harness: Harness) {
        let outcome = harness
            .engine
            .reserve(&request(vec![line("X", 1.0, false), line("Y", 1.0, false)], None))
            .expect("valid request");
        let first = outcome.reservations[0].reservation_id.clone();
        let released = harness
            .engine
            .release(&ReleaseRequest {
                plan_id: Some("plan-1".into()),
                reservation_ids: vec![first.clone(), "missing".into()],
            })
            .expect("valid release");
        assert_eq!(released.released.len(), 2);
        assert_eq!(released.not_found, [first, "missing".to_owned()]);
        assert_eq!(harness.engine.metrics().active_plans, 0);
    }

    #[rstest]
    fn release_needs_a_target(harness: Harness) {
        assert_eq!(
            harness.engine.release(&ReleaseRequest::default()),
            Err(InventoryError::EmptyRelease)
        );
    }

    #[rstest]
    fn unknown_plan_release_is_a_no_op(harness: Harness) {
        let outcome = harness
            .engine
            .release(&ReleaseRequest {
                plan_id: Some("nothing".into()),
                reservation_ids: Vec::new(),
            })
            .expect("valid release");
        assert_eq!(outcome, ReleaseOutcome::default());
    }

    #[rstest]
    fn rejected_events_do_not_block_the_batch(harness: Harness) {
        let ts = Timestamp::UNIX_EPOCH;
        let outcome = harness.engine.apply_events(&[
            StockEvent::transfer("e1", ts, "WH1", "WH2", "Y", 5.0),
            StockEvent::replenish("e2", ts, "WH1", "Y", 2.0),
        ]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.rejected[0].id, "e1");
        assert_eq!(
            harness.engine.stock_level(&StockKey::warehouse("WH1", "Y")),
            6.0
        );
        assert_eq!(harness.sink.writes(), [(StockKey::warehouse("WH1", "Y"), 6.0)]);
        assert_eq!(harness.engine.events().len(), 1);
    }

    #[rstest]
    fn sink_failures_keep_the_mutation() {
        let sink = Arc::new(RecordingStockSink::failing());
        let engine = InventoryEngine::new().with_sink(sink.clone());
        let outcome = engine.apply_events(&[StockEvent::replenish(
            "e1",
            Timestamp::UNIX_EPOCH,
            "WH1",
            "X",
            3.0,
        )]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(sink.writes().len(), 1);
        assert_eq!(engine.stock_level(&StockKey::warehouse("WH1", "X")), 3.0);
    }

    #[rstest]
    fn overlapping_batches_persist_the_latest_quantity() {
        let (sink, entered) = PausingStockSink::new(5.0, Duration::from_millis(300));
        let sink = Arc::new(sink);
        let engine = Arc::new(InventoryEngine::new().with_sink(sink.clone()));
        let key = StockKey::warehouse("WH1", "X");

        let first = thread::spawn({
            let engine = Arc::clone(&engine);
            move || {
                engine.apply_events(&[StockEvent::replenish(
                    "e1",
                    Timestamp::UNIX_EPOCH,
                    "WH1",
                    "X",
                    5.0,
                )])
            }
        });
        entered.recv().expect("first write reaches the sink");
        let second = engine.apply_events(&[StockEvent::replenish(
            "e2",
            Timestamp::UNIX_EPOCH,
            "WH1",
            "X",
            2.0,
        )]);
        let first = first.join().expect("first batch completes");

        assert_eq!(first.accepted, 1);
        assert_eq!(second.accepted, 1);
        assert_eq!(engine.stock_level(&key), 7.0);
        assert_eq!(sink.latest(&key), Some(7.0));
        assert_eq!(sink.writes(), [(key.clone(), 5.0), (key, 7.0)]);
    }

    #[rstest]
    fn repeated_key_in_one_batch_persists_the_final_quantity(harness: Harness) {
        let ts = Timestamp::UNIX_EPOCH;
        harness.engine.apply_events(&[
            StockEvent::replenish("e1", ts, "WH1", "Y", 1.0),
            StockEvent::replenish("e2", ts, "WH1", "Y", 2.0),
        ]);
        let key = StockKey::warehouse("WH1", "Y");
        assert_eq!(harness.sink.writes(), [(key.clone(), 5.0), (key, 7.0)]);
    }

    #[rstest]
    fn stale_batches_are_not_written_back() {
        let mut watermarks = SinkWatermarks::default();
        let key = StockKey::warehouse("WH1", "X");
        assert!(watermarks.claim(&key, 2));
        assert!(!watermarks.claim(&key, 1));
        assert!(watermarks.claim(&key, 2));
        assert!(watermarks.claim(&key, 3));
    }

    #[rstest]
    fn feasibility_uses_net_availability(harness: Harness) {
        harness
            .engine
            .reserve(&request(vec![line("X", 7.0, false)], None))
            .expect("valid request");
        let outcome = harness
            .engine
            .check_feasibility(&[FeasibilityLine {
                order_id: "ORD-2".into(),
                warehouse_id: "WH1".into(),
                item_id: "X".into(),
                qty: 4.0,
                non_substitutable: true,
            }])
            .expect("valid lines");
        assert!(!outcome.ok);
        assert_eq!(outcome.insufficient[0].available, 3.0);
        assert!(outcome.insufficient[0].non_substitutable_blocked);
    }

    #[rstest]
    fn snapshot_filters_by_kind_and_item(harness: Harness) {
        let snapshot = harness
            .engine
            .snapshot(&SnapshotFilter::warehouse("WH1").with_items(["Y"]));
        assert_eq!(snapshot.stock.len(), 1);
        assert_eq!(snapshot.stock[0].qty, 4.0);

        let franchisees = harness.engine.snapshot(&SnapshotFilter::franchisees());
        assert_eq!(franchisees.stock.len(), 1);
        assert!(franchisees.reservations.is_none());
    }

    #[rstest]
    fn metrics_count_live_state(harness: Harness) {
        harness
            .engine
            .reserve(&request(vec![line("X", 2.0, false)], None))
            .expect("valid request");
        let metrics = harness.engine.metrics();
        assert_eq!(metrics.total_stock_items, 3);
        assert_eq!(metrics.total_stock_qty, 17.0);
        assert_eq!(metrics.active_reservations, 1);
        assert_eq!(metrics.total_reserved_qty, 2.0);
        assert_eq!(metrics.active_plans, 1);
        assert_eq!(metrics.events_processed, 0);
    }
}
