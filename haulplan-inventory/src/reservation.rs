//! Time-limited stock holds grouped by plan.

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A hold on warehouse stock for one order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Generated reservation id.
    pub reservation_id: String,
    /// Plan the hold belongs to.
    pub plan_id: String,
    /// Warehouse holding the stock.
    pub warehouse_id: String,
    /// Order the stock is held for.
    pub order_id: String,
    /// Held item.
    pub item_id: String,
    /// Held quantity.
    pub qty: f64,
    /// Creation time.
    pub created_ts: Timestamp,
    /// Expiry time; the hold lapses at this instant.
    pub expires_ts: Option<Timestamp>,
}

impl Reservation {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_ts.is_some_and(|expires| expires <= now)
    }
}

/// One requested hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationLine {
    /// Warehouse to reserve from.
    pub warehouse_id: String,
    /// Order the line belongs to.
    pub order_id: String,
    /// Item to reserve.
    pub item_id: String,
    /// Quantity to reserve.
    pub qty: f64,
    /// The item has no acceptable substitute.
    #[serde(default)]
    pub non_substitutable: bool,
}

/// Request to reserve stock for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveRequest {
    /// Plan grouping the holds.
    pub plan_id: String,
    /// Lines to reserve, at least one.
    pub lines: Vec<ReservationLine>,
    /// Hold lifetime; the configured default applies when absent.
    #[serde(default)]
    pub ttl_minutes: Option<u32>,
}

/// Overall result of a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Every line was reserved.
    Ok,
    /// Some lines were reserved.
    Partial,
    /// No line was reserved.
    Failed,
}

/// A line that could not be reserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsufficientStock {
    /// Warehouse asked for.
    pub warehouse_id: String,
    /// Item asked for.
    pub item_id: String,
    /// Requested quantity.
    pub requested: f64,
    /// Net availability at the time of the request, floored at zero.
    pub available: f64,
}

/// Result of [`InventoryEngine::reserve`](crate::InventoryEngine::reserve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveOutcome {
    /// Overall status.
    pub status: ReservationStatus,
    /// Holds created, in line order.
    pub reservations: Vec<Reservation>,
    /// Lines that could not be held, in line order.
    pub insufficient: Vec<InsufficientStock>,
    /// A non-substitutable line could not be held and needs escalation.
    pub non_substitutable_blocked: bool,
}

/// Request to drop holds by plan, by id, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    /// Release every hold of this plan.
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Release these holds.
    #[serde(default)]
    pub reservation_ids: Vec<String>,
}

/// Result of [`InventoryEngine::release`](crate::InventoryEngine::release).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    /// Ids that were held and are now released.
    pub released: Vec<String>,
    /// Ids that were not held, typically because they expired or were
    /// already released.
    pub not_found: Vec<String>,
}

/// Reservation table and per-plan index.
#[derive(Debug, Default)]
pub(crate) struct ReservationBook {
    reservations: BTreeMap<String, Reservation>,
    plans: BTreeMap<String, BTreeSet<String>>,
}

impl ReservationBook {
    /// Remove and return every hold whose expiry is at or before `now`.
    pub(crate) fn sweep_expired(&mut self, now: Timestamp) -> Vec<Reservation> {
        let expired: Vec<String> = self
            .reservations
            .values()
            .filter(|reservation| reservation.is_expired(now))
            .map(|reservation| reservation.reservation_id.clone())
            .collect();
        expired
            .iter()
            .filter_map(|id| self.remove(id))
            .inspect(|reservation| {
                log::info!(
                    "expired reservation {} for {} units of {} at {}",
                    reservation.reservation_id,
                    reservation.qty,
                    reservation.item_id,
                    reservation.warehouse_id,
                );
            })
            .collect()
    }

    pub(crate) fn insert(&mut self, reservation: Reservation) {
        self.plans
            .entry(reservation.plan_id.clone())
            .or_default()
            .insert(reservation.reservation_id.clone());
        self.reservations
            .insert(reservation.reservation_id.clone(), reservation);
    }

    /// Remove one hold, dropping its plan group once empty.
    pub(crate) fn remove(&mut self, reservation_id: &str) -> Option<Reservation> {
        let reservation = self.reservations.remove(reservation_id)?;
        if let Some(ids) = self.plans.get_mut(&reservation.plan_id) {
            ids.remove(reservation_id);
            if ids.is_empty() {
                self.plans.remove(&reservation.plan_id);
            }
        }
        Some(reservation)
    }

    /// Ids currently held for `plan_id`.
    pub(crate) fn plan_ids(&self, plan_id: &str) -> Vec<String> {
        self.plans
            .get(plan_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Quantity held for `item_id` at `warehouse_id` across all plans.
    pub(crate) fn reserved(&self, warehouse_id: &str, item_id: &str) -> f64 {
        self.reservations
            .values()
            .filter(|r| r.warehouse_id == warehouse_id && r.item_id == item_id)
            .map(|r| r.qty)
            .sum()
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.reservations.len()
    }

    pub(crate) fn total_qty(&self) -> f64 {
        self.reservations.values().map(|r| r.qty).sum()
    }

    pub(crate) fn plan_count(&self) -> usize {
        self.plans.len()
    }
}
