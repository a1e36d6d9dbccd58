//! Stock mutation events and their validation.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{Ledger, StockKey};

/// Kind of stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEventKind {
    /// Stock arrives at a warehouse.
    Replenish,
    /// Stock moves between warehouses.
    Transfer,
    /// A franchisee uses stock.
    Consume,
    /// A counted quantity replaces the ledger value.
    Correction,
}

/// A stock mutation as submitted by callers.
///
/// Which location fields are required depends on [`StockEventKind`]; they
/// are checked when the event is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
    /// Caller-assigned event id.
    pub id: String,
    /// Mutation kind.
    #[serde(rename = "type")]
    pub kind: StockEventKind,
    /// When the mutation happened.
    pub ts: Timestamp,
    /// Affected item.
    pub item_id: String,
    /// Quantity moved or, for corrections, the new absolute quantity.
    pub qty: f64,
    /// Warehouse for replenish and correction events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    /// Franchisee for consume and correction events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub franchisee_id: Option<String>,
    /// Transfer source warehouse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_warehouse_id: Option<String>,
    /// Transfer destination warehouse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_warehouse_id: Option<String>,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StockEvent {
    /// Event of `kind` with no location fields set.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: StockEventKind,
        ts: Timestamp,
        item_id: impl Into<String>,
        qty: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            ts,
            item_id: item_id.into(),
            qty,
            warehouse_id: None,
            franchisee_id: None,
            from_warehouse_id: None,
            to_warehouse_id: None,
            reason: None,
        }
    }

    /// Replenishment of `warehouse_id`.
    #[must_use]
    pub fn replenish(
        id: impl Into<String>,
        ts: Timestamp,
        warehouse_id: impl Into<String>,
        item_id: impl Into<String>,
        qty: f64,
    ) -> Self {
        Self {
            warehouse_id: Some(warehouse_id.into()),
            ..Self::new(id, StockEventKind::Replenish, ts, item_id, qty)
        }
    }

    /// Consumption at `franchisee_id`.
    #[must_use]
    pub fn consume(
        id: impl Into<String>,
        ts: Timestamp,
        franchisee_id: impl Into<String>,
        item_id: impl Into<String>,
        qty: f64,
    ) -> Self {
        Self {
            franchisee_id: Some(franchisee_id.into()),
            ..Self::new(id, StockEventKind::Consume, ts, item_id, qty)
        }
    }

    /// Transfer from `from` to `to`.
    #[must_use]
    pub fn transfer(
        id: impl Into<String>,
        ts: Timestamp,
        from: impl Into<String>,
        to: impl Into<String>,
        item_id: impl Into<String>,
        qty: f64,
    ) -> Self {
        Self {
            from_warehouse_id: Some(from.into()),
            to_warehouse_id: Some(to.into()),
            ..Self::new(id, StockEventKind::Transfer, ts, item_id, qty)
        }
    }

    /// Validate the event's fields and resolve the keys it touches.
    pub(crate) fn mutation(&self) -> Result<Mutation, EventRejection> {
        if !(self.qty.is_finite() && self.qty >= 0.0) {
            return Err(EventRejection::InvalidQuantity { qty: self.qty });
        }
        let item = self.item_id.as_str();
        match self.kind {
            StockEventKind::Replenish => self
                .warehouse_id
                .as_deref()
                .map(|warehouse| Mutation::Add(StockKey::warehouse(warehouse, item)))
                .ok_or(EventRejection::MissingWarehouse),
            StockEventKind::Consume => self
                .franchisee_id
                .as_deref()
                .map(|franchisee| Mutation::Remove(StockKey::franchisee(franchisee, item)))
                .ok_or(EventRejection::MissingFranchisee),
            StockEventKind::Transfer => match (
                self.from_warehouse_id.as_deref(),
                self.to_warehouse_id.as_deref(),
            ) {
                (Some(from), Some(to)) => Ok(Mutation::Move {
                    from: StockKey::warehouse(from, item),
                    to: StockKey::warehouse(to, item),
                }),
                _ => Err(EventRejection::MissingTransferEndpoints),
            },
            StockEventKind::Correction => {
                // A warehouse target takes precedence when both are given.
                match (self.warehouse_id.as_deref(), self.franchisee_id.as_deref()) {
                    (Some(warehouse), _) => Ok(Mutation::Set(StockKey::warehouse(warehouse, item))),
                    (None, Some(franchisee)) => {
                        Ok(Mutation::Set(StockKey::franchisee(franchisee, item)))
                    }
                    (None, None) => Err(EventRejection::MissingCorrectionTarget),
                }
            }
        }
    }
}

/// Why a single event was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventRejection {
    /// Replenish without a warehouse.
    #[error("replenish events require warehouse_id")]
    MissingWarehouse,
    /// Consume without a franchisee.
    #[error("consume events require franchisee_id")]
    MissingFranchisee,
    /// Transfer missing either endpoint.
    #[error("transfer events require from_warehouse_id and to_warehouse_id")]
    MissingTransferEndpoints,
    /// Correction without any target.
    #[error("correction events require warehouse_id or franchisee_id")]
    MissingCorrectionTarget,
    /// Quantity negative or not finite.
    #[error("quantity {qty} must be a non-negative number")]
    InvalidQuantity {
        /// Rejected quantity.
        qty: f64,
    },
    /// Transfer source holds less than the moved quantity.
    #[error("insufficient stock for transfer: {available} < {requested}")]
    InsufficientTransfer {
        /// Source balance.
        available: f64,
        /// Quantity to move.
        requested: f64,
    },
}

/// An event that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEvent {
    /// Event id.
    pub id: String,
    /// Rendered [`EventRejection`].
    pub error: String,
}

/// Result of [`InventoryEngine::apply_events`](crate::InventoryEngine::apply_events).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    /// Number of events applied.
    pub accepted: usize,
    /// Events that were not applied, in submission order.
    pub rejected: Vec<RejectedEvent>,
}

/// Validated ledger change.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Mutation {
    Add(StockKey),
    Remove(StockKey),
    Move { from: StockKey, to: StockKey },
    Set(StockKey),
}

impl Mutation {
    /// Apply `qty` to `ledger` and return the new values of touched keys.
    pub(crate) fn apply(
        self,
        ledger: &mut Ledger,
        qty: f64,
    ) -> Result<Vec<(StockKey, f64)>, EventRejection> {
        match self {
            Self::Add(key) => {
                let updated = ledger.adjust(&key, qty);
                Ok(vec![(key, updated)])
            }
            Self::Remove(key) => {
                let updated = ledger.adjust(&key, -qty);
                Ok(vec![(key, updated)])
            }
            Self::Move { from, to } => {
                let available = ledger.quantity(&from);
                if available < qty {
                    return Err(EventRejection::InsufficientTransfer {
                        available,
                        requested: qty,
                    });
                }
                let source = ledger.adjust(&from, -qty);
                let destination = ledger.adjust(&to, qty);
                Ok(vec![(from, source), (to, destination)])
            }
            Self::Set(key) => {
                ledger.set(key.clone(), qty);
                Ok(vec![(key, qty)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bare(kind: StockEventKind) -> StockEvent {
        StockEvent::new("e1", kind, Timestamp::UNIX_EPOCH, "X", 1.0)
    }

    #[rstest]
    #[case(StockEventKind::Replenish, EventRejection::MissingWarehouse)]
    #[case(StockEventKind::Consume, EventRejection::MissingFranchisee)]
    #[case(StockEventKind::Transfer, EventRejection::MissingTransferEndpoints)]
    #[case(StockEventKind::Correction, EventRejection::MissingCorrectionTarget)]
    fn missing_locations_are_rejected(
        #[case] kind: StockEventKind,
        #[case] expected: EventRejection,
    ) {
        assert_eq!(bare(kind).mutation(), Err(expected));
    }

    #[rstest]
    fn transfer_needs_both_endpoints() {
        let mut event = bare(StockEventKind::Transfer);
        event.from_warehouse_id = Some("WH1".into());
        assert_eq!(
            event.mutation(),
            Err(EventRejection::MissingTransferEndpoints)
        );
    }

    #[rstest]
    fn correction_prefers_warehouse() {
        let mut event = bare(StockEventKind::Correction);
        event.warehouse_id = Some("WH1".into());
        event.franchisee_id = Some("FRAN_001".into());
        assert_eq!(
            event.mutation(),
            Ok(Mutation::Set(StockKey::warehouse("WH1", "X")))
        );
    }

    #[rstest]
    fn negative_quantity_is_rejected() {
        let event = StockEvent::replenish("e1", Timestamp::UNIX_EPOCH, "WH1", "X", -2.0);
        assert_eq!(
            event.mutation(),
            Err(EventRejection::InvalidQuantity { qty: -2.0 })
        );
    }

    #[rstest]
    fn short_transfer_leaves_ledger_alone() {
        let from = StockKey::warehouse("WH1", "X");
        let to = StockKey::warehouse("WH2", "X");
        let mut ledger = Ledger::default();
        ledger.set(from.clone(), 3.0);
        let result = Mutation::Move {
            from: from.clone(),
            to: to.clone(),
        }
        .apply(&mut ledger, 5.0);
        assert_eq!(
            result,
            Err(EventRejection::InsufficientTransfer {
                available: 3.0,
                requested: 5.0
            })
        );
        assert_eq!(ledger.quantity(&from), 3.0);
        assert_eq!(ledger.quantity(&to), 0.0);
        assert_eq!(ledger.len(), 1);
    }

    #[rstest]
    fn event_type_field_is_named_type() {
        let json = r#"{
            "id": "e1",
            "type": "transfer",
            "ts": "2024-03-01T04:00:00Z",
            "item_id": "X",
            "qty": 5,
            "from_warehouse_id": "WH1",
            "to_warehouse_id": "WH2"
        }"#;
        let event: StockEvent = serde_json::from_str(json).expect("event should parse");
        assert_eq!(event.kind, StockEventKind::Transfer);
        assert_eq!(event.to_warehouse_id.as_deref(), Some("WH2"));
    }
}
