//! Quantities on hand per location and item.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of site holding stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Distribution warehouse.
    Warehouse,
    /// Franchisee store.
    Franchisee,
}

impl LocationKind {
    /// Lower-case label used in persisted rows.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warehouse => "warehouse",
            Self::Franchisee => "franchisee",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique key of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    /// Kind of site.
    pub location_kind: LocationKind,
    /// Site identifier.
    pub location_id: String,
    /// Item identifier.
    pub item_id: String,
}

impl StockKey {
    /// Key for `item_id` at warehouse `warehouse_id`.
    #[must_use]
    pub fn warehouse(warehouse_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            location_kind: LocationKind::Warehouse,
            location_id: warehouse_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Key for `item_id` at franchisee `franchisee_id`.
    #[must_use]
    pub fn franchisee(franchisee_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            location_kind: LocationKind::Franchisee,
            location_id: franchisee_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// A ledger entry as reported by snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Entry key.
    #[serde(flatten)]
    pub key: StockKey,
    /// Quantity on hand.
    pub qty: f64,
}

#[derive(Debug, Default)]
pub(crate) struct Ledger {
    stock: BTreeMap<StockKey, f64>,
}

impl Ledger {
    pub(crate) fn quantity(&self, key: &StockKey) -> f64 {
        self.stock.get(key).copied().unwrap_or(0.0)
    }

    pub(crate) fn set(&mut self, key: StockKey, qty: f64) {
        self.stock.insert(key, qty);
    }

    /// Add `delta` (possibly negative) to `key`, clamping at zero.
    pub(crate) fn adjust(&mut self, key: &StockKey, delta: f64) -> f64 {
        let entry = self.stock.entry(key.clone()).or_insert(0.0);
        *entry = (*entry + delta).max(0.0);
        *entry
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&StockKey, f64)> {
        self.stock.iter().map(|(key, qty)| (key, *qty))
    }

    pub(crate) fn len(&self) -> usize {
        self.stock.len()
    }

    pub(crate) fn total(&self) -> f64 {
        self.stock.values().sum()
    }
}
