#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single warehouse pick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PickTask {
    /// One-based position in the pick sequence.
    pub seq: u32,
    /// Warehouse aisle label.
    pub aisle: String,
    /// Two-digit bin label within the aisle.
    pub bin: String,
    /// Item to pick.
    pub item_id: String,
    /// Quantity to pick.
    pub qty: f64,
}

/// Picking and loading instructions for one truck.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PickPackOutput {
    /// Truck being loaded.
    pub truck_id: String,
    /// Picks in sequence order.
    pub pick_tasks: Vec<PickTask>,
    /// Delivery stop ids in reverse delivery order.
    pub loading_order: Vec<String>,
}
