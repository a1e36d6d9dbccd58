//! Demand-versus-availability checks for order lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One order line to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityLine {
    /// Order the line belongs to.
    pub order_id: String,
    /// Warehouse expected to supply it.
    pub warehouse_id: String,
    /// Item required.
    pub item_id: String,
    /// Quantity required.
    pub qty: f64,
    /// The item has no acceptable substitute.
    #[serde(default)]
    pub non_substitutable: bool,
}

/// A line that cannot be covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsufficientFeasibility {
    /// Order the line belongs to.
    pub order_id: String,
    /// Warehouse asked for.
    pub warehouse_id: String,
    /// Item asked for.
    pub item_id: String,
    /// Quantity required by the line.
    pub required: f64,
    /// Availability left for the line, floored at zero.
    pub available: f64,
    /// The line is non-substitutable and must be escalated.
    pub non_substitutable_blocked: bool,
}

/// Result of [`InventoryEngine::check_feasibility`](crate::InventoryEngine::check_feasibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityOutcome {
    /// No line is short.
    pub ok: bool,
    /// Short lines, grouped by warehouse and item in first-seen order.
    pub insufficient: Vec<InsufficientFeasibility>,
}

/// Group `lines` by warehouse and item, keeping first-seen order.
pub(crate) fn group_lines(lines: &[FeasibilityLine]) -> Vec<Vec<&FeasibilityLine>> {
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&FeasibilityLine>> = Vec::new();
    for line in lines {
        let key = (line.warehouse_id.as_str(), line.item_id.as_str());
        match positions.get(&key).and_then(|&position| groups.get_mut(position)) {
            Some(group) => group.push(line),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![line]);
            }
        }
    }
    groups
}

/// Walk one group against `net_available`.
///
/// Nothing is short when the group's total fits. Otherwise lines consume
/// availability in input order and every line larger than what remains is
/// reported without consuming anything.
pub(crate) fn shortfalls(
    group: &[&FeasibilityLine],
    net_available: f64,
) -> Vec<InsufficientFeasibility> {
    let required: f64 = group.iter().map(|line| line.qty).sum();
    if required <= net_available {
        return Vec::new();
    }
    let mut remaining = net_available;
    let mut short = Vec::new();
    for line in group {
        if line.qty > remaining {
            short.push(InsufficientFeasibility {
                order_id: line.order_id.clone(),
                warehouse_id: line.warehouse_id.clone(),
                item_id: line.item_id.clone(),
                required: line.qty,
                available: remaining.max(0.0),
                non_substitutable_blocked: line.non_substitutable,
            });
        } else {
            remaining -= line.qty;
        }
    }
    short
}
