//! Request-level errors for inventory operations.

use thiserror::Error;

/// Errors that reject an inventory request before any state changes.
///
/// Business-rule shortfalls are not errors: they are reported inside the
/// operation outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    /// The reservation TTL is outside the configured range.
    #[error("ttl_minutes {ttl} is outside {min}..={max}")]
    InvalidTtl {
        /// Requested TTL.
        ttl: u32,
        /// Smallest accepted TTL.
        min: u32,
        /// Largest accepted TTL.
        max: u32,
    },
    /// A request carried no lines.
    #[error("at least one line is required")]
    EmptyLines,
    /// A release named neither a plan nor reservation ids.
    #[error("release requires a plan_id or reservation_ids")]
    EmptyRelease,
    /// A line quantity was negative or not finite.
    #[error("quantity {qty} for item {item_id} must be a non-negative number")]
    InvalidQuantity {
        /// Offending item.
        item_id: String,
        /// Rejected quantity.
        qty: f64,
    },
}

pub(crate) fn check_qty(item_id: &str, qty: f64) -> Result<(), InventoryError> {
    if qty.is_finite() && qty >= 0.0 {
        Ok(())
    } else {
        Err(InventoryError::InvalidQuantity {
            item_id: item_id.to_owned(),
            qty,
        })
    }
}
