//! Tunables for the inventory engine and its consumption feed.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Configuration for [`InventoryEngine`](crate::InventoryEngine).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use haulplan_inventory::InventoryConfig;
///
/// let config = InventoryConfig::default()
///     .with_default_ttl_minutes(60)
///     .with_feed_interval(Duration::from_secs(5));
/// assert_eq!(config.default_ttl_minutes, 60);
/// assert!(config.ttl_bounds.contains(&720));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// TTL applied when a reservation request omits one.
    pub default_ttl_minutes: u32,
    /// Accepted TTL range in minutes.
    pub ttl_bounds: RangeInclusive<u32>,
    /// Delay between synthetic consumption events.
    pub feed_interval: Duration,
    /// Largest quantity a synthetic consumption event removes.
    pub feed_max_qty: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: 480,
            ttl_bounds: 5..=720,
            feed_interval: Duration::from_secs(60),
            feed_max_qty: 5,
        }
    }
}

impl InventoryConfig {
    /// Set the default reservation TTL.
    #[must_use]
    pub fn with_default_ttl_minutes(mut self, minutes: u32) -> Self {
        self.default_ttl_minutes = minutes;
        self
    }

    /// Set the accepted TTL range.
    #[must_use]
    pub fn with_ttl_bounds(mut self, bounds: RangeInclusive<u32>) -> Self {
        self.ttl_bounds = bounds;
        self
    }

    /// Set the consumption feed interval.
    #[must_use]
    pub fn with_feed_interval(mut self, interval: Duration) -> Self {
        self.feed_interval = interval;
        self
    }

    /// Set the largest synthetic consumption quantity.
    #[must_use]
    pub fn with_feed_max_qty(mut self, qty: u32) -> Self {
        self.feed_max_qty = qty;
        self
    }
}
