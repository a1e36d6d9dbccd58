//! Tunables for route construction and re-routing.

use haulplan_core::ROAD_FACTOR;

/// A closed numeric interval used for simulated quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl Band {
    /// Band from `low` to `high`.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `value` lies inside the band.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Configuration for [`RoutingEngine`](crate::RoutingEngine).
///
/// # Examples
///
/// ```
/// use haulplan_routing::{Band, RoutingConfig};
///
/// let config = RoutingConfig::default()
///     .with_speed_band(Band::new(1.0, 1.0))
///     .with_overlap_window_minutes(45.0);
/// assert_eq!(config.overlap_window_minutes, 45.0);
/// assert_eq!(config.road_factor, 1.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Multiplier applied to great-circle distances.
    pub road_factor: f64,
    /// Drive minutes per kilometre on outbound legs.
    pub speed_band: Band,
    /// Drive minutes per kilometre on the return leg.
    pub return_minutes_per_km: f64,
    /// Lower ETA confidence margin in minutes.
    pub eta_confidence_low: Band,
    /// Upper ETA confidence margin in minutes.
    pub eta_confidence_high: Band,
    /// Grace period when merging visits in the same cell.
    pub overlap_window_minutes: f64,
    /// Load volume covered by one pick task.
    pub volume_per_pick_task: f64,
    /// Warehouse aisle labels.
    pub aisles: Vec<String>,
    /// Bins per aisle, numbered from 1.
    pub bins_per_aisle: u32,
    /// Quantity per pick task.
    pub pick_qty: Band,
    /// Largest ETA shift applied to a re-routed stop, in minutes.
    pub reroute_max_shift_minutes: u32,
    /// Scale applied to distance and drive time of a changed route.
    pub reroute_scale: Band,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            road_factor: ROAD_FACTOR,
            speed_band: Band::new(1.2, 2.0),
            return_minutes_per_km: 1.5,
            eta_confidence_low: Band::new(5.0, 15.0),
            eta_confidence_high: Band::new(15.0, 30.0),
            overlap_window_minutes: 30.0,
            volume_per_pick_task: 5.0,
            aisles: ["A", "B", "C", "D", "E", "F"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            bins_per_aisle: 50,
            pick_qty: Band::new(1.0, 3.0),
            reroute_max_shift_minutes: 15,
            reroute_scale: Band::new(0.95, 1.05),
        }
    }
}

impl RoutingConfig {
    /// Set the road factor.
    #[must_use]
    pub fn with_road_factor(mut self, road_factor: f64) -> Self {
        self.road_factor = road_factor;
        self
    }

    /// Set the outbound drive minutes per kilometre.
    #[must_use]
    pub fn with_speed_band(mut self, band: Band) -> Self {
        self.speed_band = band;
        self
    }

    /// Set the overlap merge window.
    #[must_use]
    pub fn with_overlap_window_minutes(mut self, minutes: f64) -> Self {
        self.overlap_window_minutes = minutes;
        self
    }

    /// Set the volume covered by one pick task.
    #[must_use]
    pub fn with_volume_per_pick_task(mut self, volume: f64) -> Self {
        self.volume_per_pick_task = volume;
        self
    }

    /// Set the warehouse layout used for pick tasks.
    #[must_use]
    pub fn with_warehouse_layout(mut self, aisles: Vec<String>, bins_per_aisle: u32) -> Self {
        self.aisles = aisles;
        self.bins_per_aisle = bins_per_aisle;
        self
    }

    /// Set the re-route perturbation limits.
    #[must_use]
    pub fn with_reroute_perturbation(mut self, max_shift_minutes: u32, scale: Band) -> Self {
        self.reroute_max_shift_minutes = max_shift_minutes;
        self.reroute_scale = scale;
        self
    }
}
