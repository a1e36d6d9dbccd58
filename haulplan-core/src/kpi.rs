#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plan-level performance indicators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kpis {
    /// Fraction of deliveries expected on time, in `[0, 1]`.
    pub on_time_pct: f64,
    /// Overlap incidents per delivery.
    pub overlap_pct: f64,
    /// Route miles per delivery.
    pub miles_per_order: f64,
    /// Wall-clock seconds spent computing the plan.
    pub runtime_seconds: f64,
}
