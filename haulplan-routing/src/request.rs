//! Planning requests and their validation.

use haulplan_core::{ClockTime, Depot, Stop, Truck};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarsest accepted overlap cell resolution.
pub const MIN_CELL_RESOLUTION: u8 = 4;
/// Finest accepted overlap cell resolution.
pub const MAX_CELL_RESOLUTION: u8 = 15;

/// Planning window and grouping parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanParams {
    /// Start of the delivery window; trucks leave the depot at this time.
    pub window_start: ClockTime,
    /// End of the delivery window.
    pub window_end: ClockTime,
    /// Cell resolution used for overlap detection.
    pub cell_resolution: u8,
}

impl Default for PlanParams {
    fn default() -> Self {
        Self {
            window_start: ClockTime::DEFAULT_WINDOW_START,
            window_end: ClockTime::DEFAULT_WINDOW_END,
            cell_resolution: 8,
        }
    }
}

/// Everything needed to plan one service day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Day the routes run on, interpreted in UTC.
    pub service_date: Date,
    /// Candidate depots.
    pub depots: Vec<Depot>,
    /// Available trucks.
    pub trucks: Vec<Truck>,
    /// Orders to deliver.
    pub stops: Vec<Stop>,
    /// Window and grouping parameters.
    #[serde(default)]
    pub params: PlanParams,
}

/// Reasons a [`PlanRequest`] is rejected before planning starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanRequestValidationError {
    /// No depots were supplied.
    #[error("at least one depot is required")]
    EmptyDepots,
    /// No trucks were supplied.
    #[error("at least one truck is required")]
    EmptyTrucks,
    /// No stops were supplied.
    #[error("at least one stop is required")]
    EmptyStops,
    /// A truck names a depot that is not in the request.
    #[error("truck {truck_id} references unknown depot {depot_id}")]
    UnknownDepot {
        /// Offending truck.
        truck_id: String,
        /// Missing depot id.
        depot_id: String,
    },
    /// A truck capacity was negative or not finite.
    #[error("truck {truck_id} has invalid capacity {capacity}")]
    InvalidCapacity {
        /// Offending truck.
        truck_id: String,
        /// Rejected capacity.
        capacity: f64,
    },
    /// A stop volume was negative or not finite.
    #[error("stop {order_id} has invalid volume {volume}")]
    InvalidVolume {
        /// Offending order.
        order_id: String,
        /// Rejected volume.
        volume: f64,
    },
    /// A stop service time was negative or not finite.
    #[error("stop {order_id} has invalid service time {minutes}")]
    InvalidServiceMinutes {
        /// Offending order.
        order_id: String,
        /// Rejected minutes.
        minutes: f64,
    },
    /// The planning window does not move forward in time.
    #[error("window end {end} must be after window start {start}")]
    InvalidWindow {
        /// Window start.
        start: ClockTime,
        /// Window end.
        end: ClockTime,
    },
    /// The cell resolution is outside the accepted range.
    #[error("cell resolution {resolution} is outside {MIN_CELL_RESOLUTION}..={MAX_CELL_RESOLUTION}")]
    CellResolution {
        /// Rejected resolution.
        resolution: u8,
    },
}

impl PlanRequest {
    /// Check list sizes, numeric ranges and truck depot references.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlanRequestValidationError`] found.
    pub fn validate(&self) -> Result<(), PlanRequestValidationError> {
        if self.depots.is_empty() {
            return Err(PlanRequestValidationError::EmptyDepots);
        }
        if self.trucks.is_empty() {
            return Err(PlanRequestValidationError::EmptyTrucks);
        }
        if self.stops.is_empty() {
            return Err(PlanRequestValidationError::EmptyStops);
        }
        self.params.validate()?;
        for truck in &self.trucks {
            if !is_non_negative(truck.capacity_volume) {
                return Err(PlanRequestValidationError::InvalidCapacity {
                    truck_id: truck.id.clone(),
                    capacity: truck.capacity_volume,
                });
            }
            if !self.depots.iter().any(|depot| depot.id == truck.depot_id) {
                return Err(PlanRequestValidationError::UnknownDepot {
                    truck_id: truck.id.clone(),
                    depot_id: truck.depot_id.clone(),
                });
            }
        }
        for stop in &self.stops {
            if !is_non_negative(stop.volume) {
                return Err(PlanRequestValidationError::InvalidVolume {
                    order_id: stop.order_id.clone(),
                    volume: stop.volume,
                });
            }
            if !is_non_negative(stop.service_minutes) {
                return Err(PlanRequestValidationError::InvalidServiceMinutes {
                    order_id: stop.order_id.clone(),
                    minutes: stop.service_minutes,
                });
            }
        }
        Ok(())
    }
}

impl PlanParams {
    fn validate(&self) -> Result<(), PlanRequestValidationError> {
        if self.window_end <= self.window_start {
            return Err(PlanRequestValidationError::InvalidWindow {
                start: self.window_start,
                end: self.window_end,
            });
        }
        if !(MIN_CELL_RESOLUTION..=MAX_CELL_RESOLUTION).contains(&self.cell_resolution) {
            return Err(PlanRequestValidationError::CellResolution {
                resolution: self.cell_resolution,
            });
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
