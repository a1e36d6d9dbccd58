//! Warehouse picking and truck loading instructions.

use haulplan_core::{PickPackOutput, PickTask, Route, Variability};

use crate::RoutingConfig;

/// Upper bound on pick tasks generated for a single delivery.
pub const MAX_PICK_TASKS_PER_STOP: u32 = 500;

/// Derive pick tasks and the loading order for `route`.
///
/// Every delivery gets one pick task per `volume_per_pick_task` units of
/// load, with at least one and at most [`MAX_PICK_TASKS_PER_STOP`] tasks. Aisle, bin and quantity come from
/// `variability`. The loading order lists delivery stop ids in reverse
/// delivery order so the first drop is loaded last.
#[must_use]
pub fn sequence_pick_pack(
    route: &Route,
    config: &RoutingConfig,
    variability: &mut dyn Variability,
) -> PickPackOutput {
    let mut pick_tasks = Vec::new();
    let mut seq = 0_u32;
    let bins = i64::from(config.bins_per_aisle.max(1));

    'stops: for stop in route.deliveries() {
        let count = task_count(stop.load_volume, config.volume_per_pick_task);
        if count == MAX_PICK_TASKS_PER_STOP {
            log::debug!(
                "capped pick tasks for {} at {MAX_PICK_TASKS_PER_STOP}",
                stop.stop_id
            );
        }
        for item in 1..=count {
            let Some(next) = seq.checked_add(1) else {
                log::warn!("pick task sequence exhausted on truck {}", route.truck_id);
                break 'stops;
            };
            seq = next;
            let aisle = config
                .aisles
                .get(variability.index(config.aisles.len()))
                .cloned()
                .unwrap_or_default();
            let bin = variability.integer(1, bins);
            pick_tasks.push(PickTask {
                seq,
                aisle,
                bin: format!("{bin:02}"),
                item_id: format!("ITEM_{}_{item}", stop.stop_id),
                qty: variability.uniform(config.pick_qty.low, config.pick_qty.high),
            });
        }
    }

    let mut loading_order: Vec<String> = route
        .deliveries()
        .map(|stop| stop.stop_id.clone())
        .collect();
    loading_order.reverse();

    PickPackOutput {
        truck_id: route.truck_id.clone(),
        pick_tasks,
        loading_order,
    }
}

fn task_count(volume: f64, per_task: f64) -> u32 {
    if per_task <= 0.0 || !volume.is_finite() {
        return 1;
    }
    // Saturating float-to-int conversion.
    ((volume / per_task).floor() as u32).clamp(1, MAX_PICK_TASKS_PER_STOP)
}
