use jiff::Timestamp;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CellId;

/// Two or more trucks serving the same cell in overlapping time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlapIncident {
    /// Shared cell.
    pub spatial_cell: CellId,
    /// Earliest arrival in the overlapping group.
    pub start_ts: Timestamp,
    /// Latest service end in the overlapping group.
    pub end_ts: Timestamp,
    /// Distinct trucks involved, in order of first arrival.
    pub truck_ids: Vec<String>,
}
