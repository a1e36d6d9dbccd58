//! Fixtures for writing CLI inputs to a temporary workspace.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Temporary directory exposed as a UTF-8 path.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

/// One depot, one truck and two stops near Toronto.
pub(super) const PLAN_REQUEST_JSON: &str = r#"{
    "service_date": "2024-03-01",
    "depots": [
        {"id": "north", "location": {"lat": 43.761539, "lon": -79.411079}}
    ],
    "trucks": [
        {"id": "T1", "depot_id": "north", "capacity_volume": 100.0}
    ],
    "stops": [
        {
            "order_id": "ORD-1",
            "franchisee_id": "FRAN_001",
            "location": {"lat": 43.70, "lon": -79.40},
            "volume": 20.0
        },
        {
            "order_id": "ORD-2",
            "franchisee_id": "FRAN_002",
            "location": {"lat": 43.65, "lon": -79.38},
            "volume": 15.0
        }
    ]
}"#;

/// Seeds `WH1`/`X` with 10 units, holds 4, fails to hold 10 more, releases
/// the first hold and checks an 8 unit line.
pub(super) const INVENTORY_SCENARIO_JSON: &str = r#"{
    "events": [
        {
            "id": "e1",
            "type": "replenish",
            "ts": "2024-03-01T08:00:00Z",
            "item_id": "X",
            "qty": 10.0,
            "warehouse_id": "WH1"
        }
    ],
    "reserve": [
        {
            "plan_id": "p1",
            "lines": [
                {"warehouse_id": "WH1", "order_id": "O1", "item_id": "X", "qty": 4.0}
            ]
        },
        {
            "plan_id": "p2",
            "lines": [
                {"warehouse_id": "WH1", "order_id": "O2", "item_id": "X", "qty": 10.0}
            ]
        }
    ],
    "release": [
        {"plan_id": "p1"}
    ],
    "feasibility": [
        {"order_id": "O3", "warehouse_id": "WH1", "item_id": "X", "qty": 8.0}
    ]
}"#;
