//! Built-in ward layout: one building, two floors.
//!
//! ```text
//! Level 0:  Entrance ── Corridor ── Ward A (4 beds)
//!                          │    └── Ward B (4 beds)
//!                          ├── Nurses' Station (workstation)
//!                          └── Sluice
//!                          ║ (stairs, cost 15)
//! Level 1:               Landing ── Staff Room
//! ```

use std::io::Cursor;

use abm_spatial::{load_layout_reader, Space, SpatialResult};

const LAYOUT_JSON: &str = r#"{
  "buildings": [
    { "name": "General", "floors": [
      { "level": 0, "rooms": [
        { "name": "Entrance", "kind": "other", "centre": [0.0, 0.0], "area": 40.0 },
        { "name": "Corridor", "kind": "corridor", "centre": [15.0, 0.0], "area": 60.0 },
        { "name": "Ward A", "kind": "ward", "centre": [30.0, 8.0], "area": 80.0,
          "components": ["bed", "bed", "bed", "bed"] },
        { "name": "Ward B", "kind": "ward", "centre": [30.0, -8.0], "area": 80.0,
          "components": ["bed", "bed", "bed", "bed"] },
        { "name": "Nurses' Station", "kind": "office", "centre": [15.0, 10.0], "area": 20.0,
          "components": ["workstation"] },
        { "name": "Sluice", "kind": "storage", "centre": [15.0, -10.0], "area": 12.0 }
      ]},
      { "level": 1, "rooms": [
        { "name": "Landing", "kind": "corridor", "centre": [15.0, 0.0], "area": 20.0 },
        { "name": "Staff Room", "kind": "staff_room", "centre": [25.0, 0.0], "area": 30.0 }
      ]}
    ]}
  ],
  "doors": [
    { "between": ["General:0:Entrance", "General:0:Corridor"] },
    { "between": ["General:0:Corridor", "General:0:Ward A"] },
    { "between": ["General:0:Corridor", "General:0:Ward B"] },
    { "between": ["General:0:Corridor", "General:0:Nurses' Station"] },
    { "between": ["General:0:Corridor", "General:0:Sluice"] },
    { "between": ["General:0:Corridor", "General:1:Landing"], "kind": "stairs", "cost": 15.0 },
    { "between": ["General:1:Landing", "General:1:Staff Room"] }
  ]
}"#;

pub fn build_space() -> SpatialResult<Space> {
    load_layout_reader(Cursor::new(LAYOUT_JSON))
}
