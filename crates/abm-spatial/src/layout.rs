//! Declarative building layouts.
//!
//! A [`LayoutSpec`] is the serde mirror of a hierarchical layout file:
//!
//! ```json
//! {
//!   "buildings": [
//!     { "name": "Main", "floors": [
//!       { "level": 0, "rooms": [
//!         { "name": "Corridor", "kind": "corridor", "centre": [0.0, 0.0] },
//!         { "name": "Ward A", "kind": "ward", "centre": [10.0, 0.0],
//!           "area": 36.0, "components": ["bed", "bed"] }
//!       ]}
//!     ]}
//!   ],
//!   "doors": [
//!     { "between": ["Main:0:Corridor", "Main:0:Ward A"] }
//!   ]
//! }
//! ```
//!
//! Door endpoints are `"Building:level:Room"` references, resolved against
//! the rooms declared above them.

use std::io::Read;
use std::path::Path as FsPath;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use abm_core::{RoomId, ValidationError};

use crate::builder::SpaceBuilder;
use crate::space::{Attachment, ComponentKind, DoorKind, DoorSpec, RoomType, Space};
use crate::{SpatialError, SpatialResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
    pub buildings: Vec<BuildingSpec>,
    #[serde(default)]
    pub doors: Vec<DoorLayout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingSpec {
    pub name: String,
    #[serde(default)]
    pub floors: Vec<FloorSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorSpec {
    pub level: i32,
    #[serde(default)]
    pub rooms: Vec<RoomLayout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomLayout {
    pub name: String,
    #[serde(default)]
    pub kind: RoomType,
    pub centre: [f64; 2],
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub components: Vec<ComponentKind>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoorLayout {
    /// Two `"Building:level:Room"` references.  For one-way doors the
    /// first is the side the door opens from.
    pub between: [String; 2],
    #[serde(default)]
    pub kind: DoorKind,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub one_way: bool,
}

impl LayoutSpec {
    /// Build a validated [`Space`] from this layout.
    pub fn build(&self) -> SpatialResult<Space> {
        let mut b = SpaceBuilder::new();
        let mut by_ref: FxHashMap<String, RoomId> = FxHashMap::default();

        for building in &self.buildings {
            let bid = b.add_building(building.name.clone())?;
            for floor in &building.floors {
                let fid = b.add_floor(bid, floor.level)?;
                for room in &floor.rooms {
                    let rid = b.add_room(fid, room.name.clone(), room.kind, (room.centre[0], room.centre[1]))?;
                    if let Some(area) = room.area {
                        b.set_room_area(rid, area)?;
                    }
                    for &kind in &room.components {
                        b.add_component(rid, kind)?;
                    }
                    by_ref.insert(format!("{}:{}:{}", building.name, floor.level, room.name), rid);
                }
            }
        }

        for door in &self.doors {
            let a = lookup(&by_ref, &door.between[0])?;
            let c = lookup(&by_ref, &door.between[1])?;
            let mut spec = DoorSpec::new(door.kind);
            spec.cost = door.cost;
            let attachment = if door.one_way { Attachment::one_way(a, c) } else { Attachment::between(a, c) };
            b.add_door(spec, attachment)?;
        }

        b.build()
    }
}

/// Normalise whitespace around the separators before lookup.
fn lookup(by_ref: &FxHashMap<String, RoomId>, reference: &str) -> SpatialResult<RoomId> {
    let key = reference
        .splitn(3, ':')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(":");
    by_ref
        .get(&key)
        .copied()
        .ok_or_else(|| ValidationError::UnknownRoomName(reference.to_owned()).into())
}

/// Parse a JSON layout from any reader and build it.
pub fn load_layout_reader<R: Read>(reader: R) -> SpatialResult<Space> {
    let spec: LayoutSpec =
        serde_json::from_reader(reader).map_err(|e| SpatialError::Layout(e.to_string()))?;
    spec.build()
}

/// Load and build a JSON layout file.
pub fn load_layout_json(path: impl AsRef<FsPath>) -> SpatialResult<Space> {
    let file = std::fs::File::open(path.as_ref())?;
    load_layout_reader(std::io::BufReader::new(file))
}
