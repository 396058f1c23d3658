//! Space representation: the Building → Floor → Room hierarchy and its doors.
//!
//! # Data layout
//!
//! Every entity lives in an arena `Vec` indexed by its typed id (ids are
//! allocated sequentially by [`SpaceBuilder`](crate::SpaceBuilder)).  Owners
//! hold ids, not values: a `Floor` maps to its room ids, a `Room` lists its
//! incident door and component ids.
//!
//! The door graph is stored as a per-room adjacency list of [`Hop`]s, sorted
//! by `(to, door)` so that every traversal visits neighbours in the same
//! order on every run.
//!
//! # Door model
//!
//! A door is a [`DoorSpec`] (what kind of door it is) plus an optional
//! [`Attachment`] (which rooms it joins).  A door without an attachment is a
//! detached template; the builder refuses to produce a `Space` while any
//! door is still detached.
//!
//! # Spatial index
//!
//! One R-tree per floor level (via `rstar`) maps `(x, y)` to the room whose
//! reference point is nearest.  Used to place free-standing `Location`s into
//! rooms for distance queries.

use std::collections::{BTreeMap, BTreeSet};

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use abm_core::{BuildingId, ComponentId, DoorId, FloorId, Location, RoomId};

use crate::router::{DijkstraRouter, Path, Router};
use crate::{SpatialError, SpatialResult};

/// Traversal cost of a door whose rooms are not on a common floor and which
/// carries no explicit cost.
pub const DEFAULT_TRANSFER_COST: f64 = 1.0;

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Functional type of a room.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Ward,
    Corridor,
    StaffRoom,
    Office,
    Bathroom,
    Storage,
    Stairwell,
    #[default]
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorKind {
    #[default]
    Standard,
    FireExit,
    Stairs,
    Lift,
}

/// Fixed furniture inside a room.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Bed,
    Workstation,
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    /// Floors keyed by level number.
    pub floors: BTreeMap<i32, FloorId>,
}

#[derive(Clone, Debug)]
pub struct Floor {
    pub id: FloorId,
    pub building: BuildingId,
    pub level: i32,
    /// Rooms on this floor (room ids are unique keys).
    pub rooms: BTreeSet<RoomId>,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub kind: RoomType,
    pub building: BuildingId,
    pub floor: FloorId,
    /// Reference point used for path costs and as the movement waypoint.
    pub centre: Location,
    /// Floor area in square metres, if known.
    pub area: Option<f64>,
    pub components: Vec<ComponentId>,
    /// Incident doors, ascending.
    pub doors: Vec<DoorId>,
}

impl Room {
    /// Half the side of the square of area `area` centred on `centre`, or 0.
    pub fn half_extent(&self) -> f64 {
        self.area.map(|a| a.sqrt() * 0.5).unwrap_or(0.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Component {
    pub id: ComponentId,
    pub room: RoomId,
    pub kind: ComponentKind,
}

/// The intrinsic part of a door, independent of where it is placed.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct DoorSpec {
    pub kind: DoorKind,
    /// Explicit traversal cost; overrides the centre-to-centre distance.
    pub cost: Option<f64>,
}

impl DoorSpec {
    pub fn new(kind: DoorKind) -> Self {
        Self { kind, cost: None }
    }

    pub fn standard() -> Self {
        Self::new(DoorKind::Standard)
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// The pair of rooms a door joins.  `one_way` doors are traversable from
/// `a` to `b` only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub a: RoomId,
    pub b: RoomId,
    pub one_way: bool,
}

impl Attachment {
    pub fn between(a: RoomId, b: RoomId) -> Self {
        Self { a, b, one_way: false }
    }

    pub fn one_way(from: RoomId, to: RoomId) -> Self {
        Self { a: from, b: to, one_way: true }
    }

    /// `true` if the door joins `x` and `y` (in either order).
    pub fn joins(&self, x: RoomId, y: RoomId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Door {
    pub id: DoorId,
    pub spec: DoorSpec,
    /// `None` while the door is a detached template.
    pub attachment: Option<Attachment>,
}

impl Door {
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }
}

/// One traversable edge of the door graph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hop {
    pub to: RoomId,
    pub door: DoorId,
    pub cost: f64,
}

// ── R-tree room entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub(crate) struct RoomEntry {
    pub(crate) point: [f64; 2],
    pub(crate) id: RoomId,
}

impl RTreeObject for RoomEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for RoomEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Space ─────────────────────────────────────────────────────────────────────

/// The full, validated building hierarchy for one simulation.
///
/// Do not construct directly; use [`SpaceBuilder`](crate::SpaceBuilder).
pub struct Space {
    pub(crate) buildings:  Vec<Building>,
    pub(crate) floors:     Vec<Floor>,
    pub(crate) rooms:      Vec<Room>,
    pub(crate) doors:      Vec<Door>,
    pub(crate) components: Vec<Component>,
    /// Outgoing hops per room, indexed by `RoomId`, sorted by `(to, door)`.
    pub(crate) adjacency:  Vec<Vec<Hop>>,
    /// `(building name, level, room name)` → room.
    pub(crate) names:      FxHashMap<(String, i32, String), RoomId>,
    /// Room reference points per floor level.
    pub(crate) index:      BTreeMap<i32, RTree<RoomEntry>>,
}

impl Space {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn building_count(&self) -> usize { self.buildings.len() }
    pub fn floor_count(&self) -> usize { self.floors.len() }
    pub fn room_count(&self) -> usize { self.rooms.len() }
    pub fn door_count(&self) -> usize { self.doors.len() }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.index())
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.get(id.index())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(id.index())
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    pub fn contains_room(&self, id: RoomId) -> bool {
        id.index() < self.rooms.len()
    }

    /// All rooms in ascending id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> + '_ {
        self.rooms.iter()
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> + '_ {
        self.buildings.iter()
    }

    /// Room named `room` on floor `level` of building `building`.
    pub fn room_by_name(&self, building: &str, level: i32, room: &str) -> Option<RoomId> {
        self.names
            .get(&(building.to_owned(), level, room.to_owned()))
            .copied()
    }

    /// Resolve a `"Building:level:Room"` reference.
    pub fn resolve(&self, reference: &str) -> Option<RoomId> {
        let mut parts = reference.splitn(3, ':');
        let building = parts.next()?.trim();
        let level = parts.next()?.trim().parse::<i32>().ok()?;
        let room = parts.next()?.trim();
        self.room_by_name(building, level, room)
    }

    // ── Graph queries ─────────────────────────────────────────────────────

    /// Outgoing hops from `room` (empty for unknown rooms).
    pub fn hops(&self, room: RoomId) -> &[Hop] {
        self.adjacency
            .get(room.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `true` iff a door directly joins `a` and `b`, in either direction.
    pub fn connected(&self, a: RoomId, b: RoomId) -> bool {
        self.room(a).is_some_and(|room| {
            room.doors.iter().any(|&d| {
                self.doors[d.index()]
                    .attachment
                    .is_some_and(|att| att.joins(a, b))
            })
        })
    }

    /// `true` iff a door can be walked through from `from` into `to`.
    pub fn traversable(&self, from: RoomId, to: RoomId) -> bool {
        self.hops(from).iter().any(|h| h.to == to)
    }

    /// Cheapest hop from `from` directly into `to`.
    pub fn hop(&self, from: RoomId, to: RoomId) -> Option<&Hop> {
        self.hops(from)
            .iter()
            .filter(|h| h.to == to)
            .min_by(|x, y| x.cost.total_cmp(&y.cost))
    }

    /// Least-cost room sequence from `from` to `to` (default Dijkstra).
    pub fn shortest_path(&self, from: RoomId, to: RoomId) -> SpatialResult<Path> {
        DijkstraRouter.route(self, from, to)
    }

    // ── Distance ──────────────────────────────────────────────────────────

    /// Room whose reference point is nearest to `loc` on the same floor
    /// level.  Equidistant candidates resolve to the lowest room id.
    pub fn locate(&self, loc: Location) -> Option<RoomId> {
        let tree = self.index.get(&loc.floor)?;
        let query = [loc.x, loc.y];
        let mut candidates = tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best) = candidates.next()?;
        let mut winner = first.id;
        for (entry, d2) in candidates {
            if d2 > best {
                break;
            }
            winner = winner.min(entry.id);
        }
        Some(winner)
    }

    /// Distance between two free-standing locations.
    ///
    /// Straight-line when both fall in the same room; otherwise the walk to
    /// the first room's reference point, the least path cost between the
    /// rooms, and the walk from the last room's reference point.
    pub fn distance(&self, a: Location, b: Location) -> SpatialResult<f64> {
        let ra = self.locate(a).ok_or(SpatialError::OutsideSpace(a))?;
        let rb = self.locate(b).ok_or(SpatialError::OutsideSpace(b))?;
        self.distance_between(ra, a, rb, b)
    }

    /// Like [`distance`](Self::distance) with the rooms supplied explicitly.
    pub fn distance_between(
        &self,
        ra: RoomId,
        a:  Location,
        rb: RoomId,
        b:  Location,
    ) -> SpatialResult<f64> {
        let room_a = self
            .room(ra)
            .ok_or(abm_core::ValidationError::UnknownRoom(ra))?;
        let room_b = self
            .room(rb)
            .ok_or(abm_core::ValidationError::UnknownRoom(rb))?;
        if ra == rb {
            return Ok(a.planar_distance(b));
        }
        let path = self.shortest_path(ra, rb)?;
        Ok(leg(a, room_a.centre) + path.cost + leg(room_b.centre, b))
    }
}

/// Walking distance between two points that should share a floor; points on
/// different floors contribute nothing (the door cost already covers them).
fn leg(a: Location, b: Location) -> f64 {
    a.distance_to(b).unwrap_or(0.0)
}
