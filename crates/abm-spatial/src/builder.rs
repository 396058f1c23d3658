//! Incremental, validated construction of a [`Space`].

use std::collections::{BTreeMap, BTreeSet};

use rstar::RTree;
use rustc_hash::FxHashMap;
use tracing::info;

use abm_core::{BuildingId, ComponentId, DoorId, FloorId, Location, RoomId, ValidationError};

use crate::space::{
    Attachment, Building, Component, ComponentKind, Door, DoorSpec, Floor, Hop, Room, RoomEntry,
    RoomType, Space, DEFAULT_TRANSFER_COST,
};
use crate::SpatialResult;

/// Construct a [`Space`] incrementally, then call [`build`](Self::build).
///
/// Every `add_*` call validates its parent references immediately and
/// returns a `ValidationError` (wrapped in `SpatialError`) if they do not
/// exist.  `build()` performs the whole-space checks (no detached doors),
/// derives the door graph, and bulk-loads the spatial index.
///
/// # Example
///
/// ```
/// use abm_spatial::{Attachment, DoorSpec, RoomType, SpaceBuilder};
///
/// let mut b = SpaceBuilder::new();
/// let hospital = b.add_building("Main").unwrap();
/// let ground = b.add_floor(hospital, 0).unwrap();
/// let corridor = b.add_room(ground, "Corridor", RoomType::Corridor, (0.0, 0.0)).unwrap();
/// let ward = b.add_room(ground, "Ward", RoomType::Ward, (30.0, 0.0)).unwrap();
/// b.add_door(DoorSpec::standard(), Attachment::between(corridor, ward)).unwrap();
/// let space = b.build().unwrap();
/// assert!(space.connected(corridor, ward));
/// assert_eq!(space.shortest_path(corridor, ward).unwrap().cost, 30.0);
/// ```
#[derive(Default)]
pub struct SpaceBuilder {
    buildings:  Vec<Building>,
    floors:     Vec<Floor>,
    rooms:      Vec<Room>,
    doors:      Vec<Door>,
    components: Vec<Component>,
}

impl SpaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a building and return its id (sequential from 0).  Names are
    /// unique.
    pub fn add_building(&mut self, name: impl Into<String>) -> SpatialResult<BuildingId> {
        let name = name.into();
        if self.buildings.iter().any(|b| b.name == name) {
            return Err(ValidationError::DuplicateBuilding(name).into());
        }
        let id = BuildingId(self.buildings.len() as u32);
        self.buildings.push(Building { id, name, floors: BTreeMap::new() });
        Ok(id)
    }

    /// Add floor `level` to `building`.  Levels are unique per building.
    pub fn add_floor(&mut self, building: BuildingId, level: i32) -> SpatialResult<FloorId> {
        let id = FloorId(self.floors.len() as u32);
        let owner = self
            .buildings
            .get_mut(building.index())
            .ok_or(ValidationError::UnknownBuilding(building))?;
        if owner.floors.contains_key(&level) {
            return Err(ValidationError::DuplicateFloor { building, level }.into());
        }
        owner.floors.insert(level, id);
        self.floors.push(Floor { id, building, level, rooms: BTreeSet::new() });
        Ok(id)
    }

    /// Add a room to `floor` with its reference point at `centre` (floor
    /// coordinates, metres).  Names are unique per floor.
    pub fn add_room(
        &mut self,
        floor:  FloorId,
        name:   impl Into<String>,
        kind:   RoomType,
        centre: (f64, f64),
    ) -> SpatialResult<RoomId> {
        let name = name.into();
        let id = RoomId(self.rooms.len() as u32);
        let parent = self
            .floors
            .get(floor.index())
            .ok_or(ValidationError::UnknownFloor(floor))?;
        if parent.rooms.iter().any(|r| self.rooms[r.index()].name == name) {
            return Err(ValidationError::DuplicateRoom { floor, name }.into());
        }
        if !(centre.0.is_finite() && centre.1.is_finite()) {
            return Err(ValidationError::Config(format!("room {name:?} has a non-finite centre")).into());
        }
        let room = Room {
            id,
            name,
            kind,
            building: parent.building,
            floor,
            centre: Location::new(centre.0, centre.1, parent.level),
            area: None,
            components: Vec::new(),
            doors: Vec::new(),
        };
        self.floors[floor.index()].rooms.insert(id);
        self.rooms.push(room);
        Ok(id)
    }

    /// Record the floor area of `room` in square metres.
    pub fn set_room_area(&mut self, room: RoomId, area: f64) -> SpatialResult<()> {
        let target = self
            .rooms
            .get_mut(room.index())
            .ok_or(ValidationError::UnknownRoom(room))?;
        if !(area.is_finite() && area > 0.0) {
            return Err(ValidationError::Config(format!("room {room} area must be positive, got {area}")).into());
        }
        target.area = Some(area);
        Ok(())
    }

    /// Place a component (bed, workstation) inside `room`.
    pub fn add_component(&mut self, room: RoomId, kind: ComponentKind) -> SpatialResult<ComponentId> {
        let id = ComponentId(self.components.len() as u32);
        self.rooms
            .get_mut(room.index())
            .ok_or(ValidationError::UnknownRoom(room))?
            .components
            .push(id);
        self.components.push(Component { id, room, kind });
        Ok(id)
    }

    /// Add a door that is not yet placed between rooms.
    ///
    /// It must be attached with [`attach_door`](Self::attach_door) before
    /// [`build`](Self::build) is called.
    pub fn add_detached_door(&mut self, spec: DoorSpec) -> SpatialResult<DoorId> {
        check_cost(&spec)?;
        let id = DoorId(self.doors.len() as u32);
        self.doors.push(Door { id, spec, attachment: None });
        Ok(id)
    }

    /// Place a detached door between two rooms of the same building.
    pub fn attach_door(&mut self, door: DoorId, attachment: Attachment) -> SpatialResult<()> {
        let current = self
            .doors
            .get(door.index())
            .ok_or(ValidationError::UnknownDoor(door))?;
        if current.is_attached() {
            return Err(ValidationError::AlreadyAttached(door).into());
        }
        let Attachment { a, b, .. } = attachment;
        let room_a = self.rooms.get(a.index()).ok_or(ValidationError::UnknownRoom(a))?;
        let room_b = self.rooms.get(b.index()).ok_or(ValidationError::UnknownRoom(b))?;
        if a == b {
            return Err(ValidationError::SelfLoop { door, room: a }.into());
        }
        if room_a.building != room_b.building {
            return Err(ValidationError::CrossBuildingDoor { door, a, b }.into());
        }

        self.doors[door.index()].attachment = Some(attachment);
        self.rooms[a.index()].doors.push(door);
        self.rooms[b.index()].doors.push(door);
        Ok(())
    }

    /// Add and attach a door in one step.
    pub fn add_door(&mut self, spec: DoorSpec, attachment: Attachment) -> SpatialResult<DoorId> {
        let door = self.add_detached_door(spec)?;
        if let Err(e) = self.attach_door(door, attachment) {
            // Roll back so a rejected door leaves no template behind.
            self.doors.pop();
            return Err(e);
        }
        Ok(door)
    }

    pub fn room_count(&self) -> usize { self.rooms.len() }
    pub fn door_count(&self) -> usize { self.doors.len() }

    /// Consume the builder and produce a read-only [`Space`].
    pub fn build(mut self) -> SpatialResult<Space> {
        if let Some(door) = self.doors.iter().find(|d| !d.is_attached()) {
            return Err(ValidationError::DetachedDoor(door.id).into());
        }

        // ── Door graph ────────────────────────────────────────────────────
        let mut adjacency: Vec<Vec<Hop>> = vec![Vec::new(); self.rooms.len()];
        for door in &self.doors {
            let Some(att) = door.attachment else { continue };
            let cost = door_cost(&self.rooms, door.spec, att.a, att.b);
            adjacency[att.a.index()].push(Hop { to: att.b, door: door.id, cost });
            if !att.one_way {
                adjacency[att.b.index()].push(Hop { to: att.a, door: door.id, cost });
            }
        }
        for hops in &mut adjacency {
            hops.sort_unstable_by_key(|h| (h.to, h.door));
        }
        for room in &mut self.rooms {
            room.doors.sort_unstable();
        }

        // ── Name index ────────────────────────────────────────────────────
        let mut names = FxHashMap::default();
        for room in &self.rooms {
            let building = self.buildings[room.building.index()].name.clone();
            names.insert((building, room.centre.floor, room.name.clone()), room.id);
        }

        // ── Spatial index (bulk load per floor level) ─────────────────────
        let mut by_level: BTreeMap<i32, Vec<RoomEntry>> = BTreeMap::new();
        for room in &self.rooms {
            by_level.entry(room.centre.floor).or_default().push(RoomEntry {
                point: [room.centre.x, room.centre.y],
                id: room.id,
            });
        }
        let index = by_level
            .into_iter()
            .map(|(level, entries)| (level, RTree::bulk_load(entries)))
            .collect();

        info!(
            buildings = self.buildings.len(),
            floors = self.floors.len(),
            rooms = self.rooms.len(),
            doors = self.doors.len(),
            components = self.components.len(),
            "space built"
        );

        Ok(Space {
            buildings: self.buildings,
            floors: self.floors,
            rooms: self.rooms,
            doors: self.doors,
            components: self.components,
            adjacency,
            names,
            index,
        })
    }
}

fn check_cost(spec: &DoorSpec) -> SpatialResult<()> {
    match spec.cost {
        Some(c) if !(c.is_finite() && c >= 0.0) => {
            Err(ValidationError::Config(format!("door cost must be finite and non-negative, got {c}")).into())
        }
        _ => Ok(()),
    }
}

/// Explicit door cost, else centre-to-centre distance on a shared floor,
/// else [`DEFAULT_TRANSFER_COST`].
fn door_cost(rooms: &[Room], spec: DoorSpec, a: RoomId, b: RoomId) -> f64 {
    if let Some(cost) = spec.cost {
        return cost;
    }
    let (ca, cb) = (rooms[a.index()].centre, rooms[b.index()].centre);
    ca.distance_to(cb).unwrap_or(DEFAULT_TRANSFER_COST)
}
