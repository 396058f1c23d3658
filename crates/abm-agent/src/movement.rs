//! Waypoint travel along a door path.
//!
//! A [`Route`] turns a room-level [`Path`] into straight legs between
//! waypoints: the agent's starting point, then the reference point of every
//! following room.  Each tick the agent spends a distance budget
//! (`speed × tick_duration`) walking those legs:
//!
//! - If what is left of the current leg fits in the budget, the agent snaps
//!   to the waypoint and the unspent budget carries into the next leg within
//!   the same tick.
//! - Otherwise the agent stops partway and its position is interpolated
//!   along the leg.
//!
//! A leg whose ends are on different floors (stairs, lifts) has no planar
//! length; it costs the door's explicit cost, or the default transfer cost.

use abm_core::{Location, RoomId, ValidationError};
use abm_spatial::space::DEFAULT_TRANSFER_COST;
use abm_spatial::{Path, Space, SpatialResult};

/// Tolerance when deciding that a waypoint has been reached.
const SNAP_EPSILON: f64 = 1e-9;

/// One straight segment between consecutive waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    pub from:      Location,
    pub to:        Location,
    pub from_room: RoomId,
    pub to_room:   RoomId,
    pub length:    f64,
}

/// An agent's in-progress journey to a destination room.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    legs:      Vec<Leg>,
    /// Index of the leg being walked; `legs.len()` once finished.
    leg:       usize,
    /// Distance already covered on the current leg.
    travelled: f64,
    start:     Location,
    origin:    RoomId,
}

impl Route {
    /// Lay out legs for `path`, starting from `start` inside `path.rooms[0]`.
    pub fn plan(space: &Space, path: &Path, start: Location) -> SpatialResult<Route> {
        let origin = path
            .origin()
            .ok_or_else(|| ValidationError::Config("empty path".into()))?;
        let mut legs = Vec::with_capacity(path.hop_count());
        let mut from = start;
        for (i, pair) in path.rooms.windows(2).enumerate() {
            let (from_room, to_room) = (pair[0], pair[1]);
            let to = space
                .room(to_room)
                .ok_or(ValidationError::UnknownRoom(to_room))?
                .centre;
            let length = match from.distance_to(to) {
                Some(d) => d,
                None => path
                    .doors
                    .get(i)
                    .and_then(|&d| space.door(d))
                    .and_then(|d| d.spec.cost)
                    .unwrap_or(DEFAULT_TRANSFER_COST),
            };
            legs.push(Leg { from, to, from_room, to_room, length });
            from = to;
        }
        Ok(Route { legs, leg: 0, travelled: 0.0, start, origin })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// `true` once the final waypoint has been reached.
    pub fn is_finished(&self) -> bool {
        self.leg >= self.legs.len()
    }

    /// The room the route ends in.
    pub fn destination(&self) -> RoomId {
        self.legs.last().map(|l| l.to_room).unwrap_or(self.origin)
    }

    /// Total length of all legs.
    pub fn total_length(&self) -> f64 {
        self.legs.iter().map(|l| l.length).sum()
    }

    /// Distance still to walk.
    pub fn remaining(&self) -> f64 {
        match self.legs.get(self.leg) {
            None => 0.0,
            Some(current) => {
                let rest: f64 = self.legs[self.leg + 1..].iter().map(|l| l.length).sum();
                (current.length - self.travelled).max(0.0) + rest
            }
        }
    }

    /// Spend `budget` metres walking.  Returns the new position and room.
    pub fn advance(&mut self, mut budget: f64) -> (Location, RoomId) {
        while let Some(current) = self.legs.get(self.leg) {
            let left = current.length - self.travelled;
            if left <= budget + SNAP_EPSILON {
                budget = (budget - left).max(0.0);
                self.leg += 1;
                self.travelled = 0.0;
                continue;
            }
            self.travelled += budget;
            break;
        }
        self.position()
    }

    /// Current position and room.
    ///
    /// Mid-leg, the room is the one the leg started in.
    pub fn position(&self) -> (Location, RoomId) {
        match self.legs.get(self.leg) {
            Some(current) => {
                let t = if current.length > 0.0 { self.travelled / current.length } else { 0.0 };
                (current.from.lerp(current.to, t), current.from_room)
            }
            None => match self.legs.last() {
                Some(last) => (last.to, last.to_room),
                None => (self.start, self.origin),
            },
        }
    }
}
