//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `abm-agent` and `abm-sim` plan routes through the [`Router`] trait, so a
//! scenario can swap in its own strategy (A*, congestion-aware, restricted
//! access) without touching the engine.  [`DijkstraRouter`] is the default.
//!
//! # Cost units
//!
//! Costs are metres for doors without an explicit cost (centre-to-centre
//! distance) and whatever unit the layout chose otherwise.  Routing only
//! needs them to be non-negative and comparable.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use abm_core::{DoorId, RoomId, ValidationError};

use crate::space::Space;
use crate::{SpatialError, SpatialResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Rooms in traversal order, `from` first and `to` last.
    pub rooms: Vec<RoomId>,
    /// `doors[i]` joins `rooms[i]` and `rooms[i + 1]`.
    pub doors: Vec<DoorId>,
    /// Sum of the door costs along the path.
    pub cost: f64,
}

impl Path {
    /// `true` if source and destination are the same room.
    pub fn is_trivial(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn origin(&self) -> Option<RoomId> {
        self.rooms.first().copied()
    }

    pub fn destination(&self) -> Option<RoomId> {
        self.rooms.last().copied()
    }

    /// Number of doors walked through.
    pub fn hop_count(&self) -> usize {
        self.doors.len()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so one router can be shared by a
/// `Sim` that is moved to another thread.
pub trait Router: Send + Sync {
    /// Least-cost path from `from` to `to`.
    ///
    /// `from == to` yields a single-room path of cost 0.  Unknown rooms are a
    /// validation error; a disconnected target is [`SpatialError::Unreachable`].
    fn route(&self, space: &Space, from: RoomId, to: RoomId) -> SpatialResult<Path>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the door graph.
///
/// Respects one-way doors.  Among equal-cost paths, each room is reached
/// from the lowest-id predecessor, so the chosen path is stable across runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, space: &Space, from: RoomId, to: RoomId) -> SpatialResult<Path> {
        dijkstra(space, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over non-negative costs for the heap.
#[derive(Copy, Clone, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(space: &Space, from: RoomId, to: RoomId) -> SpatialResult<Path> {
    for room in [from, to] {
        if !space.contains_room(room) {
            return Err(ValidationError::UnknownRoom(room).into());
        }
    }
    if from == to {
        return Ok(Path { rooms: vec![from], doors: vec![], cost: 0.0 });
    }

    let n = space.room_count();
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = (predecessor room, door used); None for the source and unreached rooms.
    let mut prev: Vec<Option<(RoomId, DoorId)>> = vec![None; n];
    let mut settled = vec![false; n];

    dist[from.index()] = 0.0;

    // Secondary key RoomId keeps pop order deterministic on cost ties.
    let mut heap: BinaryHeap<Reverse<(Cost, RoomId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), room))) = heap.pop() {
        if settled[room.index()] || cost > dist[room.index()] {
            continue;
        }
        settled[room.index()] = true;
        if room == to {
            return Ok(reconstruct(&prev, from, to, cost));
        }

        for hop in space.hops(room) {
            let next = hop.to.index();
            if settled[next] {
                continue;
            }
            let candidate = cost + hop.cost;
            let better = candidate < dist[next]
                || (candidate == dist[next] && prev[next].is_some_and(|(p, _)| room < p));
            if better {
                if candidate < dist[next] {
                    dist[next] = candidate;
                    heap.push(Reverse((Cost(candidate), hop.to)));
                }
                prev[next] = Some((room, hop.door));
            }
        }
    }

    Err(SpatialError::Unreachable { from, to })
}

fn reconstruct(prev: &[Option<(RoomId, DoorId)>], from: RoomId, to: RoomId, cost: f64) -> Path {
    let mut rooms = vec![to];
    let mut doors = Vec::new();
    let mut cur = to;
    while cur != from {
        let Some((p, door)) = prev[cur.index()] else { break };
        rooms.push(p);
        doors.push(door);
        cur = p;
    }
    rooms.reverse();
    doors.reverse();
    Path { rooms, doors, cost }
}
