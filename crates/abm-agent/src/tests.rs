//! Unit tests for abm-agent.

#[cfg(test)]
mod helpers {
    use abm_core::{AgentId, RoomId, Tick};
    use abm_spatial::{Attachment, DijkstraRouter, DoorSpec, RoomType, Space, SpaceBuilder};

    use crate::{Agent, AgentType, StepContext};

    /// Level 0: Corridor (0,0) ── Ward (30,0) ── Store (30,20)
    ///          Isolated (0,50), no doors
    /// Level 1: Upstairs (30,0), joined to Ward by a lift of cost 5.
    pub fn space() -> (Space, [RoomId; 5]) {
        let mut b = SpaceBuilder::new();
        let main = b.add_building("Main").unwrap();
        let g = b.add_floor(main, 0).unwrap();
        let up = b.add_floor(main, 1).unwrap();
        let corridor = b.add_room(g, "Corridor", RoomType::Corridor, (0.0, 0.0)).unwrap();
        let ward = b.add_room(g, "Ward", RoomType::Ward, (30.0, 0.0)).unwrap();
        let store = b.add_room(g, "Store", RoomType::Storage, (30.0, 20.0)).unwrap();
        let isolated = b.add_room(g, "Isolated", RoomType::Other, (0.0, 50.0)).unwrap();
        let upstairs = b.add_room(up, "Upstairs", RoomType::Ward, (30.0, 0.0)).unwrap();
        b.set_room_area(ward, 100.0).unwrap();
        b.add_door(DoorSpec::standard(), Attachment::between(corridor, ward)).unwrap();
        b.add_door(DoorSpec::standard(), Attachment::between(ward, store)).unwrap();
        b.add_door(DoorSpec::standard().with_cost(5.0), Attachment::between(ward, upstairs)).unwrap();
        (b.build().unwrap(), [corridor, ward, store, isolated, upstairs])
    }

    /// An agent at the centre of `room` covering 10 m per 1-second tick.
    pub fn agent_in(space: &Space, room: RoomId) -> Agent {
        let centre = space.room(room).unwrap().centre;
        Agent::new(AgentId(0), AgentType::HealthcareWorker, room, centre, 10.0)
    }

    pub fn ctx(space: &Space, now: u64) -> StepContext<'_, DijkstraRouter> {
        StepContext { space, router: &DijkstraRouter, now: Tick(now), tick_duration_secs: 1 }
    }
}

// ── Agent state ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use abm_core::{AgentId, Location, RoomId, ValidationError};
    use crate::{Activity, Agent, AgentType};

    #[test]
    fn new_agent_is_idle() {
        let a = Agent::new(AgentId(1), AgentType::Patient, RoomId(0), Location::new(0.0, 0.0, 0), 1.0);
        assert_eq!(a.activity, Activity::Idle);
        assert!(a.current_task.is_none());
        assert!(a.validate().is_ok());
    }

    #[test]
    fn non_positive_speed_rejected() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let a = Agent::new(AgentId(3), AgentType::Generic, RoomId(0), Location::new(0.0, 0.0, 0), speed);
            assert!(matches!(a.validate(), Err(ValidationError::InvalidSpeed { agent, .. }) if agent == AgentId(3)));
        }
    }

    #[test]
    fn heading_wraps_into_range() {
        let a = Agent::new(AgentId(0), AgentType::Generic, RoomId(0), Location::new(0.0, 0.0, 0), 1.0)
            .with_heading(-90.0);
        assert_eq!(a.heading, 270.0);
    }
}

// ── Route / movement budget ───────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use abm_core::Location;
    use crate::Route;

    #[test]
    fn budget_carries_over_waypoints() {
        let (space, [corridor, ward, store, ..]) = super::helpers::space();
        let path = space.shortest_path(corridor, store).unwrap();
        let mut route = Route::plan(&space, &path, Location::new(0.0, 0.0, 0)).unwrap();
        assert_eq!(route.legs().len(), 2);
        assert_eq!(route.total_length(), 50.0);

        // 35 m: all of leg one (30) plus 5 into leg two.
        let (loc, room) = route.advance(35.0);
        assert_eq!(room, ward);
        assert!((loc.x - 30.0).abs() < 1e-9 && (loc.y - 5.0).abs() < 1e-9);
        assert!((route.remaining() - 15.0).abs() < 1e-9);
        assert!(!route.is_finished());

        let (loc, room) = route.advance(100.0);
        assert!(route.is_finished());
        assert_eq!(room, store);
        assert_eq!(loc, Location::new(30.0, 20.0, 0));
    }

    #[test]
    fn exact_budget_snaps_to_waypoint() {
        let (space, [corridor, ward, ..]) = super::helpers::space();
        let path = space.shortest_path(corridor, ward).unwrap();
        let mut route = Route::plan(&space, &path, Location::new(0.0, 0.0, 0)).unwrap();
        route.advance(10.0);
        route.advance(10.0);
        assert!(!route.is_finished());
        let (loc, _) = route.advance(10.0);
        assert!(route.is_finished());
        assert_eq!(loc, Location::new(30.0, 0.0, 0));
    }

    #[test]
    fn cross_floor_leg_costs_door() {
        let (space, [corridor, _, _, _, upstairs]) = super::helpers::space();
        let path = space.shortest_path(corridor, upstairs).unwrap();
        let route = Route::plan(&space, &path, Location::new(0.0, 0.0, 0)).unwrap();
        assert_eq!(route.legs()[1].length, 5.0);
        assert_eq!(route.total_length(), 35.0);
    }

    #[test]
    fn position_mid_leg_is_interpolated() {
        let (space, [corridor, ward, ..]) = super::helpers::space();
        let path = space.shortest_path(corridor, ward).unwrap();
        let mut route = Route::plan(&space, &path, Location::new(0.0, 0.0, 0)).unwrap();
        let (loc, room) = route.advance(12.0);
        assert_eq!(room, corridor);
        assert!((loc.x - 12.0).abs() < 1e-9);
    }
}

// ── Per-tick update ───────────────────────────────────────────────────────────

#[cfg(test)]
mod update {
    use abm_core::{AgentId, Tick};
    use abm_task::{Priority, TaskRegistry, TaskSpec, TaskStatus, TaskType};

    use crate::{update, Activity, StepOutcome};
    use super::helpers::{agent_in, ctx, space};

    #[test]
    fn idle_without_tasks() {
        let (space, [corridor, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        assert_eq!(update(&mut agent, &ctx(&space, 0), &mut reg).unwrap(), StepOutcome::Idle);
        assert!(agent.is_idle());
    }

    #[test]
    fn walk_arrive_perform_complete() {
        let (space, [corridor, ward, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg
            .create_for(
                AgentId(0),
                TaskSpec::new(TaskType::AttendPatient, ward).with_priority(Priority(1)).with_dwell(1),
            )
            .unwrap();

        let mut activities = Vec::new();
        let mut statuses = Vec::new();
        for now in 0..6 {
            update(&mut agent, &ctx(&space, now), &mut reg).unwrap();
            activities.push(agent.activity);
            statuses.push(reg.get(task).unwrap().status());
        }
        use Activity::*;
        use TaskStatus::*;
        assert_eq!(activities, vec![Moving, Moving, Moving, Performing, Idle, Idle]);
        assert_eq!(statuses, vec![Pending, Pending, Pending, InProgress, Completed, Completed]);
        assert_eq!(agent.room, ward);
        assert_eq!(agent.location, space.room(ward).unwrap().centre);
        assert_eq!(agent.heading, 0.0);
    }

    #[test]
    fn already_in_target_room_starts_immediately() {
        let (space, [corridor, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::Clean, corridor).with_dwell(2))
            .unwrap();
        assert_eq!(update(&mut agent, &ctx(&space, 0), &mut reg).unwrap(), StepOutcome::Started { task });
        assert_eq!(update(&mut agent, &ctx(&space, 1), &mut reg).unwrap(), StepOutcome::Performing { task });
        assert_eq!(update(&mut agent, &ctx(&space, 2), &mut reg).unwrap(), StepOutcome::Completed { task });
        assert!(agent.is_idle());
    }

    #[test]
    fn deadline_passing_during_dwell_fails_instead_of_completing() {
        let (space, [corridor, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::Clean, corridor).with_dwell(2).due_by(Tick(1)))
            .unwrap();
        assert_eq!(update(&mut agent, &ctx(&space, 0), &mut reg).unwrap(), StepOutcome::Started { task });
        assert_eq!(update(&mut agent, &ctx(&space, 1), &mut reg).unwrap(), StepOutcome::Performing { task });
        assert_eq!(update(&mut agent, &ctx(&space, 2), &mut reg).unwrap(), StepOutcome::Failed { task });

        let t = reg.get(task).unwrap();
        assert_eq!(t.status(), TaskStatus::Failed);
        assert_eq!(t.finished_at(), Some(Tick(2)));
        assert!(agent.is_idle());
    }

    #[test]
    fn deadline_passing_before_arrival_never_starts_task() {
        let (space, [corridor, ward, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::AttendPatient, ward).due_by(Tick(2)))
            .unwrap();
        for now in 0..3 {
            assert_eq!(update(&mut agent, &ctx(&space, now), &mut reg).unwrap(), StepOutcome::Moving { task });
        }
        assert_eq!(update(&mut agent, &ctx(&space, 3), &mut reg).unwrap(), StepOutcome::Failed { task });
        assert!(reg.transitions_of(task).all(|t| t.to != TaskStatus::InProgress));
        assert!(agent.is_idle());
        assert!(agent.route.is_none());
    }

    #[test]
    fn unreachable_target_fails_task_and_stays_idle() {
        let (space, [corridor, _, _, isolated, _]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg.create_for(AgentId(0), TaskSpec::new(TaskType::Clean, isolated)).unwrap();
        let outcome = update(&mut agent, &ctx(&space, 0), &mut reg).unwrap();
        assert_eq!(outcome, StepOutcome::Failed { task });
        assert_eq!(reg.get(task).unwrap().status(), TaskStatus::Failed);
        assert!(agent.is_idle());
        assert_eq!(agent.room, corridor);
    }

    #[test]
    fn task_cancelled_mid_walk_is_dropped() {
        let (space, [corridor, ward, store, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let first = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::Clean, ward).with_priority(Priority(0)))
            .unwrap();
        let second = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::Clean, store).with_priority(Priority(5)))
            .unwrap();
        update(&mut agent, &ctx(&space, 0), &mut reg).unwrap();
        assert_eq!(agent.current_task, Some(first));

        reg.cancel(first, Tick(0)).unwrap();
        let outcome = update(&mut agent, &ctx(&space, 1), &mut reg).unwrap();
        assert_eq!(outcome, StepOutcome::Moving { task: second });
        assert_eq!(agent.current_task, Some(second));
    }

    #[test]
    fn future_task_waits() {
        let (space, [corridor, ward, ..]) = space();
        let mut agent = agent_in(&space, corridor);
        let mut reg = TaskRegistry::new();
        let task = reg
            .create_for(AgentId(0), TaskSpec::new(TaskType::Clean, ward).starting_at(Tick(2)))
            .unwrap();
        assert_eq!(update(&mut agent, &ctx(&space, 0), &mut reg).unwrap(), StepOutcome::Idle);
        assert_eq!(update(&mut agent, &ctx(&space, 1), &mut reg).unwrap(), StepOutcome::Idle);
        assert_eq!(update(&mut agent, &ctx(&space, 2), &mut reg).unwrap(), StepOutcome::Moving { task });
    }

    #[test]
    fn heading_follows_direction_of_travel() {
        let (space, [_, ward, store, ..]) = space();
        let mut agent = agent_in(&space, ward);
        let mut reg = TaskRegistry::new();
        reg.create_for(AgentId(0), TaskSpec::new(TaskType::Clean, store)).unwrap();
        update(&mut agent, &ctx(&space, 0), &mut reg).unwrap();
        assert!((agent.heading - 90.0).abs() < 1e-9);
    }
}

// ── Movement-seed loader ──────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use abm_core::{AgentId, SimClock, Tick};
    use abm_task::TaskType;

    use crate::{load_movement_reader, AgentError, AgentType, SeedDefaults};
    use super::helpers::space;

    const CSV: &str = "\
agent_id,timestamp,location
4,1000,Main:0:Ward
4,1600,Main:0:Store
1,1000,Main:0:Corridor
4,1300,Main:0:Corridor
";

    #[test]
    fn seeds_agents_and_tasks_in_order() {
        let (space, [corridor, ward, store, ..]) = space();
        let clock = SimClock::new(1000, 60);
        let seeded = load_movement_reader(Cursor::new(CSV), &space, &clock, &SeedDefaults::default()).unwrap();

        assert_eq!(seeded.len(), 2);
        assert_eq!(seeded[0].agent.id, AgentId(1));
        assert_eq!(seeded[0].agent.room, corridor);
        assert!(seeded[0].tasks.is_empty());

        let four = &seeded[1];
        assert_eq!(four.agent.id, AgentId(4));
        assert_eq!(four.agent.room, ward);
        assert_eq!(four.agent.kind, AgentType::HealthcareWorker);
        let targets: Vec<_> = four.tasks.iter().map(|t| (t.target, t.start_tick)).collect();
        assert_eq!(targets, vec![(corridor, Tick(5)), (store, Tick(10))]);
        assert!(four.tasks.iter().all(|t| t.kind == TaskType::GotoLocation));
    }

    #[test]
    fn placement_is_inside_room_and_reproducible() {
        let (space, [_, ward, ..]) = space();
        let clock = SimClock::new(1000, 60);
        let defaults = SeedDefaults { seed: 99, ..SeedDefaults::default() };
        let a = load_movement_reader(Cursor::new(CSV), &space, &clock, &defaults).unwrap();
        let b = load_movement_reader(Cursor::new(CSV), &space, &clock, &defaults).unwrap();
        let loc = a[1].agent.location;
        assert_eq!(loc, b[1].agent.location);
        // Ward area 100 m² → within ±5 m of (30, 0).
        assert!((loc.x - 30.0).abs() <= 5.0 && loc.y.abs() <= 5.0);
        assert_eq!(space.room(ward).unwrap().centre.floor, loc.floor);
    }

    #[test]
    fn optional_agent_type_column() {
        let (space, _) = space();
        let csv = "agent_id,timestamp,location,agent_type\n2,0,Main:0:Ward,patient\n";
        let seeded = load_movement_reader(Cursor::new(csv), &space, &SimClock::new(0, 60), &SeedDefaults::default()).unwrap();
        assert_eq!(seeded[0].agent.kind, AgentType::Patient);
    }

    #[test]
    fn unknown_room_is_validation_error() {
        let (space, _) = space();
        let csv = "agent_id,timestamp,location\n0,0,Main:0:Nowhere\n";
        let err = load_movement_reader(Cursor::new(csv), &space, &SimClock::new(0, 60), &SeedDefaults::default())
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let (space, _) = space();
        let csv = "agent_id,timestamp,location\nx,0,Main:0:Ward\n";
        let err = load_movement_reader(Cursor::new(csv), &space, &SimClock::new(0, 60), &SeedDefaults::default())
            .unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn timestamp_before_start_rejected() {
        let (space, _) = space();
        // The placement row may predate the start; a task row may not.
        let csv = "agent_id,timestamp,location\n0,500,Main:0:Ward\n0,100,Main:0:Store\n";
        let err = load_movement_reader(Cursor::new(csv), &space, &SimClock::new(1000, 60), &SeedDefaults::default())
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }
}
