//! Integration tests for abm-output.

#[cfg(test)]
mod fixtures {
    use abm_agent::{Agent, AgentType};
    use abm_core::{AgentId, SimConfig, Tick};
    use abm_spatial::{Attachment, DijkstraRouter, DoorSpec, RoomType, SpaceBuilder};
    use abm_sim::{Sim, SimBuilder};
    use abm_task::{TaskSpec, TaskType};

    use crate::row::{AgentSnapshotRow, TaskSummaryRow, TickSummaryRow};

    pub fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
        AgentSnapshotRow {
            tick,
            agent_id,
            room_id:     agent_id * 10,
            x:           1.5,
            y:           -2.0,
            floor:       0,
            activity:    "idle",
            task_id:     None,
            task_status: None,
        }
    }

    pub fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow {
            tick,
            unix_time_secs:   tick as i64 * 60,
            moving:           2,
            performing:       1,
            idle:             0,
            failed_this_tick: tick,
        }
    }

    pub fn task_row(task_id: u32) -> TaskSummaryRow {
        TaskSummaryRow {
            task_id,
            agent_id:        Some(3),
            task_type:       "clean",
            status:          "completed",
            transition_tick: Some(4),
            from:            Some("in_progress"),
            to:              Some("completed"),
        }
    }

    /// Two workers in Corridor ── Ward ── Store, one task each; 8 ticks,
    /// snapshots every 2.
    pub fn small_sim() -> Sim {
        let mut b = SpaceBuilder::new();
        let main = b.add_building("Main").unwrap();
        let g = b.add_floor(main, 0).unwrap();
        let corridor = b.add_room(g, "Corridor", RoomType::Corridor, (0.0, 0.0)).unwrap();
        let ward = b.add_room(g, "Ward", RoomType::Ward, (20.0, 0.0)).unwrap();
        let store = b.add_room(g, "Store", RoomType::Storage, (20.0, 10.0)).unwrap();
        b.add_door(DoorSpec::standard(), Attachment::between(corridor, ward)).unwrap();
        b.add_door(DoorSpec::standard(), Attachment::between(ward, store)).unwrap();
        let space = b.build().unwrap();

        let config = SimConfig {
            tick_duration_secs:    1,
            end_tick:              Tick(7),
            seed:                  5,
            output_interval_ticks: 2,
            ..SimConfig::default()
        };
        let at = |room| space.room(room).unwrap().centre;
        let nurse = Agent::new(AgentId(0), AgentType::HealthcareWorker, corridor, at(corridor), 10.0);
        let porter = Agent::new(AgentId(1), AgentType::HealthcareWorker, store, at(store), 10.0);
        SimBuilder::new(config, space, DijkstraRouter)
            .agents([nurse, porter])
            .task(AgentId(0), TaskSpec::new(TaskType::AttendPatient, ward).with_dwell(1))
            .task(AgentId(1), TaskSpec::new(TaskType::Clean, corridor))
            .build()
            .unwrap()
    }
}

// ── Row conversion ────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use abm_core::{AgentId, TaskId, Tick};
    use abm_task::{TaskStatus, TaskSummary, TaskType, Transition};

    use crate::row::TaskSummaryRow;

    #[test]
    fn untouched_task_yields_one_row() {
        let summary = TaskSummary {
            task:        TaskId(2),
            owner:       None,
            kind:        TaskType::Generic,
            status:      TaskStatus::Pending,
            transitions: vec![],
        };
        let rows = TaskSummaryRow::from_summary(&summary);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].agent_id, None);
        assert_eq!(rows[0].status, "pending");
        assert!(rows[0].transition_tick.is_none());
    }

    #[test]
    fn one_row_per_transition() {
        let t = TaskId(0);
        let summary = TaskSummary {
            task:        t,
            owner:       Some(AgentId(9)),
            kind:        TaskType::NurseRound,
            status:      TaskStatus::Completed,
            transitions: vec![
                Transition { task: t, from: TaskStatus::Pending, to: TaskStatus::InProgress, at: Tick(3) },
                Transition { task: t, from: TaskStatus::InProgress, to: TaskStatus::Completed, at: Tick(5) },
            ],
        };
        let rows = TaskSummaryRow::from_summary(&summary);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transition_tick, Some(3));
        assert_eq!(rows[1].to, Some("completed"));
        assert!(rows.iter().all(|r| r.status == "completed" && r.task_type == "nurse_round"));
    }
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::fixtures::{small_sim, snap_row, summary_row, task_row};
    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("agent_snapshots.csv")),
            ["tick", "agent_id", "room_id", "x", "y", "floor", "activity", "task_id", "task_status"]
        );
        assert_eq!(
            headers(dir.path().join("tick_summaries.csv")),
            ["tick", "unix_time_secs", "moving", "performing", "idle", "failed_this_tick"]
        );
        assert_eq!(
            headers(dir.path().join("task_summary.csv")),
            ["task_id", "agent_id", "task_type", "status", "transition_tick", "from", "to"]
        );
    }

    #[test]
    fn missing_task_written_as_empty_fields() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(4, 2)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "4");   // agent_id
        assert_eq!(&rows[0][2], "40");  // room_id
        assert_eq!(&rows[0][3], "1.5");
        assert_eq!(&rows[0][6], "idle");
        assert_eq!(&rows[0][7], "");
        assert_eq!(&rows[0][8], "");
    }

    #[test]
    fn summary_and_task_rows_written() {
        let (snaps, sums, tasks) = {
            let mut w = CsvWriter::from_writers(Vec::new(), Vec::new(), Vec::new()).unwrap();
            w.write_tick_summary(&summary_row(3)).unwrap();
            w.write_task_summary(&[task_row(0), task_row(1)]).unwrap();
            w.into_inner().unwrap()
        };
        let snaps = String::from_utf8(snaps).unwrap();
        assert_eq!(snaps.lines().collect::<Vec<_>>(), ["tick,agent_id,room_id,x,y,floor,activity,task_id,task_status"]);
        let sums = String::from_utf8(sums).unwrap();
        assert_eq!(sums.lines().nth(1), Some("3,180,2,1,0,3"));
        let tasks = String::from_utf8(tasks).unwrap();
        assert_eq!(tasks.lines().count(), 3);
        assert_eq!(tasks.lines().nth(2), Some("1,3,clean,completed,4,in_progress,completed"));
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = CsvWriter::new(std::path::Path::new("/no/such/dir")).err().unwrap();
        assert!(matches!(err, crate::OutputError::Io(_)));
    }

    #[test]
    fn integration_csv() {
        let mut sim = small_sim();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // output_interval = 2 over ticks 0..=7 → snapshots at 0, 2, 4, 6
        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 8, "expected 4 ticks × 2 agents");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 8);

        // Both tasks go Pending → InProgress → Completed.
        let mut rdr = csv::Reader::from_path(dir.path().join("task_summary.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| &r[3] == "completed"));
    }

    #[test]
    fn identical_runs_identical_bytes() {
        let run = || {
            let mut sim = small_sim();
            let writer = CsvWriter::from_writers(Vec::new(), Vec::new(), Vec::new()).unwrap();
            let mut obs = SimOutputObserver::new(writer);
            sim.run(&mut obs).unwrap();
            assert!(obs.take_error().is_none());
            obs.into_writer().into_inner().unwrap()
        };
        let a = run();
        let b = run();
        assert!(!a.0.is_empty());
        assert_eq!(a, b);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::fixtures::{small_sim, snap_row, summary_row, task_row};
    use crate::observer::SimOutputObserver;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn open(dir: &TempDir) -> rusqlite::Connection {
        rusqlite::Connection::open(dir.path().join("output.db")).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_missing_task_stored_as_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1), snap_row(1, 1)]).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_snapshots WHERE task_id IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(7)).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let (unix_time, moving, failed): (i64, i64, i64) = conn
            .query_row(
                "SELECT unix_time_secs, moving, failed_this_tick FROM tick_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((unix_time, moving, failed), (420, 2, 7));
    }

    #[test]
    fn sqlite_task_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_task_summary(&[task_row(5)]).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let (kind, to): (String, String) = conn
            .query_row("SELECT task_type, to_status FROM task_summary WHERE task_id = 5", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(kind, "clean");
        assert_eq!(to, "completed");
    }

    #[test]
    fn integration_sqlite() {
        let mut sim = small_sim();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(SqliteWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let conn = open(&dir);
        let snaps: i64 = conn.query_row("SELECT COUNT(*) FROM agent_snapshots", [], |r| r.get(0)).unwrap();
        let ticks: i64 = conn.query_row("SELECT COUNT(*) FROM tick_summaries", [], |r| r.get(0)).unwrap();
        assert_eq!((snaps, ticks), (8, 8));
    }
}
