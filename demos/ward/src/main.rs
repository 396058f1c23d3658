//! ward — small demonstration of the hospital agent-based simulation.
//!
//! Runs two hours of a two-floor ward: three staff seeded from an embedded
//! movement CSV, plus a handful of nursing tasks.  Pass a config JSON path to
//! run a scenario from disk instead:
//!
//! ```text
//! cargo run -p ward -- [scenario.json] [output_dir]
//! cargo run -p ward -- demos/ward/data/scenario.json
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

mod layout;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use abm_agent::{load_movement_reader, SeedDefaults};
use abm_core::{AgentId, SimConfig, Tick};
use abm_output::{CsvWriter, OutputWriter, SimOutputObserver};
use abm_sim::{
    load_config_json, load_scenario, Sim, SimBuilder, SimObserver, Snapshot, TickStats,
};
use abm_spatial::DijkstraRouter;
use abm_task::{Priority, TaskSpec, TaskSummary, TaskType};

use layout::build_space;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const START_UNIX_SECS:       i64 = 1_700_000_000;
const TICK_DURATION_SECS:    u32 = 10;
const SIM_MINUTES:           u64 = 120;
const OUTPUT_INTERVAL_SECS:  u64 = 60;

// ── Movement seed ─────────────────────────────────────────────────────────────

// First row per agent places it; later rows become GotoLocation tasks.
const MOVEMENT_CSV: &str = "\
agent_id,timestamp,location,agent_type
1,1700000000,General:0:Nurses' Station,healthcare_worker
1,1700001800,General:0:Ward A,healthcare_worker
1,1700004200,General:1:Staff Room,healthcare_worker
2,1700000000,General:0:Entrance,healthcare_worker
2,1700000600,General:0:Ward B,healthcare_worker
2,1700003000,General:0:Sluice,healthcare_worker
3,1700000000,General:0:Ward A,patient
";

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    failed:        usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, failed: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshot_rows += snapshot.agents.len();
        self.inner.on_snapshot(snapshot);
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.summary_rows += 1;
        self.failed += stats.failed_this_tick;
        self.inner.on_tick_end(tick, stats);
    }

    fn on_sim_end(&mut self, final_tick: Tick, summary: &[TaskSummary]) {
        self.inner.on_sim_end(final_tick, summary);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn built_in() -> Result<Sim> {
    let mut config = SimConfig {
        start_unix_secs:    START_UNIX_SECS,
        tick_duration_secs: TICK_DURATION_SECS,
        start_tick:         Tick::ZERO,
        seed:               SEED,
        ..SimConfig::default()
    };
    let clock = config.make_clock();
    let mins = |m: u64| clock.ticks_for_minutes(m);
    config.end_tick = Tick(mins(SIM_MINUTES) - 1);
    config.output_interval_ticks = clock.ticks_for_secs(OUTPUT_INTERVAL_SECS);
    let space = build_space()?;
    let room = |r: &str| space.resolve(r).with_context(|| format!("unknown room {r}"));
    let ward_a = room("General:0:Ward A")?;
    let ward_b = room("General:0:Ward B")?;
    let station = room("General:0:Nurses' Station")?;

    let seeded = load_movement_reader(
        Cursor::new(MOVEMENT_CSV),
        &space,
        &config.make_clock(),
        &SeedDefaults { seed: SEED, ..SeedDefaults::default() },
    )?;
    info!(agents = seeded.len(), rooms = space.room_count(), "built-in ward scenario");

    let nurse = AgentId(1);
    let assistant = AgentId(2);
    let sim = SimBuilder::new(config, space, DijkstraRouter)
        .seeded(seeded)
        // Morning round: 5 minutes per ward, urgent bell halfway through.
        .task(nurse, TaskSpec::new(TaskType::NurseRound, ward_a).with_priority(Priority::HIGH).with_dwell(mins(5)))
        .task(nurse, TaskSpec::new(TaskType::NurseRound, ward_b).with_priority(Priority::HIGH).with_dwell(mins(5)))
        .task(
            nurse,
            TaskSpec::new(TaskType::AttendBell, ward_b)
                .with_priority(Priority::URGENT)
                .starting_at(Tick(mins(3)))
                .due_by(Tick(mins(13)))
                .with_dwell(mins(1)),
        )
        .task(
            nurse,
            TaskSpec::new(TaskType::OfficeWork, station).starting_at(Tick(mins(15))).with_dwell(mins(10)),
        )
        // Cannot be met: due before it may start.
        .task(
            assistant,
            TaskSpec::new(TaskType::AttendPatient, ward_a)
                .starting_at(Tick(mins(50)))
                .due_by(Tick(mins(30))),
        )
        .task(
            assistant,
            TaskSpec::new(TaskType::Clean, ward_a).with_priority(Priority::LOW).with_dwell(mins(10)),
        )
        .build()?;
    Ok(sim)
}

fn from_file(path: &Path) -> Result<Sim> {
    let config = load_config_json(path).with_context(|| format!("loading {}", path.display()))?;
    let scenario = load_scenario(&config, &SeedDefaults::default())?;
    Ok(SimBuilder::from_scenario(config, scenario).build()?)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output/ward"));

    // 1. Build the engine.
    let mut sim = match &config_path {
        Some(path) => from_file(path)?,
        None => built_in()?,
    };
    println!("=== ward — hospital agent-based simulation ===");
    println!(
        "Rooms: {}  |  Agents: {}  |  Tasks: {}  |  Ticks: {}",
        sim.space().room_count(),
        sim.agent_count(),
        sim.registry().len(),
        sim.config().total_ticks(),
    );

    // 2. Set up output.
    std::fs::create_dir_all(&out_dir)?;
    let writer = CsvWriter::new(&out_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 3. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Summary.
    println!("Simulation complete in {:.3} s ({})", elapsed.as_secs_f64(), sim.clock());
    println!("  agent_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!("  tasks failed        : {}", obs.failed);
    println!();

    println!("{:<8} {:<8} {:<16} {:<12} {:<10}", "Task", "Agent", "Type", "Status", "Finished");
    println!("{}", "-".repeat(56));
    for summary in sim.task_summary() {
        let finished = summary
            .transitions
            .last()
            .filter(|t| t.to.is_terminal())
            .map(|t| t.at.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<8} {:<8} {:<16} {:<12} {:<10}",
            summary.task.0,
            summary.owner.map(|a| a.0.to_string()).unwrap_or_else(|| "-".into()),
            summary.kind.as_str(),
            summary.status.as_str(),
            finished,
        );
    }

    Ok(())
}
