//! `abm-sim` — the Simulation Engine: builder, engine state machine, tick
//! loop, observers, and scenario loading.
//!
//! # Tick loop
//!
//! ```text
//! for tick in start_tick..=end_tick:
//!   ① Agents    — abm_agent::update for every agent, ascending AgentId
//!                 (drop dead task → move / arrive / perform / select)
//!   ② Deadlines — TaskRegistry::sweep_deadlines fails overdue live tasks
//!   ③ Output    — on_snapshot every output_interval_ticks, on_tick_end always
//! ```
//!
//! The run is single-threaded and sequential, so a fixed config, `Space`,
//! agent set, and task set always produce the same snapshot stream.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use abm_core::SimConfig;
//! use abm_sim::{load_config_json, load_scenario, NoopObserver, SimBuilder};
//! use abm_agent::SeedDefaults;
//!
//! let config = load_config_json("scenario.json")?;
//! let scenario = load_scenario(&config, &SeedDefaults::default())?;
//! let mut sim = SimBuilder::from_scenario(config, scenario).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;


pub use builder::SimBuilder;
pub use config::{load_config_json, load_config_reader, load_scenario, Scenario};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{EngineState, Sim};
pub use snapshot::{AgentSnapshot, Snapshot, TickStats};
