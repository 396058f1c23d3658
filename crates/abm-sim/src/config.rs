//! Configuration and scenario loading.
//!
//! All file I/O happens here, before a `Sim` is built; nothing in the tick
//! loop touches the filesystem.
//!
//! # Config format (JSON)
//!
//! Every field is optional and falls back to `SimConfig::default()`:
//!
//! ```json
//! {
//!   "start_unix_secs": 1700000000,
//!   "tick_duration_secs": 60,
//!   "start_tick": 0,
//!   "end_tick": 480,
//!   "seed": 42,
//!   "output_interval_ticks": 1,
//!   "building_layout_ref": "layout.json",
//!   "movement_data_ref": "movements.csv"
//! }
//! ```
//!
//! Relative `*_ref` paths are resolved against the config file's directory
//! by [`load_config_json`].

use std::io::Read;
use std::path::Path;

use abm_agent::{load_movement_csv, SeedDefaults, SeededAgent};
use abm_core::SimConfig;
use abm_spatial::{load_layout_json, Space};

use crate::{SimError, SimResult};

/// Parse a `SimConfig` from any JSON reader.
pub fn load_config_reader<R: Read>(reader: R) -> SimResult<SimConfig> {
    let config: SimConfig =
        serde_json::from_reader(reader).map_err(|e| SimError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load a `SimConfig` from a JSON file.
pub fn load_config_json(path: impl AsRef<Path>) -> SimResult<SimConfig> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let mut config = load_config_reader(std::io::BufReader::new(file))?;
    if let Some(dir) = path.parent() {
        for reference in [&mut config.building_layout_ref, &mut config.movement_data_ref] {
            if let Some(p) = reference.as_mut().filter(|p| p.is_relative()) {
                *p = dir.join(&*p);
            }
        }
    }
    Ok(config)
}

/// Everything loaded from a config's references.
pub struct Scenario {
    pub space:  Space,
    pub agents: Vec<SeededAgent>,
}

/// Load the layout and (if referenced) the movement data named by `config`.
///
/// The placement jitter is seeded from `config.seed`; the other fields of
/// `defaults` apply to every seeded agent and task.
pub fn load_scenario(config: &SimConfig, defaults: &SeedDefaults) -> SimResult<Scenario> {
    let layout = config
        .building_layout_ref
        .as_ref()
        .ok_or_else(|| SimError::Config("building_layout_ref is required".into()))?;
    let space = load_layout_json(layout)?;

    let agents = match &config.movement_data_ref {
        None => Vec::new(),
        Some(path) => {
            let defaults = SeedDefaults { seed: config.seed, ..defaults.clone() };
            load_movement_csv(path, &space, &config.make_clock(), &defaults)?
        }
    };
    Ok(Scenario { space, agents })
}
