//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to wall-clock time is held in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Using an integer tick as the canonical time unit means task start times,
//! deadlines, and dwell durations compare exactly (no floating-point drift).
//! Only movement uses floating-point arithmetic: an agent covers
//! `speed * tick_duration_secs` metres per tick.

use std::fmt;
use std::path::PathBuf;

use crate::{ValidationError, ValidationResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many simulated seconds one tick represents.
    pub tick_duration_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock positioned at tick 0.
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Unix timestamp corresponding to `tick`.
    #[inline]
    pub fn unix_secs_at(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Tick containing Unix timestamp `unix_secs` (floor division), or `None`
    /// if the timestamp precedes tick 0.
    pub fn tick_at_unix_secs(&self, unix_secs: i64) -> Option<Tick> {
        let delta = unix_secs.checked_sub(self.start_unix_secs)?;
        if delta < 0 || self.tick_duration_secs == 0 {
            return None;
        }
        Some(Tick(delta as u64 / self.tick_duration_secs as u64))
    }

    /// Break elapsed time into (day, hour, minute) components from tick 0.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }

    #[inline]
    pub fn ticks_for_minutes(&self, minutes: u64) -> u64 {
        self.ticks_for_secs(minutes * 60)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from JSON by `abm_sim::load_config_json` and passed to
/// the simulation builder.  Missing fields fall back to [`Default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Simulated seconds per tick.  Default: 60.
    pub tick_duration_secs: u32,

    /// First simulated tick.
    pub start_tick: Tick,

    /// Last simulated tick (inclusive).
    pub end_tick: Tick,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Emit a snapshot every N ticks, counted from `start_tick`.
    /// 1 = every tick.
    pub output_interval_ticks: u64,

    /// Building layout file consumed by `abm_sim::load_scenario`.
    pub building_layout_ref: Option<PathBuf>,

    /// Movement/seed CSV consumed by `abm_sim::load_scenario`.
    pub movement_data_ref: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:       0,
            tick_duration_secs:    60,
            start_tick:            Tick::ZERO,
            end_tick:              Tick::ZERO,
            seed:                  0,
            output_interval_ticks: 1,
            building_layout_ref:   None,
            movement_data_ref:     None,
        }
    }
}

impl SimConfig {
    /// Number of ticks in the run (`start_tick..=end_tick`).
    #[inline]
    pub fn total_ticks(&self) -> u64 {
        self.end_tick.since(self.start_tick) + 1
    }

    /// Construct a `SimClock` positioned at `start_tick`.
    pub fn make_clock(&self) -> SimClock {
        let mut clock = SimClock::new(self.start_unix_secs, self.tick_duration_secs);
        clock.current_tick = self.start_tick;
        clock
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(ValidationError::Config("tick_duration_secs must be > 0".into()));
        }
        if self.end_tick < self.start_tick {
            return Err(ValidationError::Config(format!(
                "end_tick {} precedes start_tick {}",
                self.end_tick, self.start_tick
            )));
        }
        if self.output_interval_ticks == 0 {
            return Err(ValidationError::Config("output_interval_ticks must be > 0".into()));
        }
        Ok(())
    }
}
