//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`] so a JSON file can rebalance
//! the game without a rebuild. Defaults reproduce the shipped balance.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why a tuning file failed to load
#[derive(Debug)]
pub enum TuningError {
    /// File exists but could not be read
    Io(io::Error),
    /// File read but is not valid tuning JSON
    Parse(serde_json::Error),
    /// Parsed but a value is outside the range the simulation accepts
    Range(&'static str),
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "tuning file unreadable: {e}"),
            TuningError::Parse(e) => write!(f, "tuning file invalid: {e}"),
            TuningError::Range(what) => write!(f, "tuning value out of range: {what}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
            TuningError::Range(_) => None,
        }
    }
}

impl From<io::Error> for TuningError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Game balance knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World population ===
    /// Background stars kept alive at all times
    pub star_count: usize,
    /// Enemy agents the respawn phase restores each tick
    pub enemy_target: usize,
    /// World units each side of the ship for star wrap and enemy respawn
    pub spawn_spread: f32,

    // === Motion feel ===
    /// Ship speed with the device flat (accel z = 0)
    pub motion_base_speed: f32,
    /// Extra speed per unit of accel z
    pub motion_accel_span: f32,
    /// Lower clamp on ship speed
    pub motion_speed_min: f32,
    /// Upper clamp on ship speed
    pub motion_speed_max: f32,
    /// Camera rotation per unit of gyro reading
    pub gyro_factor: f32,

    // === Combat ===
    /// Minimum fire-request age before it leaves the queue, in milliseconds
    pub fire_cooldown_ms: u64,
    /// Player shot screen units per tick, upward
    pub player_shot_speed: f32,
    /// Enemy shot world units per tick, downward
    pub enemy_shot_speed: f32,
    /// Enemy shots are dropped once past this world y
    pub enemy_shot_range: f32,
    /// Per-tick probability that an enemy fires
    pub enemy_fire_chance: f64,
    /// Enemy random-walk step span per axis, in ± world units
    pub enemy_walk_span: f32,
    /// Shot-to-enemy distance that counts as a kill
    pub kill_radius: f32,
    /// Half extent of the ship hit box per axis
    pub ship_hit_box: f32,

    // === Explosions ===
    /// Particles per explosion
    pub explosion_particles: usize,
    /// Ticks an explosion lives
    pub explosion_max_age: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            star_count: 1000,
            enemy_target: 3,
            spawn_spread: 1000.0,

            motion_base_speed: 20.0,
            motion_accel_span: 30.0,
            motion_speed_min: 5.0,
            motion_speed_max: 50.0,
            gyro_factor: 0.3,

            fire_cooldown_ms: 250,
            player_shot_speed: 10.0,
            enemy_shot_speed: 10.0,
            enemy_shot_range: 1000.0,
            enemy_fire_chance: 0.01,
            enemy_walk_span: 2.0,
            kill_radius: 50.0,
            ship_hit_box: 30.0,

            explosion_particles: 50,
            explosion_max_age: 60,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation has hard preconditions on
    ///
    /// `random_bool` needs a probability within [0, 1] and `random_range`
    /// needs a positive finite span; the motion clamp additionally needs
    /// `speed_min <= speed_max`. Checked at load so a tuning file cannot
    /// panic the game mid-run.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.enemy_fire_chance >= 0.0 && self.enemy_fire_chance <= 1.0) {
            return Err(TuningError::Range("enemy_fire_chance must be within 0..=1"));
        }
        if !(self.enemy_walk_span.is_finite() && self.enemy_walk_span > 0.0) {
            return Err(TuningError::Range("enemy_walk_span must be positive and finite"));
        }
        if !(self.spawn_spread.is_finite() && self.spawn_spread > 0.0) {
            return Err(TuningError::Range("spawn_spread must be positive and finite"));
        }
        if !(self.motion_speed_min.is_finite()
            && self.motion_speed_max.is_finite()
            && self.motion_speed_min <= self.motion_speed_max)
        {
            return Err(TuningError::Range(
                "motion_speed_min..motion_speed_max must be finite and ordered",
            ));
        }
        Ok(())
    }

    /// Load tuning from `path`
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load tuning from `path`, falling back to defaults when the file is
    /// missing, malformed, or out of range
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(TuningError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No tuning file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Fire cooldown as a [`Duration`]
    pub fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }
}
