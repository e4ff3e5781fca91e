//! Starpew - a tilt-to-fly, shout-to-shoot space arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world state, fixed tick, fake-3D projection)
//! - `input`: Motion and voice adapters that feed the simulation
//! - `render`: Read-only frame composition over an abstract drawing surface
//! - `runner`: Frame clock and per-frame session glue
//! - `tuning`: Data-driven game balance

pub mod input;
pub mod render;
pub mod runner;
pub mod sim;
pub mod tuning;

pub use runner::{FrameClock, Session, TickerClock};
pub use sim::state::WorldState;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation timestep (~60 Hz)
    pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

    /// Depth assigned to a point directly under the ship
    pub const BASE_DEPTH: f32 = 1000.0;
    /// Divisor for the squared radial distance that deepens off-center points
    pub const DEPTH_FALLOFF: f32 = 20000.0;
    /// Focal length of the perspective divide
    pub const FOCAL_LENGTH: f32 = 1000.0;
    /// Screen pixels of parallax per unit of accumulated camera rotation
    pub const PARALLAX: f32 = 20.0;
}

/// Rotate `p` about `origin` by `radians`
#[inline]
pub fn rotate_about(p: Vec2, origin: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    let d = p - origin;
    origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}
