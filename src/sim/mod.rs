//! Fixed-timestep game simulation
//!
//! Every mutation of a [`WorldState`](state::WorldState) goes through
//! [`tick()`]: one call advances one frame, and every random draw comes from
//! the world's own seeded RNG, so a seed plus an input trace replays into an
//! identical world. Rendering reads snapshots and never writes back; nothing
//! here reaches a platform API.

pub mod collision;
pub mod projection;
pub mod state;
pub mod tick;

pub use collision::{within_box, within_radius};
pub use projection::{Projected, Viewport, project};
pub use state::{
    EnemyAgent, Explosion, ExplosionParticle, Heading, Owner, Projectile, Rgb, ShipState,
    SpokenWord, WorldState,
};
pub use tick::{TickInput, tick};
