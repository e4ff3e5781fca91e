//! External input adapters
//!
//! Sensor and speech producers run on their own threads and never touch the
//! world directly: motion folds into an atomic accumulator, voice folds into
//! the fire queue. The simulation thread drains both exactly once per tick.

pub mod motion;
pub mod voice;

pub use motion::{MotionAccumulator, MotionInputSource, MotionPump, MotionSample};
pub use voice::{FireQueue, VoiceCommandSource, VoiceError, VoiceListener};
