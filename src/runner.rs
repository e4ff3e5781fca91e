//! Frame pacing and session wiring
//!
//! [`TickerClock`] drives a callback at the fixed frame period;
//! [`Session`] bundles the world with its input feeds and a surface so one
//! `frame()` call is a complete gather-tick-render unit. Producers (motion,
//! voice) run on their own threads and only ever touch the accumulator and
//! the fire queue; the session drains them on the clock thread.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::consts::FRAME_PERIOD;
use crate::input::{FireQueue, MotionAccumulator};
use crate::render::{Surface, render};
use crate::sim::projection::Viewport;
use crate::sim::state::WorldState;
use crate::sim::tick::{TickInput, tick};

/// Drives a step callback until it asks to stop.
pub trait FrameClock {
    /// Run `step` repeatedly; a `false` return ends the loop.
    fn run(self, step: impl FnMut() -> bool);
}

/// Fixed-period clock: one step per frame, sleeping off any slack.
///
/// A step that overruns its period is followed immediately by the next one;
/// lost time is not made up.
pub struct TickerClock {
    period: std::time::Duration,
}

impl TickerClock {
    pub fn new(period: std::time::Duration) -> Self {
        Self { period }
    }
}

impl Default for TickerClock {
    fn default() -> Self {
        Self::new(FRAME_PERIOD)
    }
}

impl FrameClock for TickerClock {
    fn run(self, mut step: impl FnMut() -> bool) {
        loop {
            let deadline = Instant::now() + self.period;
            if !step() {
                break;
            }
            let now = Instant::now();
            if now < deadline {
                thread::sleep(deadline - now);
            }
        }
    }
}

/// One running game: world, input feeds, and the surface frames land on.
pub struct Session<S> {
    world: WorldState,
    viewport: Viewport,
    motion: Arc<MotionAccumulator>,
    fire_queue: Arc<FireQueue>,
    surface: S,
}

impl<S: Surface> Session<S> {
    pub fn new(
        world: WorldState,
        viewport: Viewport,
        motion: Arc<MotionAccumulator>,
        fire_queue: Arc<FireQueue>,
        surface: S,
    ) -> Self {
        Self {
            world,
            viewport,
            motion,
            fire_queue,
            surface,
        }
    }

    /// Advance one tick with everything gathered since the last call, then
    /// recompose the frame.
    ///
    /// `spoken` is the transcript fragment to float over the scene this tick,
    /// if the voice side produced one.
    pub fn frame(&mut self, spoken: Option<String>) {
        let (pos_delta, rot_delta) = self.motion.take();
        let input = TickInput {
            pos_delta,
            rot_delta,
            spoken,
            now: Instant::now(),
            viewport: self.viewport,
        };
        tick(&mut self.world, &input, &self.fire_queue);
        render(&self.world, self.viewport, &mut self.surface);
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn surface(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Adopt a new viewport (terminal resize); takes effect next frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}
