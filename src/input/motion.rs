//! Motion input: sensor readings to per-tick deltas
//!
//! Producers push raw accelerometer/gyroscope readings from any thread; the
//! simulation thread swaps the folded deltas out once per tick. The fold is
//! lock-free: each component is an f32 stored as bits in an `AtomicU32`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::{self, JoinHandle};

use glam::{Vec2, Vec3};

use crate::tuning::Tuning;

/// One reading from the device motion sensors
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSample {
    /// Accelerometer: device tilt per axis, flat = zero
    pub accel: Vec3,
    /// Gyroscope: angular velocity per axis
    pub gyro: Vec3,
}

/// A stream of motion samples
///
/// `next_sample` blocks until a reading arrives and returns `None` when the
/// stream ends. Implementations must eventually return so the pump thread
/// can exit.
pub trait MotionInputSource: Send {
    fn next_sample(&mut self) -> Option<MotionSample>;
}

/// f32 stored as bits in an `AtomicU32`
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(v: f32) -> Self {
        Self(AtomicU32::new(v.to_bits()))
    }

    fn add(&self, v: f32) {
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            Some((f32::from_bits(bits) + v).to_bits())
        });
    }

    fn swap(&self, v: f32) -> f32 {
        f32::from_bits(self.0.swap(v.to_bits(), Ordering::AcqRel))
    }
}

/// Pending motion deltas, folded sample by sample
///
/// Tilt translates the ship: `Δx += accel.x · speed`, `Δy −= accel.y · speed`
/// (screen y grows downward, device tilt up means fly up), with speed scaled
/// by how hard the device is tilted toward the player and clamped. Gyro turns
/// the camera. Any number of producers may push concurrently; `take` is for
/// the single simulation thread.
#[derive(Debug)]
pub struct MotionAccumulator {
    dx: AtomicF32,
    dy: AtomicF32,
    rot_x: AtomicF32,
    rot_y: AtomicF32,
    base_speed: f32,
    accel_span: f32,
    speed_min: f32,
    speed_max: f32,
    gyro_factor: f32,
}

impl MotionAccumulator {
    /// Capture the motion feel knobs from `tuning`
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            dx: AtomicF32::new(0.0),
            dy: AtomicF32::new(0.0),
            rot_x: AtomicF32::new(0.0),
            rot_y: AtomicF32::new(0.0),
            base_speed: tuning.motion_base_speed,
            accel_span: tuning.motion_accel_span,
            speed_min: tuning.motion_speed_min,
            speed_max: tuning.motion_speed_max,
            gyro_factor: tuning.gyro_factor,
        }
    }

    /// Fold one sensor reading into the pending deltas
    pub fn push(&self, sample: MotionSample) {
        let speed = (self.base_speed + sample.accel.z * self.accel_span)
            .clamp(self.speed_min, self.speed_max);
        self.dx.add(sample.accel.x * speed);
        self.dy.add(-sample.accel.y * speed);
        self.rot_x.add(sample.gyro.x * self.gyro_factor);
        self.rot_y.add(sample.gyro.y * self.gyro_factor);
    }

    /// Take the pending deltas, resetting them to zero
    ///
    /// Returns (ship position delta, camera rotation delta).
    pub fn take(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.dx.swap(0.0), self.dy.swap(0.0)),
            Vec2::new(self.rot_x.swap(0.0), self.rot_y.swap(0.0)),
        )
    }
}

/// Background thread draining a [`MotionInputSource`] into an accumulator
pub struct MotionPump {
    handle: Option<JoinHandle<()>>,
}

impl MotionPump {
    /// Pump `source` into `sink` until the source ends
    pub fn spawn(mut source: impl MotionInputSource + 'static, sink: Arc<MotionAccumulator>) -> Self {
        let handle = thread::spawn(move || {
            while let Some(sample) = source.next_sample() {
                sink.push(sample);
            }
            log::debug!("motion source ended");
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Wait for the source to end
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
