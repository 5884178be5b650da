//! Time management for the game loop.

use std::time::{Duration, Instant};

/// Default fixed simulation step (60 Hz).
pub const DEFAULT_FIXED_TIMESTEP: f64 = 1.0 / 60.0;
/// Default upper bound for a single frame's delta, in seconds.
pub const DEFAULT_MAX_FRAME_DELTA: f64 = 0.1;

/// Measures wall-clock time between rendered frames.
#[derive(Debug)]
pub struct Time {
    /// Time when the engine started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Forget the time spent since the last frame (e.g. after a blocking level switch).
    pub fn reset_frame(&mut self) {
        self.last_frame = Instant::now();
        self.delta = Duration::ZERO;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f64 {
        self.delta.as_secs_f64()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.last_frame.duration_since(self.start_time).as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

/// Fixed-timestep accumulator.
///
/// Each frame feeds its wall-clock delta into [`SimulationClock::advance`], which
/// returns how many fixed steps of [`SimulationClock::fixed_step`] seconds the
/// caller must run. Whatever is left over (always less than one step) carries
/// into the next frame, so simulation speed is independent of display rate.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    fixed_step: f64,
    max_frame_delta: f64,
    leftover: f64,
    total_steps: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_FRAME_DELTA)
    }
}

impl SimulationClock {
    /// Create a clock with step `fixed_step` and per-frame clamp `max_frame_delta` (seconds).
    ///
    /// Non-positive or non-finite parameters fall back to the defaults.
    pub fn new(fixed_step: f64, max_frame_delta: f64) -> Self {
        let fixed_step = if fixed_step.is_finite() && fixed_step > 0.0 {
            fixed_step
        } else {
            log::warn!("Invalid fixed timestep {}, using 1/60 s", fixed_step);
            DEFAULT_FIXED_TIMESTEP
        };
        let max_frame_delta = if max_frame_delta.is_finite() && max_frame_delta > 0.0 {
            max_frame_delta
        } else {
            log::warn!("Invalid max frame delta {}, using 0.1 s", max_frame_delta);
            DEFAULT_MAX_FRAME_DELTA
        };
        Self {
            fixed_step,
            max_frame_delta,
            leftover: 0.0,
            total_steps: 0,
        }
    }

    /// Set the fixed step rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        if hz.is_finite() && hz > 0.0 {
            self.fixed_step = 1.0 / hz;
            self.leftover = self.leftover.min(self.fixed_step - f64::EPSILON).max(0.0);
        }
    }

    /// Accumulate a frame delta and return the number of fixed steps to run this frame.
    ///
    /// Negative or NaN deltas count as zero; deltas above the clamp are cut to it.
    pub fn advance(&mut self, frame_delta: f64) -> u32 {
        let dt = if frame_delta.is_nan() || frame_delta < 0.0 {
            0.0
        } else {
            frame_delta.min(self.max_frame_delta)
        };

        self.leftover += dt;
        let mut steps = 0;
        while self.leftover >= self.fixed_step {
            self.leftover -= self.fixed_step;
            steps += 1;
        }
        self.total_steps += u64::from(steps);
        steps
    }

    /// Run `step` once per fixed step owed for this frame. Returns the step count.
    pub fn drain<F: FnMut(f32)>(&mut self, frame_delta: f64, mut step: F) -> u32 {
        let steps = self.advance(frame_delta);
        let h = self.fixed_step as f32;
        for _ in 0..steps {
            step(h);
        }
        steps
    }

    /// Fixed step duration in seconds.
    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    /// Per-frame delta clamp in seconds.
    pub fn max_frame_delta(&self) -> f64 {
        self.max_frame_delta
    }

    /// Time carried into the next frame. Always in `[0, fixed_step)`.
    pub fn leftover(&self) -> f64 {
        self.leftover
    }

    /// Fraction of a step carried over, for interpolating presentation.
    pub fn alpha(&self) -> f32 {
        (self.leftover / self.fixed_step) as f32
    }

    /// Total fixed steps taken since creation.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Total simulated time in seconds.
    pub fn simulated_seconds(&self) -> f64 {
        self.total_steps as f64 * self.fixed_step
    }
}
