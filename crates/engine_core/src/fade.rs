//! Time-driven opacity fades, advanced by the frame clock instead of timers.

/// Linear fade of an opacity value toward a target over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Fade {
    /// Fade from `from` to `to` over `duration` seconds. A non-positive duration completes immediately.
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// A fade that is already finished at `value`.
    pub fn settled(value: f32) -> Self {
        Self::new(value, value, 0.0)
    }

    /// Advance by `dt` seconds; negative or NaN deltas are ignored. Returns the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
