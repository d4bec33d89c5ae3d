/// Fixed timestep accumulator.
/// The host hands over variable frame deltas; the simulation always
/// advances in whole `dt` steps.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Cap the number of steps a single frame may run.
    /// A tab that was backgrounded for seconds should not replay every step.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Looping frame counter driven by elapsed time.
///
/// Advances one frame every `interval` seconds and wraps at `frame_count`.
/// Used for the character's general and walk cycles.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: f32,
    frame_count: u32,
    frame: u32,
    elapsed: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32, frame_count: u32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            frame_count: frame_count.max(1),
            frame: 0,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds. Returns true if the frame changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let mut changed = false;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.frame = (self.frame + 1) % self.frame_count;
            changed = true;
        }
        changed
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.elapsed = 0.0;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}
