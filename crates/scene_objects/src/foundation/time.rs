//! Frame timing utilities
//!
//! The clock is owned by whoever drives the frame loop. Each tick produces a
//! [`FrameTime`] that is handed to `EntityManager::update`, so nothing in the
//! crate reads time from process-wide state.

use std::time::{Duration, Instant};

/// Elapsed-time values for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Total time since the clock started, in seconds
    pub time: f32,
    /// Time since the previous frame, in seconds
    pub delta_time: f32,
    /// Frame number, starting at 1 for the first tick
    pub frame: u64,
}

impl FrameTime {
    /// Build a frame time by hand (useful for fixed-step drivers and tests)
    pub fn new(time: f32, delta_time: f32, frame: u64) -> Self {
        Self { time, delta_time, frame }
    }
}

/// Frame clock driven by the outer loop
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    total_time: f32,
    frame_count: u64,
    max_delta: Option<f32>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
            max_delta: None,
        }
    }

    /// Clamp per-frame deltas, e.g. after a debugger pause
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    /// Sample wall-clock time and start a new frame
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32())
    }

    /// Start a new frame with an explicit delta (fixed-step driving)
    pub fn advance(&mut self, delta_time: f32) -> FrameTime {
        let delta_time = match self.max_delta {
            Some(max) => delta_time.clamp(0.0, max),
            None => delta_time.max(0.0),
        };
        self.total_time += delta_time;
        self.frame_count += 1;
        FrameTime {
            time: self.total_time,
            delta_time,
            frame: self.frame_count,
        }
    }

    /// Get the total elapsed time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed time
#[derive(Debug)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }
}
