//! Frame timing.
//!
//! `FrameClock` is the simulation's notion of time: it advances one fixed
//! frame per tick, in integer microseconds, and is what animation timers and
//! cooldowns read. Physics never scales by it; one tick is one frame.
//!
//! `FramePacer` is the host's wall-clock side: it measures real frame times,
//! keeps a smoothed FPS readout and tells the host how long to sleep to hold
//! the target rate.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;
const SLOW_FRAME_WARN_SECS: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_us: u64,
    elapsed_us: u64,
    pub frame_count: u64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let fps = u64::from(fps.max(1));
        Self {
            frame_us: 1_000_000 / fps,
            elapsed_us: 0,
            frame_count: 0,
        }
    }

    pub fn with_frame_us(frame_us: u64) -> Self {
        Self {
            frame_us: frame_us.max(1),
            elapsed_us: 0,
            frame_count: 0,
        }
    }

    /// Advance by exactly one frame.
    pub fn tick(&mut self) {
        self.elapsed_us += self.frame_us;
        self.frame_count += 1;
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn frame_us(&self) -> u64 {
        self.frame_us
    }

    pub fn frame_ms(&self) -> f32 {
        self.frame_us as f32 / 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

pub struct FramePacer {
    pub target_dt: f64,
    pub real_dt: f64,
    pub frame_count: u64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let target_dt = 1.0 / f64::from(fps.max(1));
        Self {
            target_dt,
            real_dt: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            fps_samples: [target_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / target_dt,
            smoothed_frame_time_ms: target_dt * 1000.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.frame_count += 1;

        if self.real_dt > SLOW_FRAME_WARN_SECS {
            log::warn!("Frame took {:.1}ms", self.real_dt * 1000.0);
        }

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    /// Time left in the current frame budget, measured from `begin_frame`.
    pub fn remaining(&self) -> Duration {
        let spent = self.last_instant.elapsed().as_secs_f64();
        Duration::from_secs_f64((self.target_dt - spent).max(0.0))
    }

    /// Sleep out the rest of the frame budget.
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}
