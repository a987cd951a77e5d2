//! Velocity-driven walk-cycle sprite selection.
//!
//! Sprite sheets are laid out as two mirrored strips, right-facing first:
//!
//! ```text
//! [stand, walk_1 .. walk_n, jump]  [stand, walk_1 .. walk_n, jump]  [neutral_jump]?
//!  \_________ right _________/      \__________ left __________/
//! ```
//!
//! so a strip is `walk_frames + 2` sprites wide. The walk step advances when
//! the time since the last advance exceeds an interval that shrinks with
//! horizontal speed. Timing reads the frame clock in milliseconds, never the
//! wall clock, so the same inputs pick the same sprites on every run.

use crate::geometry::Facing;

#[derive(Debug, Clone)]
pub struct WalkCycle {
    pub walk_frames: usize,
    pub base_interval_ms: f32,
    /// Interval reduction per unit of horizontal speed.
    pub speed_factor_ms: f32,
    /// Sheet carries a trailing jump sprite for airborne-without-drift.
    pub neutral_jump_frame: bool,
    step: usize,
    last_advance_ms: u64,
}

impl WalkCycle {
    pub fn new(walk_frames: usize, base_interval_ms: f32, speed_factor_ms: f32) -> Self {
        Self {
            walk_frames: walk_frames.max(1),
            base_interval_ms,
            speed_factor_ms,
            neutral_jump_frame: false,
            step: 0,
            last_advance_ms: 0,
        }
    }

    pub fn with_neutral_jump_frame(mut self) -> Self {
        self.neutral_jump_frame = true;
        self
    }

    pub fn strip_len(&self) -> usize {
        self.walk_frames + 2
    }

    /// Total sprites the sheet must provide.
    pub fn frame_count(&self) -> usize {
        self.strip_len() * 2 + usize::from(self.neutral_jump_frame)
    }

    pub fn interval_ms(&self, vel_x: f32) -> f32 {
        (self.base_interval_ms - vel_x.abs() * self.speed_factor_ms).max(1.0)
    }

    /// Step within the strip: 0 is standing, 1..=walk_frames are walk poses.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn reset(&mut self) {
        self.step = 0;
        self.last_advance_ms = 0;
    }

    /// Advance the cycle for this tick and return the sprite index to draw.
    pub fn update(&mut self, vel_x: f32, facing: Facing, grounded: bool, now_ms: u64) -> usize {
        if vel_x == 0.0 {
            self.step = 0;
        } else if self.step == 0 {
            self.step = 1;
            self.last_advance_ms = now_ms;
        } else if now_ms.saturating_sub(self.last_advance_ms) as f32 > self.interval_ms(vel_x) {
            self.step += 1;
            self.last_advance_ms = now_ms;
        }
        if self.step > self.walk_frames {
            self.step = 0;
        }

        if !grounded {
            return self.airborne_index(vel_x, facing);
        }
        self.strip_offset(facing) + self.step
    }

    fn airborne_index(&self, vel_x: f32, facing: Facing) -> usize {
        let jump = self.walk_frames + 1;
        if vel_x > 0.0 {
            jump
        } else if vel_x < 0.0 || !self.neutral_jump_frame {
            let facing = if vel_x < 0.0 { Facing::Left } else { facing };
            self.strip_offset(facing) + jump
        } else {
            self.strip_len() * 2
        }
    }

    fn strip_offset(&self, facing: Facing) -> usize {
        match facing {
            Facing::Right => 0,
            Facing::Left => self.strip_len(),
        }
    }
}
