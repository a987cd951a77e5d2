use crate::input::InputSnapshot;
use crate::time::FrameClock;

/// Everything an update call may read from the outside world for one tick.
///
/// The simulation never queries global time or input devices; hosts (the
/// runner, replays, tests) build one of these per tick and pass it down.
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext<'a> {
    pub clock: &'a FrameClock,
    pub input: InputSnapshot,
}

impl<'a> SimulationContext<'a> {
    pub fn new(clock: &'a FrameClock, input: InputSnapshot) -> Self {
        Self { clock, input }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn frame_ms(&self) -> f32 {
        self.clock.frame_ms()
    }
}
