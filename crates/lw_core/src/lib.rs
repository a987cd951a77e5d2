pub mod animation;
pub mod context;
pub mod geometry;
pub mod input;
pub mod time;

pub use context::SimulationContext;
pub use geometry::{overlaps, Facing, LineCollider, Orientation, Rect};
pub use input::{InputSnapshot, InputState, Key};
pub use time::{FrameClock, FramePacer};
