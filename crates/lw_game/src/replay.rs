use lw_core::{FrameClock, InputSnapshot, InputState, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Recorded input as runs of held keys. Press edges are derived from the
/// difference between consecutive frames, so holding `jump` across two runs
/// is a single press.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<InputSnapshot> {
        let mut state = InputState::new();
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                state.set_held(&frame.held);
                out.push(state.snapshot());
                state.end_frame();
            }
        }
        out
    }

    pub fn clock(&self) -> FrameClock {
        FrameClock::with_frame_us((self.frame_ms * 1000.0).round() as u64)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frame_ms <= 0.0 || !replay.frame_ms.is_finite() {
        return Err("Replay validation failed: frame_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

fn default_frame_ms() -> f32 {
    1000.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
