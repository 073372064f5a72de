//! Reproducible record of a rendered sequence.
//!
//! A [`Seed`] captures everything needed to regenerate a video frame for
//! frame: engine name, frame dimensions, parameter overrides, PRNG seed,
//! frame count, and playback rate.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Playback rate used when a record does not name one.
pub const DEFAULT_FPS: u32 = 30;

fn default_fps() -> u32 {
    DEFAULT_FPS
}

/// Reproducible record of a rendered sequence.
///
/// Two identical `Seed` values fed to the same binary produce bit-identical
/// frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub frames: u64,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Seed {
    /// Creates a new Seed with empty params, zero frames, and the default fps.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            frames: 0,
            fps: DEFAULT_FPS,
        }
    }

    /// Validates dimensions (non-zero, no `width * height` overflow) and fps.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if self.fps == 0 {
            return Err(EngineError::InvalidConfig("fps must be non-zero".into()));
        }
        Ok(())
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.fps)
    }
}

/// Number of frames in a clip of `seconds` at `fps`.
pub fn duration_frames(seconds: u64, fps: u32) -> u64 {
    seconds.saturating_mul(u64::from(fps))
}
