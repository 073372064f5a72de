//! Destinations for rendered frame sequences.
//!
//! A [`FrameSink`] accepts frames in order and is closed exactly once with
//! [`FrameSink::finish`]. Sinks check every frame against the dimensions they
//! were opened with.

use chromafield_core::error::EngineError;
use chromafield_core::frame::Frame;

/// Ordered consumer of rendered frames.
///
/// Object-safe, so the CLI can pick a sink at runtime as `Box<dyn FrameSink>`.
pub trait FrameSink {
    /// Appends one frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), EngineError>;

    /// Number of frames accepted so far.
    fn frames_written(&self) -> u64;

    /// Flushes and closes the sink.
    fn finish(self: Box<Self>) -> Result<(), EngineError>;
}

/// Fails unless `frame` is `width × height`.
pub(crate) fn check_frame(frame: &Frame, width: usize, height: usize) -> Result<(), EngineError> {
    frame.ensure_same_size(width, height)
}

#[cfg(feature = "png")]
pub use png_sequence::PngSequenceSink;

#[cfg(feature = "png")]
mod png_sequence {
    use super::{check_frame, FrameSink};
    use crate::snapshot::write_png;
    use chromafield_core::error::EngineError;
    use chromafield_core::frame::Frame;
    use std::path::PathBuf;
    use tracing::info;

    /// Writes each frame as `frame_00000.png`, `frame_00001.png`, … in a directory.
    pub struct PngSequenceSink {
        dir: PathBuf,
        width: usize,
        height: usize,
        written: u64,
    }

    impl PngSequenceSink {
        /// Creates `dir` (and parents) if needed.
        pub fn create(dir: impl Into<PathBuf>, width: usize, height: usize) -> Result<Self, EngineError> {
            let dir = dir.into();
            std::fs::create_dir_all(&dir).map_err(|e| {
                EngineError::Io(format!("failed to create directory '{}': {e}", dir.display()))
            })?;
            info!(dir = %dir.display(), width, height, "writing png sequence");
            Ok(Self {
                dir,
                width,
                height,
                written: 0,
            })
        }

        /// Path the frame with index `index` is written to.
        pub fn frame_path(&self, index: u64) -> PathBuf {
            self.dir.join(format!("frame_{index:05}.png"))
        }
    }

    impl FrameSink for PngSequenceSink {
        fn write_frame(&mut self, frame: &Frame) -> Result<(), EngineError> {
            check_frame(frame, self.width, self.height)?;
            write_png(frame, &self.frame_path(self.written))?;
            self.written += 1;
            Ok(())
        }

        fn frames_written(&self) -> u64 {
            self.written
        }

        fn finish(self: Box<Self>) -> Result<(), EngineError> {
            info!(dir = %self.dir.display(), frames = self.written, "png sequence complete");
            Ok(())
        }
    }
}
