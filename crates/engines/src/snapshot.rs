//! CPU-side PNG output of a [`Frame`].
//!
//! Feature-gated behind `png` (default on) so the registry can be used
//! without pulling in the `image` crate. The byte conversion itself lives in
//! [`crate::pixel`].

use chromafield_core::error::EngineError;
use chromafield_core::frame::Frame;
use std::path::Path;

use crate::pixel::frame_to_rgb8;

/// Writes a frame as an 8-bit RGB PNG.
///
/// Returns `EngineError::InvalidDimensions` if the frame dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(frame: &Frame, path: &Path) -> Result<(), EngineError> {
    let rgb = frame_to_rgb8(frame);
    let w = u32::try_from(frame.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(frame.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbImage::from_raw(w, h, rgb)
        .ok_or_else(|| EngineError::Io("RGB buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| EngineError::Io(format!("failed to write '{}': {e}", path.display())))
}
