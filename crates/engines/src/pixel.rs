//! Conversion from a [`Frame`] to 8-bit pixel buffers.
//!
//! Each channel maps to `trunc(value * 255)`. Frame values lie in `[0, 1)`,
//! so bytes land in `0..=254`; values outside the range are clamped first.
//! This module is always available (no feature gate) so that the PNG and
//! ffmpeg sinks share one conversion.

use chromafield_core::frame::Frame;

/// Scales one channel to a byte by truncation.
pub fn channel_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Writes packed RGB8 bytes for `frame` into `dst`, which must hold
/// `width * height * 3` bytes.
///
/// Returns `false` without writing if `dst` has the wrong length.
pub fn write_rgb8(frame: &Frame, dst: &mut [u8]) -> bool {
    if dst.len() != frame.data().len() {
        return false;
    }
    dst.iter_mut()
        .zip(frame.data())
        .for_each(|(d, &v)| *d = channel_to_u8(v));
    true
}

/// Packed RGB8 buffer of length `width * height * 3`.
pub fn frame_to_rgb8(frame: &Frame) -> Vec<u8> {
    frame.data().iter().map(|&v| channel_to_u8(v)).collect()
}
