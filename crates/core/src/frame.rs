//! Row-major RGB frame buffer.
//!
//! A `Frame` stores `height * width * 3` f64 channel intensities, pixel by
//! pixel, with the three channels of each pixel adjacent (R, G, B). Row 0 is
//! the top of the image. Coordinates are `(row, col)` and are not wrapped:
//! out-of-range access is reported as an error or `None`.

use crate::error::EngineError;

/// Number of color channels per pixel.
pub const CHANNELS: usize = 3;

/// A `height × width × 3` buffer of RGB intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Frame {
    /// Creates a black frame of the given dimensions.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height * 3` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the interleaved RGB data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the interleaved RGB data.
    ///
    /// Renderers overwrite the whole buffer each tick through this slice.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Returns the RGB triple at `(row, col)`, or `None` when out of range.
    pub fn pixel(&self, row: usize, col: usize) -> Option<[f64; CHANNELS]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row * self.width + col) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Writes the RGB triple at `(row, col)`.
    ///
    /// Returns `EngineError::DimensionMismatch` when the coordinate lies
    /// outside the frame.
    pub fn set_pixel(
        &mut self,
        row: usize,
        col: usize,
        rgb: [f64; CHANNELS],
    ) -> Result<(), EngineError> {
        if row >= self.height || col >= self.width {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: col + 1,
                rhs_h: row + 1,
            });
        }
        let i = (row * self.width + col) * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&rgb);
        Ok(())
    }

    /// Sets every channel of every pixel to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Iterates over all pixels yielding `(row, col, [r, g, b])` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, [f64; CHANNELS])> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(|(i, px)| (i / self.width, i % self.width, [px[0], px[1], px[2]]))
    }

    /// Checks that the frame is exactly `width × height`.
    pub fn ensure_same_size(&self, width: usize, height: usize) -> Result<(), EngineError> {
        if self.width != width || self.height != height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: width,
                rhs_h: height,
            });
        }
        Ok(())
    }
}

fn buffer_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(EngineError::InvalidDimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_black_frame() {
        let frame = Frame::new(4, 3).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.data().len(), 36);
        assert!(frame.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn new_with_zero_dimension_returns_error() {
        assert!(matches!(
            Frame::new(0, 5),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(matches!(
            Frame::new(5, 0),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn new_with_overflow_dimensions_returns_error() {
        assert!(Frame::new(usize::MAX, 2).is_err());
        assert!(Frame::new(usize::MAX / 2, 1).is_err());
    }

    #[test]
    fn set_and_get_pixel() {
        let mut frame = Frame::new(4, 4).unwrap();
        frame.set_pixel(2, 3, [0.1, 0.2, 0.3]).unwrap();
        assert_eq!(frame.pixel(2, 3), Some([0.1, 0.2, 0.3]));
        assert_eq!(frame.pixel(3, 2), Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn pixel_out_of_range_is_none() {
        let frame = Frame::new(4, 2).unwrap();
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(0, 4), None);
    }

    #[test]
    fn set_pixel_out_of_range_is_error() {
        let mut frame = Frame::new(4, 2).unwrap();
        assert!(matches!(
            frame.set_pixel(2, 0, [1.0, 1.0, 1.0]),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn layout_is_row_major_interleaved() {
        let mut frame = Frame::new(3, 2).unwrap();
        frame.set_pixel(1, 2, [0.4, 0.5, 0.6]).unwrap();
        let i = (3 + 2) * CHANNELS;
        assert_eq!(&frame.data()[i..i + 3], &[0.4, 0.5, 0.6]);
    }

    #[test]
    fn fill_sets_all_channels() {
        let mut frame = Frame::new(2, 2).unwrap();
        frame.fill(0.25);
        assert!(frame.data().iter().all(|&v| v == 0.25));
    }

    #[test]
    fn pixels_iterates_in_row_major_order() {
        let mut frame = Frame::new(2, 2).unwrap();
        frame.set_pixel(0, 1, [1.0, 0.0, 0.0]).unwrap();
        frame.set_pixel(1, 0, [0.0, 1.0, 0.0]).unwrap();
        let px: Vec<_> = frame.pixels().collect();
        assert_eq!(px.len(), 4);
        assert_eq!(px[0], (0, 0, [0.0, 0.0, 0.0]));
        assert_eq!(px[1], (0, 1, [1.0, 0.0, 0.0]));
        assert_eq!(px[2], (1, 0, [0.0, 1.0, 0.0]));
        assert_eq!(px[3], (1, 1, [0.0, 0.0, 0.0]));
    }

    #[test]
    fn ensure_same_size_reports_mismatch() {
        let frame = Frame::new(8, 4).unwrap();
        assert!(frame.ensure_same_size(8, 4).is_ok());
        assert!(frame.ensure_same_size(4, 8).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_then_get_returns_written_pixel(
                w in 1_usize..=32,
                h in 1_usize..=32,
                row in 0_usize..32,
                col in 0_usize..32,
                r in 0.0_f64..1.0,
                g in 0.0_f64..1.0,
                b in 0.0_f64..1.0,
            ) {
                let mut frame = Frame::new(w, h).unwrap();
                let result = frame.set_pixel(row, col, [r, g, b]);
                if row < h && col < w {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(frame.pixel(row, col), Some([r, g, b]));
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(frame.pixel(row, col), None);
                }
            }
        }
    }
}
