//! Precomputed Euclidean distance table.
//!
//! For a `width × height` frame the table is `2·width × 2·height` and holds
//! the distance from each cell to its center `(height, width)`. Any point
//! inside `[0, height] × [0, width]` can read its per-pixel distances as a
//! `width × height` window anchored at `(floor(row), floor(col))`, which
//! replaces a square root per point per pixel per frame with a slice read.

use chromafield_core::error::EngineError;
use tracing::debug;

use crate::point::Point;

/// Read-only `(2·height) × (2·width)` table of distances to the center.
#[derive(Debug, Clone)]
pub struct DistanceField {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl DistanceField {
    /// Builds the table for a `width × height` frame.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero or
    /// the doubled table size overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let cols = width.checked_mul(2).ok_or(EngineError::InvalidDimensions)?;
        let rows = height.checked_mul(2).ok_or(EngineError::InvalidDimensions)?;
        let len = cols.checked_mul(rows).ok_or(EngineError::InvalidDimensions)?;

        let cy = height as f64;
        let cx = width as f64;
        let mut data = Vec::with_capacity(len);
        for r in 0..rows {
            let dy = r as f64 - cy;
            data.extend((0..cols).map(|c| {
                let dx = c as f64 - cx;
                (dy * dy + dx * dx).sqrt()
            }));
        }
        debug!(width, height, cells = len, "built distance field");

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width of the frame this table serves (the table is twice as wide).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the frame this table serves (the table is twice as tall).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns in the table.
    pub fn stride(&self) -> usize {
        self.width * 2
    }

    /// Read-only access to the row-major table.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Distance stored at table cell `(row, col)`, or `None` outside the table.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height * 2 || col >= self.stride() {
            return None;
        }
        Some(self.data[row * self.stride() + col])
    }

    /// Window origin for `point`: `(floor(row), floor(col))` clamped to
    /// `[0, height] × [0, width]`.
    ///
    /// Clamping keeps the window inside the table even for points built by
    /// hand outside the legal region; NaN coordinates anchor at 0.
    pub fn anchor(&self, point: &Point) -> (usize, usize) {
        let row = (point.row().floor().max(0.0) as usize).min(self.height);
        let col = (point.col().floor().max(0.0) as usize).min(self.width);
        (row, col)
    }

    /// Row `i` of the `width`-long window anchored at `anchor`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= height` or the anchor lies outside
    /// `[0, height] × [0, width]`.
    pub fn window_row(&self, anchor: (usize, usize), i: usize) -> &[f64] {
        assert!(i < self.height, "window row {i} out of range");
        let start = (anchor.0 + i) * self.stride() + anchor.1;
        &self.data[start..start + self.width]
    }
}
