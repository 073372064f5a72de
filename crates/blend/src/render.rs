//! Field renderer: blends point colors across the frame using raw distance
//! as the weight.
//!
//! For every pixel the renderer computes
//!
//! ```text
//! channel_d = Σ_n color_n[d] · W_n        sum = Σ_n W_n
//! frame_d   = ((channel_d / sum) · multiplier) mod 1
//! ```
//!
//! where `W_n` is point `n`'s window into the [`DistanceField`]: the distance
//! from each pixel to `(height - floor(row_n), width - floor(col_n))`, the
//! point's anchor reflected through the frame center. Raw distance is the
//! weight, so each color is strongest far from that reflected spot and fades
//! to nothing on it. The final `mod 1` folds the blend into repeating color
//! bands instead of saturating.
//!
//! A pixel whose weights are all zero (possible only where every point's
//! window reads exactly the table center) has no defined blend. It is
//! rendered black and counted in [`RenderStats::black_pixels`].

use chromafield_core::error::EngineError;
use chromafield_core::frame::{Frame, CHANNELS};

use crate::distance::DistanceField;
use crate::point::Point;

/// Per-call bookkeeping returned by the render functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Pixels whose total weight was zero and were written as black.
    pub black_pixels: usize,
}

/// Renderer that owns its distance table and weight scratch buffer so a
/// tick allocates nothing.
#[derive(Debug, Clone)]
pub struct FieldRenderer {
    distance: DistanceField,
    weights: Vec<f64>,
}

impl FieldRenderer {
    /// Builds the distance table for a `width × height` frame.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let distance = DistanceField::new(width, height)?;
        Ok(Self {
            weights: vec![0.0; width * height],
            distance,
        })
    }

    /// The distance table shared by every frame.
    pub fn distance_field(&self) -> &DistanceField {
        &self.distance
    }

    /// Overwrites `frame` with the banded blend of `points`.
    pub fn render_into(
        &mut self,
        points: &[Point],
        multiplier: f64,
        frame: &mut Frame,
    ) -> Result<RenderStats, EngineError> {
        let stats = blend(points, &self.distance, &mut self.weights, frame)?;
        apply_bands(frame, multiplier);
        Ok(stats)
    }

    /// Overwrites `frame` with the normalized blend of `points`, before the
    /// multiplier and `mod 1` are applied.
    ///
    /// Every value is a convex combination of the point colors.
    pub fn blend_into(
        &mut self,
        points: &[Point],
        frame: &mut Frame,
    ) -> Result<RenderStats, EngineError> {
        blend(points, &self.distance, &mut self.weights, frame)
    }
}

/// Renders one frame for `points` against `distance`.
///
/// Pure: the same inputs always produce bit-identical output.
pub fn render(
    points: &[Point],
    distance: &DistanceField,
    multiplier: f64,
) -> Result<Frame, EngineError> {
    let mut frame = Frame::new(distance.width(), distance.height())?;
    render_into(points, distance, multiplier, &mut frame)?;
    Ok(frame)
}

/// Renders into an existing frame, which must match the table's frame size.
pub fn render_into(
    points: &[Point],
    distance: &DistanceField,
    multiplier: f64,
    frame: &mut Frame,
) -> Result<RenderStats, EngineError> {
    let mut weights = vec![0.0; distance.width() * distance.height()];
    let stats = blend(points, distance, &mut weights, frame)?;
    apply_bands(frame, multiplier);
    Ok(stats)
}

/// Folds `value * multiplier` into `[0, 1)`.
///
/// Matches floored modulo for negative products. The rare `rem_euclid`
/// rounding to exactly `1.0` is mapped to `0.0`.
pub fn band(value: f64, multiplier: f64) -> f64 {
    let wrapped = (value * multiplier).rem_euclid(1.0);
    if wrapped >= 1.0 || wrapped.is_nan() {
        0.0
    } else {
        wrapped
    }
}

fn blend(
    points: &[Point],
    distance: &DistanceField,
    weights: &mut [f64],
    frame: &mut Frame,
) -> Result<RenderStats, EngineError> {
    let width = distance.width();
    let height = distance.height();
    frame.ensure_same_size(width, height)?;
    debug_assert_eq!(weights.len(), width * height);

    weights.fill(0.0);
    let out = frame.data_mut();
    out.fill(0.0);

    for point in points {
        let anchor = distance.anchor(point);
        let [r, g, b] = point.color();
        for i in 0..height {
            let window = distance.window_row(anchor, i);
            let sums = &mut weights[i * width..(i + 1) * width];
            let row = &mut out[i * width * CHANNELS..(i + 1) * width * CHANNELS];
            for ((&d, sum), px) in window
                .iter()
                .zip(sums.iter_mut())
                .zip(row.chunks_exact_mut(CHANNELS))
            {
                *sum += d;
                px[0] += r * d;
                px[1] += g * d;
                px[2] += b * d;
            }
        }
    }

    let mut stats = RenderStats::default();
    for (&sum, px) in weights.iter().zip(out.chunks_exact_mut(CHANNELS)) {
        if sum > 0.0 {
            px.iter_mut().for_each(|c| *c /= sum);
        } else {
            px.fill(0.0);
            stats.black_pixels += 1;
        }
    }
    Ok(stats)
}

fn apply_bands(frame: &mut Frame, multiplier: f64) {
    frame
        .data_mut()
        .iter_mut()
        .for_each(|c| *c = band(*c, multiplier));
}
