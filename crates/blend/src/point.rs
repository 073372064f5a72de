//! Motion model: colored points drifting inside the frame and bouncing off
//! its edges.
//!
//! Positions use `glam::DVec2` with `x` as the column and `y` as the row.
//! The legal region is the closed box `[0, width] × [0, height]`; the far
//! edge is included so that a point may sit exactly on it.

use chromafield_core::prng::Xorshift64;
use glam::DVec2;

/// A moving color emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    position: DVec2,
    velocity: DVec2,
    color: [f64; 3],
}

/// Which axes were clamped during a single [`Point::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflection {
    pub row: bool,
    pub col: bool,
}

impl Reflection {
    /// True if either axis hit a wall.
    pub fn any(self) -> bool {
        self.row || self.col
    }
}

impl Point {
    /// Creates a point from explicit `(row, col)` position, `(row, col)`
    /// velocity, and RGB color.
    pub fn new(position: (f64, f64), velocity: (f64, f64), color: [f64; 3]) -> Self {
        Self {
            position: DVec2::new(position.1, position.0),
            velocity: DVec2::new(velocity.1, velocity.0),
            color,
        }
    }

    /// Draws a random point for a `width × height` frame.
    ///
    /// Row and column are uniform integers over `0..=height` and `0..=width`.
    /// Each color channel is uniform in `[0, 1)`. Each velocity component is
    /// `uniform(0, 1) * evolution_rate`, so both start non-negative and only
    /// change sign by reflection.
    ///
    /// Draw order is row, col, red, green, blue, row speed, col speed.
    pub fn random(width: usize, height: usize, evolution_rate: f64, rng: &mut Xorshift64) -> Self {
        let row = rng.next_inclusive(height) as f64;
        let col = rng.next_inclusive(width) as f64;
        let color = [rng.next_f64(), rng.next_f64(), rng.next_f64()];
        let row_speed = rng.next_f64() * evolution_rate;
        let col_speed = rng.next_f64() * evolution_rate;
        Self::new((row, col), (row_speed, col_speed), color)
    }

    /// Current row coordinate.
    pub fn row(&self) -> f64 {
        self.position.y
    }

    /// Current column coordinate.
    pub fn col(&self) -> f64 {
        self.position.x
    }

    /// Position as a vector (`x` = column, `y` = row).
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Velocity as a vector (`x` = column, `y` = row).
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// RGB color, fixed for the point's lifetime.
    pub fn color(&self) -> [f64; 3] {
        self.color
    }

    /// Moves the point by one tick and reflects it off the walls of
    /// `[0, bounds.x] × [0, bounds.y]`.
    ///
    /// Each axis is handled on its own: the lower wall is checked first, then
    /// the upper wall. An overshoot is clamped onto the wall and the velocity
    /// component on that axis is negated. Speed magnitude is never changed.
    pub fn step(&mut self, bounds: DVec2) -> Reflection {
        self.position += self.velocity;
        let mut hit = [false; 2];
        for (axis, flag) in hit.iter_mut().enumerate() {
            if self.position[axis] < 0.0 {
                self.position[axis] = 0.0;
                self.velocity[axis] = -self.velocity[axis];
                *flag = true;
            }
            if self.position[axis] > bounds[axis] {
                self.position[axis] = bounds[axis];
                self.velocity[axis] = -self.velocity[axis];
                *flag = true;
            }
        }
        Reflection {
            col: hit[0],
            row: hit[1],
        }
    }
}

/// Owns the point set for a run and advances it once per tick.
#[derive(Debug, Clone)]
pub struct MotionModel {
    bounds: DVec2,
    points: Vec<Point>,
}

impl MotionModel {
    /// Spawns `count` random points for a `width × height` frame.
    pub fn random(
        width: usize,
        height: usize,
        count: usize,
        evolution_rate: f64,
        rng: &mut Xorshift64,
    ) -> Self {
        let points = (0..count)
            .map(|_| Point::random(width, height, evolution_rate, rng))
            .collect();
        Self::from_points(width, height, points)
    }

    /// Wraps an explicit point set.
    pub fn from_points(width: usize, height: usize, points: Vec<Point>) -> Self {
        Self {
            bounds: DVec2::new(width as f64, height as f64),
            points,
        }
    }

    /// Read-only snapshot of the current points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Walls as a vector (`x` = width, `y` = height).
    pub fn bounds(&self) -> DVec2 {
        self.bounds
    }

    /// Advances every point one tick. Returns how many points bounced.
    pub fn advance(&mut self) -> usize {
        advance(&mut self.points, self.bounds)
    }
}

/// Advances every point in `points` one tick inside `bounds`.
///
/// Returns the number of points that touched a wall.
pub fn advance(points: &mut [Point], bounds: DVec2) -> usize {
    points
        .iter_mut()
        .map(|p| p.step(bounds))
        .filter(|r| r.any())
        .count()
}
