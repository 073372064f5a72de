//! The core `Engine` trait that every frame generator implements.
//!
//! The trait is object-safe so engines can be used as `dyn Engine` by the
//! registry and the CLI without knowing the concrete simulation type.

use crate::error::EngineError;
use crate::frame::Frame;
use serde_json::Value;

/// Core trait for tick-based frame generators.
///
/// Each call to [`step`](Engine::step) advances the simulation by one tick
/// and fully recomputes the [`Frame`] returned by [`frame`](Engine::frame).
/// The host loop decides how many ticks run and may stop between any two.
///
/// This trait is **object-safe**: you can use `Box<dyn Engine>` or `&dyn Engine`
/// for runtime polymorphism.
pub trait Engine {
    /// Advance the simulation by one tick and render the resulting frame.
    fn step(&mut self) -> Result<(), EngineError>;

    /// The most recently rendered frame. Black before the first step.
    fn frame(&self) -> &Frame;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Number of ticks executed so far.
    ///
    /// Returns `0` by default for engines that do not keep a counter.
    fn ticks(&self) -> u64 {
        0
    }
}
