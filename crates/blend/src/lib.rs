#![deny(unsafe_code)]
//! Distance-weighted color blending of moving points.
//!
//! A handful of colored points drift across the frame and bounce off its
//! edges ([`point`]). Every tick the whole frame is recomputed by blending the
//! point colors, each weighted by its distance to the pixel, and folding the
//! result into repeating bands ([`render`]). Distances come from a table built
//! once per run ([`distance`]). [`Simulation`] ties the pieces together behind
//! the [`Engine`](chromafield_core::Engine) trait.

pub mod distance;
pub mod point;
pub mod render;
pub mod simulation;

pub use distance::DistanceField;
pub use point::{advance, MotionModel, Point, Reflection};
pub use render::{render, render_into, FieldRenderer, RenderStats};
pub use simulation::{Simulation, SimulationConfig};
