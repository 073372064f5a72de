#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides the
//! output side (8-bit conversion, PNG snapshots, frame sinks).
//!
//! This crate sits between `chromafield-core` (which defines the `Engine`
//! trait) and the engine crates (`chromafield-blend`). The CLI depends on it
//! so that name dispatch and output plumbing live in one place.

pub mod ffmpeg;
pub mod pixel;
pub mod sink;

#[cfg(feature = "png")]
pub mod snapshot;

use chromafield_core::error::EngineError;
use chromafield_core::frame::Frame;
use chromafield_core::Engine;
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["blend"];

/// Enumeration of all available frame generators.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Distance-weighted color blending of moving points.
    Blend(chromafield_blend::Simulation),
}

impl EngineKind {
    /// Constructs an engine by name.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        match name {
            "blend" => {
                chromafield_blend::SimulationConfig::check_overrides(params)?;
                Ok(EngineKind::Blend(chromafield_blend::Simulation::from_json(
                    width, height, seed, params,
                )?))
            }
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Blend(e) => e.step(),
        }
    }

    fn frame(&self) -> &Frame {
        match self {
            EngineKind::Blend(e) => e.frame(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Blend(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Blend(e) => e.param_schema(),
        }
    }

    fn ticks(&self) -> u64 {
        match self {
            EngineKind::Blend(e) => e.ticks(),
        }
    }
}
