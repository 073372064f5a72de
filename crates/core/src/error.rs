//! Error types for the chromafield core.

use thiserror::Error;

/// Errors produced by engine, renderer, and sink operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or their product overflowed) when creating a frame or field.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// Two buffers had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// No engine is registered under the given name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A filesystem write or read failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// The video encoder could not be started or rejected a frame.
    #[error("encoder error: {0}")]
    Encode(String),
}
