#![deny(unsafe_code)]
//! Core types and traits for the chromafield frame generator.
//!
//! Provides the `Engine` trait, the RGB `Frame` buffer, `EngineError`,
//! the `Xorshift64` PRNG, the reproducible `Seed` run record, and parameter
//! helpers.

pub mod engine;
pub mod error;
pub mod frame;
pub mod params;
pub mod prng;
pub mod seed;

pub use engine::Engine;
pub use error::EngineError;
pub use frame::Frame;
pub use prng::Xorshift64;
pub use seed::Seed;
