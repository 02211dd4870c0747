//! Shared types and models for the Agro Karfi field platform
//!
//! This crate contains the pure, synchronous parts of the system (coordinates,
//! polygon capture, defaults and metric derivation) shared between the async
//! engine and the browser bindings (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
