//! # dimf-types
//!
//! Core types for dimf batch optimization: task parameter records, the
//! boundary traits toward the optimization engine and the sample loader,
//! and the shared error taxonomy.

pub mod engine;
pub mod errors;
pub mod params;

pub use engine::*;
pub use errors::*;
pub use params::*;
