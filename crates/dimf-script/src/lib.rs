//! # dimf-script
//!
//! Interpreter for the dimf batch configuration script: a plain-text,
//! one-command-per-line DSL that builds an ordered list of
//! [`dimf_types::BatchOptimizationParams`] records.
//!
//! ```text
//! set swarmSize 200
//! set angleDevDegs 120
//! add_preprocessing_step low_pass 2
//! load_samples data/effler_fp1_10sec1.asc
//! new_task
//! ```

mod distance;
mod parser;
mod registry;

pub use parser::ScriptParser;
pub use registry::FieldRegistry;
