//! # dimf-batch
//!
//! Batch execution orchestration for dimf optimization tasks: shared
//! cancellation state, per-task continuation policies, progress
//! aggregation, and the sequential/parallel batch driver.

mod monitor;
mod policy;
mod progress;
mod report;
mod runner;

pub use monitor::{BatchState, CancelToken, CancellationMonitor, RunGuard};
pub use policy::{CancellationGuard, ImfSchedulePolicy, RunToConvergence, StepLimitPolicy};
pub use progress::{
    ChannelProgressSink, NullProgressSink, ProgressAggregator, ProgressSink, ProgressUpdate,
    TaskProgress,
};
pub use report::{BatchEvent, BatchId, BatchReport, TaskOutcome};
pub use runner::{BatchRunner, ExecutionMode};

use std::sync::Arc;

use crossbeam_channel::Sender;
use dimf_script::ScriptParser;
use dimf_types::{DimfResult, SampleLoader};

/// Parse a configuration script and run the resulting batch in one call.
pub fn run_script_batch(
    script: &str,
    loader: &dyn SampleLoader,
    runner: &BatchRunner,
    sink: Arc<dyn ProgressSink>,
    events: &Sender<BatchEvent>,
) -> DimfResult<BatchReport> {
    let records = ScriptParser::new(loader).parse(script)?;
    Ok(runner.run_batch(records, sink, events)?)
}
