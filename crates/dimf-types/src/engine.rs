//! Boundary traits toward the collaborators of the batch core.
//!
//! The optimization engine itself (a particle-swarm style fitter) and the
//! sample-file reader are black boxes to this workspace. The engine is
//! handed one parameter record plus a continuation policy it must consult
//! after every internal iteration, and reports best-fit snapshots through a
//! side-channel observer. It may be invoked concurrently from worker-pool
//! threads with independent records, so implementations must not share
//! mutable state across invocations.

use crate::errors::EngineError;
use crate::params::BatchOptimizationParams;

/// Verdict of a continuation policy for one engine iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Keep iterating in the current phase.
    Proceed,
    /// Keep iterating, refining the IMF with the given index.
    EnterImf(usize),
    /// Stop the task.
    Halt,
}

/// Per-task decision function consulted by the engine after each iteration.
///
/// Policies are stateful (progress bookkeeping) and owned by a single unit
/// of work; they are never shared across tasks.
pub trait ContinuationPolicy: Send {
    fn decide(&mut self, iteration: u64) -> Continuation;
}

/// Best-fit-so-far snapshot reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BestFit {
    /// Current best parameter vector.
    pub params: Vec<f64>,
    /// Cost of the best parameter vector.
    pub cost: f64,
    /// Number of samples the fit was evaluated against.
    pub n_samples: usize,
    /// Engine iteration at which this fit was found.
    pub iteration: u64,
    /// The fitted function sampled over the interval.
    pub imf: Vec<f64>,
}

/// Side channel for best-fit reports.
pub trait FitObserver: Send + Sync {
    fn best_fit(&self, task_index: usize, fit: &BestFit);
}

/// Observer that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFitObserver;

impl FitObserver for NullFitObserver {
    fn best_fit(&self, _task_index: usize, _fit: &BestFit) {}
}

/// The optimization engine boundary.
pub trait OptimizationEngine: Send + Sync {
    /// Run one task to completion, consulting `policy` every iteration and
    /// reporting best fits to `observer`. Returns the final cost.
    fn optimize(
        &self,
        task_index: usize,
        params: &BatchOptimizationParams,
        policy: &mut dyn ContinuationPolicy,
        observer: &dyn FitObserver,
    ) -> Result<f64, EngineError>;
}

/// Collaborator that reads a sample sequence from a path. The on-disk
/// format is owned by the implementation.
pub trait SampleLoader {
    fn load_samples(
        &self,
        path: &str,
    ) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>>;
}
