//! Continuation policies consulted by the engine every iteration.
//!
//! The schedule policy maps a flat global iteration counter onto the
//! per-IMF step table with a binary search over cumulative boundaries.
//! Boundary semantics are upper-bound: the active entry for iteration `i`
//! is the first one whose cumulative boundary is strictly greater than `i`,
//! so a boundary of 10 covers iterations 0 through 9.

use dimf_types::{Continuation, ContinuationPolicy, PhaseSteps};

use crate::monitor::CancelToken;
use crate::progress::TaskProgress;

/// Stops once the configured iteration ceiling is reached.
pub struct StepLimitPolicy {
    limit: u64,
    progress: Option<TaskProgress>,
}

impl StepLimitPolicy {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: TaskProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl ContinuationPolicy for StepLimitPolicy {
    fn decide(&mut self, iteration: u64) -> Continuation {
        if iteration >= self.limit {
            if let Some(progress) = &self.progress {
                progress.report(1.0);
            }
            return Continuation::Halt;
        }
        if let Some(progress) = &self.progress {
            progress.report((iteration + 1) as f64 / self.limit as f64);
        }
        Continuation::Proceed
    }
}

/// Never stops on its own; the engine runs until convergence.
pub struct RunToConvergence;

impl ContinuationPolicy for RunToConvergence {
    fn decide(&mut self, _iteration: u64) -> Continuation {
        Continuation::Proceed
    }
}

/// Schedule-driven policy: run each IMF of the table for its configured
/// step count, in order, then stop.
pub struct ImfSchedulePolicy {
    /// (IMF index, cumulative step boundary), boundaries strictly increasing.
    boundaries: Vec<(usize, u64)>,
    total_steps: u64,
    progress: Option<TaskProgress>,
}

impl ImfSchedulePolicy {
    pub fn new(schedule: &[PhaseSteps]) -> Self {
        let mut boundaries = Vec::with_capacity(schedule.len());
        let mut cumulative = 0u64;
        for entry in schedule {
            // Zero-step entries can never become active.
            if entry.steps == 0 {
                continue;
            }
            cumulative += entry.steps;
            boundaries.push((entry.imf_index, cumulative));
        }
        Self {
            boundaries,
            total_steps: cumulative,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: TaskProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl ContinuationPolicy for ImfSchedulePolicy {
    fn decide(&mut self, iteration: u64) -> Continuation {
        let position = self
            .boundaries
            .partition_point(|&(_, boundary)| boundary <= iteration);
        if position == self.boundaries.len() {
            if let Some(progress) = &self.progress {
                progress.report(1.0);
            }
            return Continuation::Halt;
        }
        if let Some(progress) = &self.progress {
            // Completed-step fraction: phase-start contribution plus the
            // position within the active phase, collapsed over the uniform
            // step grid. Always in (0, 1].
            progress.report((iteration + 1) as f64 / self.total_steps as f64);
        }
        Continuation::EnterImf(self.boundaries[position].0)
    }
}

/// Composes any policy with a cancellation check; cancellation wins over
/// whatever the inner policy would decide.
pub struct CancellationGuard<P> {
    inner: P,
    token: CancelToken,
}

impl<P: ContinuationPolicy> CancellationGuard<P> {
    pub fn new(inner: P, token: CancelToken) -> Self {
        Self { inner, token }
    }
}

impl<P: ContinuationPolicy> ContinuationPolicy for CancellationGuard<P> {
    fn decide(&mut self, iteration: u64) -> Continuation {
        if self.token.is_cancelled() {
            return Continuation::Halt;
        }
        self.inner.decide(iteration)
    }
}
