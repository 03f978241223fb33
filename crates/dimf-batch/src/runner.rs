//! Batch execution driver.
//!
//! Drives parsed task records through the optimization engine, sequentially
//! or across a bounded rayon pool. Exactly one batch may run per monitor at
//! a time; the running flag is claimed up front and released by a scope
//! guard on every exit path. Cancellation is cooperative: in-flight engine
//! iterations only observe it through the composed continuation policy, and
//! the driver observes it at task boundaries.

use std::sync::Arc;

use chrono::Utc;
use crossbeam_channel::Sender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dimf_types::{
    BatchError, BatchOptimizationParams, ContinuationPolicy, FitObserver, NullFitObserver,
    OptimizationEngine,
};

use crate::monitor::CancellationMonitor;
use crate::policy::{CancellationGuard, ImfSchedulePolicy, RunToConvergence, StepLimitPolicy};
use crate::progress::{ProgressAggregator, ProgressSink, TaskProgress};
use crate::report::{BatchEvent, BatchReport, TaskOutcome};

/// Whether records run one after another or across the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

/// Orchestrates one cancellable batch of optimization tasks.
pub struct BatchRunner {
    engine: Arc<dyn OptimizationEngine>,
    monitor: CancellationMonitor,
    mode: ExecutionMode,
    pool_size: usize,
    fit_observer: Arc<dyn FitObserver>,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn OptimizationEngine>) -> Self {
        let pool_size = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            engine,
            monitor: CancellationMonitor::new(),
            mode: ExecutionMode::Sequential,
            pool_size,
            fit_observer: Arc::new(NullFitObserver),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the worker pool size. The pool is built per batch and is
    /// not resized while it runs.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_fit_observer(mut self, observer: Arc<dyn FitObserver>) -> Self {
        self.fit_observer = observer;
        self
    }

    /// The shared state handle; the UI-facing trigger uses it to request
    /// cancellation and to observe whether a batch is active.
    pub fn monitor(&self) -> &CancellationMonitor {
        &self.monitor
    }

    /// Run the whole batch to a terminal state, blocking the caller.
    ///
    /// Fails fast with [`BatchError::AlreadyRunning`] when a batch is
    /// active on this runner's monitor. Engine failures are isolated per
    /// task and surface in the report rather than aborting the batch.
    pub fn run_batch(
        &self,
        records: Vec<BatchOptimizationParams>,
        sink: Arc<dyn ProgressSink>,
        events: &Sender<BatchEvent>,
    ) -> Result<BatchReport, BatchError> {
        let _guard = self.monitor.try_begin()?;
        let started_at = Utc::now();
        let total = records.len();
        let aggregator = ProgressAggregator::new(sink, total);

        info!(total, mode = ?self.mode, "starting optimization batch");
        let outcomes = match self.mode {
            ExecutionMode::Sequential => self.run_sequential(records, &aggregator, events),
            ExecutionMode::Parallel => self.run_parallel(records, &aggregator, events)?,
        };

        let cancelled = self.monitor.is_cancelled();
        if cancelled {
            warn!("optimization batch cancelled");
            let _ = events.try_send(BatchEvent::Cancelled);
        } else {
            info!("all optimization runs finished");
            let _ = events.try_send(BatchEvent::AllFinished);
        }

        Ok(BatchReport {
            id: Uuid::new_v4(),
            outcomes,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Run the batch on a dedicated background thread so the triggering
    /// context is never blocked by long-running numeric work.
    pub fn spawn_batch(
        self: &Arc<Self>,
        records: Vec<BatchOptimizationParams>,
        sink: Arc<dyn ProgressSink>,
        events: Sender<BatchEvent>,
    ) -> std::thread::JoinHandle<Result<BatchReport, BatchError>> {
        let runner = Arc::clone(self);
        std::thread::spawn(move || runner.run_batch(records, sink, &events))
    }

    fn run_sequential(
        &self,
        records: Vec<BatchOptimizationParams>,
        aggregator: &Arc<ProgressAggregator>,
        events: &Sender<BatchEvent>,
    ) -> Vec<TaskOutcome> {
        let total = records.len();
        let mut outcomes = vec![TaskOutcome::Skipped; total];

        for (index, record) in records.into_iter().enumerate() {
            let _ = events.try_send(BatchEvent::TaskStarted { index, total });
            debug!(index, total, "task starting");

            outcomes[index] = self.run_one(index, &record, aggregator.handle(index), events);

            // Inter-task boundary: stop before the next record starts.
            if self.monitor.is_cancelled() {
                break;
            }
        }
        outcomes
    }

    fn run_parallel(
        &self,
        records: Vec<BatchOptimizationParams>,
        aggregator: &Arc<ProgressAggregator>,
        events: &Sender<BatchEvent>,
    ) -> Result<Vec<TaskOutcome>, BatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.pool_size)
            .build()
            .map_err(|e| BatchError::PoolBuild(e.to_string()))?;

        let total = records.len();
        let (tx, rx) = crossbeam_channel::unbounded();

        pool.scope(|scope| {
            for (index, record) in records.into_iter().enumerate() {
                let tx = tx.clone();
                let handle = aggregator.handle(index);
                let token = self.monitor.cancel_token();
                scope.spawn(move |_| {
                    // Units that only get pool time after cancellation
                    // never start their engine call.
                    if token.is_cancelled() {
                        let _ = tx.send((index, TaskOutcome::Skipped));
                        return;
                    }
                    let _ = events.try_send(BatchEvent::TaskStarted { index, total });
                    let outcome = self.run_one(index, &record, handle, events);
                    let _ = tx.send((index, outcome));
                });
            }
        });
        drop(tx);

        // Join barrier: the scope above already waited for every unit; the
        // channel now holds one outcome per submitted record.
        let mut outcomes = vec![TaskOutcome::Skipped; total];
        for (index, outcome) in rx.try_iter() {
            outcomes[index] = outcome;
        }
        Ok(outcomes)
    }

    fn run_one(
        &self,
        index: usize,
        record: &BatchOptimizationParams,
        progress: TaskProgress,
        events: &Sender<BatchEvent>,
    ) -> TaskOutcome {
        let mut policy = self.build_policy(record, progress);
        match self
            .engine
            .optimize(index, record, policy.as_mut(), self.fit_observer.as_ref())
        {
            Ok(cost) => {
                debug!(index, cost, "task finished");
                let _ = events.try_send(BatchEvent::TaskFinished { index, cost });
                TaskOutcome::Completed { cost }
            }
            Err(e) => {
                warn!(index, error = %e, "task failed");
                let _ = events.try_send(BatchEvent::TaskFailed {
                    index,
                    error: e.to_string(),
                });
                TaskOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Compose the task's continuation policy: schedule table when present,
    /// else the step ceiling, else run to convergence; always wrapped with
    /// the cancellation check so external cancellation wins.
    fn build_policy(
        &self,
        record: &BatchOptimizationParams,
        progress: TaskProgress,
    ) -> Box<dyn ContinuationPolicy> {
        let token = self.monitor.cancel_token();
        if !record.imf_optimizations.is_empty() {
            Box::new(CancellationGuard::new(
                ImfSchedulePolicy::new(&record.imf_optimizations).with_progress(progress),
                token,
            ))
        } else if let Some(limit) = record.step_limit {
            Box::new(CancellationGuard::new(
                StepLimitPolicy::new(limit).with_progress(progress),
                token,
            ))
        } else {
            Box::new(CancellationGuard::new(RunToConvergence, token))
        }
    }
}
