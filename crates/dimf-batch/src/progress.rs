//! Progress aggregation across the tasks of one batch.
//!
//! Sinks are dependency-injected into the batch runner; there is no global
//! progress registration. The aggregator maps "unit i of n is at local
//! fraction p" to the overall fraction (i + p) / n and guarantees both the
//! per-task and the overall fraction are non-decreasing.

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

/// Destination for progress fractions. Implementations must be cheap and
/// non-blocking; they are called from worker threads.
pub trait ProgressSink: Send + Sync {
    /// Local fraction in [0, 1] for one task.
    fn task_progress(&self, task_index: usize, fraction: f64);
    /// Aggregated fraction in [0, 1] across the whole batch.
    fn overall_progress(&self, fraction: f64);
}

/// A single progress reading, as emitted by [`ChannelProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate {
    Task { index: usize, fraction: f64 },
    Overall { fraction: f64 },
}

/// Sink that forwards readings over a channel, best effort: a dropped
/// receiver loses updates but never blocks or fails a worker.
pub struct ChannelProgressSink {
    tx: Sender<ProgressUpdate>,
}

impl ChannelProgressSink {
    pub fn new(tx: Sender<ProgressUpdate>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn task_progress(&self, task_index: usize, fraction: f64) {
        let _ = self.tx.try_send(ProgressUpdate::Task {
            index: task_index,
            fraction,
        });
    }

    fn overall_progress(&self, fraction: f64) {
        let _ = self.tx.try_send(ProgressUpdate::Overall { fraction });
    }
}

/// Sink that drops every reading.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn task_progress(&self, _task_index: usize, _fraction: f64) {}
    fn overall_progress(&self, _fraction: f64) {}
}

/// Per-batch aggregator. One slot per task; updating a slot recomputes the
/// overall fraction and forwards both readings to the sink under the slot
/// lock, so readings arrive in monotone order.
pub struct ProgressAggregator {
    sink: Arc<dyn ProgressSink>,
    slots: Mutex<Vec<f64>>,
}

impl ProgressAggregator {
    pub fn new(sink: Arc<dyn ProgressSink>, task_count: usize) -> Arc<Self> {
        Arc::new(Self {
            sink,
            slots: Mutex::new(vec![0.0; task_count]),
        })
    }

    /// Handle owning slot `task_index`, to be moved into that unit of work.
    pub fn handle(self: &Arc<Self>, task_index: usize) -> TaskProgress {
        TaskProgress {
            aggregator: Arc::clone(self),
            task_index,
        }
    }

    fn update(&self, task_index: usize, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let mut slots = self.slots.lock();
        if fraction <= slots[task_index] {
            return;
        }
        slots[task_index] = fraction;
        let overall = slots.iter().sum::<f64>() / slots.len() as f64;
        self.sink.task_progress(task_index, fraction);
        self.sink.overall_progress(overall);
    }
}

/// Progress handle for one task. Reports are clamped non-decreasing.
pub struct TaskProgress {
    aggregator: Arc<ProgressAggregator>,
    task_index: usize,
}

impl TaskProgress {
    pub fn report(&self, fraction: f64) {
        self.aggregator.update(self.task_index, fraction);
    }
}
