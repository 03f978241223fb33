//! Batch lifecycle events and the aggregated run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique batch run identifier.
pub type BatchId = Uuid;

/// Lifecycle notifications emitted while a batch runs, for UI-facing
/// consumption (status lines, transient "finished" toasts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Announced before a task starts: "task index+1 of total".
    TaskStarted { index: usize, total: usize },
    TaskFinished { index: usize, cost: f64 },
    TaskFailed { index: usize, error: String },
    /// Terminal: the batch stopped because cancellation was requested.
    Cancelled,
    /// Terminal: every task ran to completion.
    AllFinished,
}

/// How one task ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Completed { cost: f64 },
    Failed { error: String },
    /// Never started because the batch was cancelled first.
    Skipped,
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: BatchId,
    /// One outcome per input record, in input order.
    pub outcomes: Vec<TaskOutcome>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn completed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Completed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Failed { .. }))
            .count()
    }

    /// True when every record completed and nothing was cancelled.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.completed_count() == self.outcomes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<TaskOutcome>, cancelled: bool) -> BatchReport {
        let now = Utc::now();
        BatchReport {
            id: Uuid::new_v4(),
            outcomes,
            cancelled,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn counts_and_cleanliness() {
        let r = report(
            vec![
                TaskOutcome::Completed { cost: 0.5 },
                TaskOutcome::Failed {
                    error: "diverged".into(),
                },
                TaskOutcome::Skipped,
            ],
            false,
        );
        assert_eq!(r.completed_count(), 1);
        assert_eq!(r.failed_count(), 1);
        assert!(!r.is_clean());

        let clean = report(vec![TaskOutcome::Completed { cost: 0.1 }], false);
        assert!(clean.is_clean());

        let cancelled = report(vec![TaskOutcome::Completed { cost: 0.1 }], true);
        assert!(!cancelled.is_clean());
    }
}
