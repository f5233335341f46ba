//! Per-advance reports and the optional invocation trace.

use chrona_curve::SimTime;
use serde::{Deserialize, Serialize};

use crate::instance::InstanceId;
use crate::target::EventTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvokeOutcome {
    Completed,
    Stale,
    Failed,
    /// Target no longer alive; `invoke` was not called.
    Dropped,
}

/// One firing, as seen by a replay comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub instance: InstanceId,
    pub class: String,
    pub target: EventTarget,
    pub time: SimTime,
    pub outcome: InvokeOutcome,
}

/// Summary of one [`EventLoop::advance`](crate::EventLoop::advance) call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub reached: SimTime,
    /// `invoke` calls, whatever their outcome.
    pub invoked: usize,
    pub stale: usize,
    pub failed: usize,
    pub dropped: usize,
    /// Instances re-evaluated because a dependency changed.
    pub rescheduled: usize,
}

impl AdvanceReport {
    pub fn new(reached: SimTime) -> Self {
        Self {
            reached,
            ..Default::default()
        }
    }

    pub fn completed(&self) -> usize {
        self.invoked - self.stale - self.failed
    }

    pub fn record(&mut self, outcome: InvokeOutcome) {
        match outcome {
            InvokeOutcome::Completed => self.invoked += 1,
            InvokeOutcome::Stale => {
                self.invoked += 1;
                self.stale += 1;
            }
            InvokeOutcome::Failed => {
                self.invoked += 1;
                self.failed += 1;
            }
            InvokeOutcome::Dropped => self.dropped += 1,
        }
    }

    /// Folds a later report into this one.
    pub fn merge(&mut self, other: &AdvanceReport) {
        self.reached = self.reached.max(other.reached);
        self.invoked += other.invoked;
        self.stale += other.stale;
        self.failed += other.failed;
        self.dropped += other.dropped;
        self.rescheduled += other.rescheduled;
    }
}
