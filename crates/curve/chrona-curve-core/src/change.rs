//! Change notifications emitted by curve mutations.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ids::CurveId;
use crate::time::SimTime;

/// "Curve `curve` was written at `time`."
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveChange {
    pub curve: CurveId,
    pub time: SimTime,
}

/// Shared, single-threaded buffer of pending [`CurveChange`]s.
///
/// Cloning yields another handle to the same buffer. Curves record into it; the
/// scheduler drains it and reschedules dependents.
#[derive(Clone, Debug, Default)]
pub struct ChangeSink {
    pending: Rc<RefCell<Vec<CurveChange>>>,
}

impl ChangeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, change: CurveChange) {
        self.pending.borrow_mut().push(change);
    }

    /// Takes every pending change in recording order.
    pub fn drain(&self) -> Vec<CurveChange> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// True when both handles share one buffer.
    pub fn same_as(&self, other: &ChangeSink) -> bool {
        Rc::ptr_eq(&self.pending, &other.pending)
    }
}
