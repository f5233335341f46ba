//! Time-ordered schedule and the curve -> instance reverse index.

use std::collections::BTreeSet;

use chrona_curve::{CurveId, SimTime};
use hashbrown::HashMap;

use crate::instance::InstanceId;

/// Live instances ordered by `(scheduled_time, id)`. Equal times fire in
/// creation order, which keeps replays identical.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    entries: BTreeSet<(SimTime, InstanceId)>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, time: SimTime, id: InstanceId) -> bool {
        self.entries.insert((time, id))
    }

    pub fn remove(&mut self, time: SimTime, id: InstanceId) -> bool {
        self.entries.remove(&(time, id))
    }

    /// Earliest entry.
    pub fn peek(&self) -> Option<(SimTime, InstanceId)> {
        self.entries.first().copied()
    }

    /// Removes and returns the head if it is due at or before `until`.
    pub fn pop_due(&mut self, until: SimTime) -> Option<(SimTime, InstanceId)> {
        match self.peek() {
            Some(head) if head.0 <= until => self.entries.pop_first(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SimTime, InstanceId)> + '_ {
        self.entries.iter().copied()
    }
}

/// Which instances depend on which curve.
#[derive(Clone, Debug, Default)]
pub struct DependencyIndex {
    by_curve: HashMap<CurveId, BTreeSet<InstanceId>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<'a>(&mut self, id: InstanceId, curves: impl IntoIterator<Item = &'a CurveId>) {
        for curve in curves {
            self.by_curve.entry(*curve).or_default().insert(id);
        }
    }

    pub fn unregister<'a>(&mut self, id: InstanceId, curves: impl IntoIterator<Item = &'a CurveId>) {
        for curve in curves {
            if let Some(set) = self.by_curve.get_mut(curve) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_curve.remove(curve);
                }
            }
        }
    }

    /// Dependents of `curve` in id order.
    pub fn dependents_of(&self, curve: CurveId) -> impl Iterator<Item = InstanceId> + '_ {
        self.by_curve.get(&curve).into_iter().flatten().copied()
    }

    pub fn curves(&self) -> usize {
        self.by_curve.len()
    }
}
