//! Hand-off of external inputs to the simulation thread.
//!
//! Producers (input devices, network) push from any thread. The simulation
//! drains the queue at the start of a tick and turns each item into curve writes,
//! so inputs become ordinary mutations on the simulation thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable multi-producer FIFO.
#[derive(Debug)]
pub struct InputQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for InputQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for InputQueue<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl<T> InputQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still guards a consistent deque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
