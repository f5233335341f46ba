use serde::{Deserialize, Serialize};

use crate::time::SimTime;

/// A single `(time, value)` fact. Immutable once it is part of a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<V> {
    pub time: SimTime,
    pub value: V,
}

impl<V> Keyframe<V> {
    pub fn new(time: SimTime, value: V) -> Self {
        Self { time, value }
    }
}

/// Position of a keyframe inside a [`Timeline`](crate::Timeline), tagged with the
/// timeline generation it was taken from. Any removal or mid-sequence insert
/// bumps the generation and turns older references stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyframeRef {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl KeyframeRef {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The sentinel is always at index 0.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.index == 0
    }
}
