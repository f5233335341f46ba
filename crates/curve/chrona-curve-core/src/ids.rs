//! Identifiers for curves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a curve. Event targets and the dependency index refer to
/// curves only through this id, never by ownership.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CurveId(pub u32);

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve#{}", self.0)
    }
}

/// Monotonic allocator for CurveId.
#[derive(Default, Debug)]
pub struct CurveIdAllocator {
    next: u32,
}

impl CurveIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> CurveId {
        let id = CurveId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
