//! Keyframe timeline: an arena of keyframes kept in time order.
//!
//! Index 0 always holds the sentinel at [`SimTime::MIN`], so `last(t)` has an
//! answer for every `t`. Keyframes sharing a timestamp keep insertion order and
//! the most recently inserted one wins lookups.
//!
//! Lookups take an optional [`KeyframeRef`] hint. A fresh hint is walked a few
//! steps toward the answer (the common case for a simulation that moves forward
//! tick by tick); if the walk does not settle quickly, the remaining range is
//! binary searched. Stale hints are detected by generation and ignored.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::keyframe::{Keyframe, KeyframeRef};
use crate::time::SimTime;

/// Steps walked from a hint before switching to binary search.
pub const WALK_LIMIT: usize = 8;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timeline<V> {
    frames: Vec<Keyframe<V>>,
    /// Bumped whenever an existing index stops meaning the same keyframe.
    #[serde(skip)]
    generation: u64,
}

impl<V: Default> Default for Timeline<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Default> Timeline<V> {
    /// Timeline holding only a sentinel with `V::default()`.
    pub fn new() -> Self {
        Self::with_sentinel(V::default())
    }
}

impl<V> Timeline<V> {
    pub fn with_sentinel(value: V) -> Self {
        Self {
            frames: vec![Keyframe::new(SimTime::MIN, value)],
            generation: 0,
        }
    }

    /// Number of keyframes, sentinel included.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when only the sentinel is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.len() <= 1
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn sentinel(&self) -> &Keyframe<V> {
        &self.frames[0]
    }

    /// All keyframes, sentinel first.
    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe<V>> {
        self.frames.iter()
    }

    /// Real keyframes only.
    pub fn keyframes(&self) -> &[Keyframe<V>] {
        &self.frames[1..]
    }

    #[inline]
    pub fn is_fresh(&self, r: KeyframeRef) -> bool {
        r.generation == self.generation && r.index < self.frames.len()
    }

    pub fn get(&self, r: KeyframeRef) -> Option<&Keyframe<V>> {
        if self.is_fresh(r) {
            self.frames.get(r.index)
        } else {
            None
        }
    }

    /// Like [`Timeline::get`] but reports why the reference is unusable.
    pub fn resolve(&self, r: KeyframeRef) -> Result<&Keyframe<V>, CurveError> {
        self.get(r).ok_or(CurveError::StaleKeyframe {
            index: r.index,
            generation: r.generation,
            current: self.generation,
        })
    }

    pub fn next(&self, r: KeyframeRef) -> Option<KeyframeRef> {
        if self.is_fresh(r) && r.index + 1 < self.frames.len() {
            Some(self.make_ref(r.index + 1))
        } else {
            None
        }
    }

    pub fn prev(&self, r: KeyframeRef) -> Option<KeyframeRef> {
        if self.is_fresh(r) && r.index > 0 {
            Some(self.make_ref(r.index - 1))
        } else {
            None
        }
    }

    /// Rightmost keyframe with `keyframe.time <= time`. Never fails: the sentinel
    /// matches any time.
    pub fn last(&self, time: SimTime, hint: Option<KeyframeRef>) -> KeyframeRef {
        let index = match hint {
            Some(h) if self.is_fresh(h) => self.walk_from(h.index, time),
            _ => self.search(time),
        };
        self.make_ref(index)
    }

    /// Rightmost keyframe strictly before `time` (the sentinel if none).
    pub fn before(&self, time: SimTime, hint: Option<KeyframeRef>) -> KeyframeRef {
        self.last(time - SimTime::EPSILON, hint)
    }

    /// Drops every keyframe after `last(time)` and appends `(time, value)`.
    pub fn insert_truncating(&mut self, time: SimTime, value: V) -> KeyframeRef {
        let keep = self.search(time) + 1;
        if keep < self.frames.len() {
            self.frames.truncate(keep);
            self.bump();
        }
        self.frames.push(Keyframe::new(time, value));
        self.make_ref(self.frames.len() - 1)
    }

    /// Inserts `(time, value)` after `last(time)`, keeping everything later.
    pub fn insert_preserving(&mut self, time: SimTime, value: V) -> KeyframeRef {
        let at = self.search(time) + 1;
        if at == self.frames.len() {
            self.frames.push(Keyframe::new(time, value));
        } else {
            self.frames.insert(at, Keyframe::new(time, value));
            self.bump();
        }
        self.make_ref(at)
    }

    pub fn erase(&mut self, r: KeyframeRef) -> Result<Keyframe<V>, CurveError> {
        self.resolve(r)?;
        if r.is_sentinel() {
            return Err(CurveError::SentinelRemoval);
        }
        let removed = self.frames.remove(r.index);
        self.bump();
        Ok(removed)
    }

    /// Removes every keyframe after `r`; returns how many were dropped.
    pub fn erase_after(&mut self, r: KeyframeRef) -> Result<usize, CurveError> {
        self.resolve(r)?;
        let removed = self.frames.len() - (r.index + 1);
        if removed > 0 {
            self.frames.truncate(r.index + 1);
            self.bump();
        }
        Ok(removed)
    }

    /// Discards history older than `last(time)`. Values sampled at `time` or
    /// later are unaffected. Returns how many keyframes were dropped.
    pub fn trim_before(&mut self, time: SimTime) -> usize {
        let first_kept = self.search(time);
        if first_kept <= 1 {
            return 0;
        }
        self.frames.drain(1..first_kept);
        self.bump();
        first_kept - 1
    }

    pub fn check_integrity(&self) -> Result<(), CurveError> {
        match self.frames.first() {
            Some(k) if k.time == SimTime::MIN => {}
            _ => return Err(CurveError::MissingSentinel),
        }
        for (i, pair) in self.frames.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(CurveError::OrderingViolation {
                    index: i + 1,
                    prev: pair[0].time,
                    time: pair[1].time,
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn frame_at(&self, index: usize) -> &Keyframe<V> {
        &self.frames[index]
    }

    #[inline]
    fn make_ref(&self, index: usize) -> KeyframeRef {
        KeyframeRef {
            index,
            generation: self.generation,
        }
    }

    #[inline]
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Binary search over the whole arena.
    #[inline]
    fn search(&self, time: SimTime) -> usize {
        // Sentinel time is MIN, so at least one element satisfies the predicate.
        self.frames.partition_point(|k| k.time <= time).saturating_sub(1)
    }

    fn walk_from(&self, start: usize, time: SimTime) -> usize {
        let mut idx = start;
        if self.frames[idx].time <= time {
            let mut steps = 0;
            while idx + 1 < self.frames.len() && self.frames[idx + 1].time <= time {
                idx += 1;
                steps += 1;
                if steps == WALK_LIMIT {
                    return idx + self.frames[idx + 1..].partition_point(|k| k.time <= time);
                }
            }
            idx
        } else {
            let mut steps = 0;
            while self.frames[idx].time > time {
                idx -= 1;
                steps += 1;
                if steps == WALK_LIMIT && self.frames[idx].time > time {
                    return self.frames[..idx].partition_point(|k| k.time <= time) - 1;
                }
            }
            idx
        }
    }
}
