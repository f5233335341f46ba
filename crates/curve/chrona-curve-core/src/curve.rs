//! Curves: a timeline plus a sampling mode.

use std::cell::Cell;
use std::marker::PhantomData;

use log::trace;

use crate::change::{ChangeSink, CurveChange};
use crate::error::CurveError;
use crate::ids::CurveId;
use crate::interp::{Linear, Sampling, Step};
use crate::keyframe::{Keyframe, KeyframeRef};
use crate::time::SimTime;
use crate::timeline::Timeline;

/// Step function over a timeline.
pub type Discrete<V> = Curve<V, Step>;

/// Piecewise-linear function over a timeline.
pub type Continuous<V> = Curve<V, Linear>;

/// A value's evolution over simulation time.
///
/// Reads go through a cached hint so that sequential queries cost O(1). Every
/// write is reported to the attached [`ChangeSink`], if any.
#[derive(Debug)]
pub struct Curve<V, M> {
    id: CurveId,
    timeline: Timeline<V>,
    hint: Cell<Option<KeyframeRef>>,
    sink: Option<ChangeSink>,
    _mode: PhantomData<fn() -> M>,
}

impl<V, M> Curve<V, M> {
    /// Detached curve whose sentinel holds `initial`.
    pub fn new(id: CurveId, initial: V) -> Self {
        Self {
            id,
            timeline: Timeline::with_sentinel(initial),
            hint: Cell::new(None),
            sink: None,
            _mode: PhantomData,
        }
    }

    /// Curve that reports its writes to `sink`.
    pub fn with_sink(id: CurveId, initial: V, sink: &ChangeSink) -> Self {
        let mut curve = Self::new(id, initial);
        curve.sink = Some(sink.clone());
        curve
    }

    pub fn attach_sink(&mut self, sink: &ChangeSink) {
        self.sink = Some(sink.clone());
    }

    #[inline]
    pub fn id(&self) -> CurveId {
        self.id
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline<V> {
        &self.timeline
    }

    /// The keyframe in effect at `t`.
    pub fn frame(&self, t: SimTime) -> &Keyframe<V> {
        let r = self.locate(t);
        self.timeline.frame_at(r.index())
    }

    /// First keyframe strictly after `t`.
    pub fn next_frame(&self, t: SimTime) -> Option<&Keyframe<V>> {
        let r = self.locate(t);
        self.timeline.next(r).and_then(|n| self.timeline.get(n))
    }

    /// Records `(t, value)` as the new truth and discards every later keyframe.
    pub fn set_drop(&mut self, t: SimTime, value: V) {
        let r = self.timeline.insert_truncating(t, value);
        self.wrote(t, r);
    }

    /// Appends `(t, value)` at its sorted position, keeping later keyframes.
    pub fn set_last(&mut self, t: SimTime, value: V) {
        let r = self.timeline.insert_preserving(t, value);
        self.wrote(t, r);
    }

    /// Inserts `(t, value)` at its sorted position, keeping later keyframes.
    pub fn set_insert(&mut self, t: SimTime, value: V) {
        let r = self.timeline.insert_preserving(t, value);
        self.wrote(t, r);
    }

    /// Discontinuity at `t`: the curve approaches `before` and continues from
    /// `after`.
    pub fn set_insert_jump(&mut self, t: SimTime, before: V, after: V) {
        self.timeline.insert_preserving(t, before);
        let r = self.timeline.insert_preserving(t, after);
        self.wrote(t, r);
    }

    /// Garbage-collects history older than the keyframe in effect at `t`.
    pub fn trim_before(&mut self, t: SimTime) -> usize {
        let dropped = self.timeline.trim_before(t);
        if dropped > 0 {
            self.hint.set(None);
        }
        dropped
    }

    fn locate(&self, t: SimTime) -> KeyframeRef {
        let r = self.timeline.last(t, self.hint.get());
        self.hint.set(Some(r));
        r
    }

    fn wrote(&mut self, t: SimTime, r: KeyframeRef) {
        self.hint.set(Some(r));
        trace!("{} written at {} ({} keyframes)", self.id, t, self.timeline.len());
        if let Some(sink) = &self.sink {
            sink.record(CurveChange {
                curve: self.id,
                time: t,
            });
        }
    }
}

impl<V: Clone, M: Sampling<V>> Curve<V, M> {
    pub fn try_get(&self, t: SimTime) -> Result<V, CurveError> {
        let r = self.locate(t);
        M::sample(&self.timeline, r, t)
    }

    /// Value at `t`.
    ///
    /// # Panics
    /// If the timeline ordering invariant has been broken, which makes the
    /// interpolation divergent. See [`Curve::try_get`].
    pub fn get(&self, t: SimTime) -> V {
        match self.try_get(t) {
            Ok(v) => v,
            Err(err) => panic!("{} ({} sampling): {err}", self.id, M::NAME),
        }
    }
}
