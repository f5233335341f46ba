//! Chrona Curve Core
//!
//! Time-indexed value histories for a deterministic simulation clock. A
//! [`Timeline`] stores keyframes in time order behind a sentinel at `-inf`, and a
//! [`Curve`] wraps one timeline with a sampling mode: step-hold for
//! [`Discrete`] curves, linear interpolation for [`Continuous`] ones.
//!
//! Curves never talk to a scheduler directly. Mutations are recorded into a
//! [`ChangeSink`] that the owner of the schedule drains.

pub mod change;
pub mod curve;
pub mod error;
pub mod ids;
pub mod interp;
pub mod keyframe;
pub mod map;
pub mod time;
pub mod timeline;

// Re-exports for consumers (scheduler, demos)
pub use change::{ChangeSink, CurveChange};
pub use curve::{Continuous, Curve, Discrete};
pub use error::CurveError;
pub use ids::{CurveId, CurveIdAllocator};
pub use interp::{Interpolate, Linear, Sampling, Step};
pub use keyframe::{Keyframe, KeyframeRef};
pub use map::TimedMap;
pub use time::SimTime;
pub use timeline::Timeline;
