//! Chrona Event Core
//!
//! A single-threaded scheduler that keeps event instances ordered by their
//! predicted firing time and re-predicts them whenever a curve they depend on is
//! written. Curve writes reach the loop through the shared
//! [`ChangeSink`](chrona_curve::ChangeSink); nothing is polled.
//!
//! Typical use:
//! 1. register rules with [`EventLoop::add_class`],
//! 2. arm them with [`EventLoop::create_event`],
//! 3. call [`EventLoop::advance`] once per simulation tick.

pub mod class;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event_loop;
pub mod inputs;
pub mod instance;
pub mod params;
pub mod schedule;
pub mod target;

pub use class::{EventClass, SetupContext, TriggerKind};
pub use config::{LoopConfig, PastSchedulingPolicy};
pub use diagnostics::{AdvanceReport, InvocationRecord, InvokeOutcome};
pub use error::{EventError, InvokeError};
pub use event_loop::EventLoop;
pub use inputs::InputQueue;
pub use instance::{EventInstance, InstanceId, InstanceState};
pub use params::{FromParam, ParamMap, ParamValue};
pub use schedule::{DependencyIndex, Schedule};
pub use target::{EventTarget, SimulationState};

pub use chrona_curve::{ChangeSink, CurveId, SimTime};
