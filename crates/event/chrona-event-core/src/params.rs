//! Per-instance parameters.
//!
//! Given at creation, handed to every `invoke` of the instance mutably, and kept
//! across firings. Event classes stay stateless; anything an instance needs to
//! remember (hit counters and the like) lives here.

use std::collections::BTreeMap;

use chrona_curve::SimTime;
use serde::{Deserialize, Serialize};

use crate::target::EventTarget;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Time(SimTime),
    Target(EventTarget),
}

/// Typed extraction from a [`ParamValue`]; `None` on a type mismatch.
pub trait FromParam: Sized {
    fn from_param(value: &ParamValue) -> Option<Self>;
}

macro_rules! param_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for ParamValue {
            fn from(v: $ty) -> Self {
                ParamValue::$variant(v)
            }
        }

        impl FromParam for $ty {
            fn from_param(value: &ParamValue) -> Option<Self> {
                match value {
                    ParamValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    )*};
}

param_conversions!(
    i64 => Int,
    f64 => Float,
    bool => Bool,
    String => Text,
    SimTime => Time,
    EventTarget => Target,
);

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// True if `key` exists and holds a `T`.
    pub fn check_type<T: FromParam>(&self, key: &str) -> bool {
        self.0.get(key).and_then(T::from_param).is_some()
    }

    /// The value under `key`, or `default` when it is missing or of another type.
    pub fn get<T: FromParam>(&self, key: &str, default: T) -> T {
        self.0.get(key).and_then(T::from_param).unwrap_or(default)
    }

    pub fn get_or_default<T: FromParam + Default>(&self, key: &str) -> T {
        self.get(key, T::default())
    }

    /// Adds one to an integer counter (missing counts as zero) and returns it.
    pub fn increment(&mut self, key: &str) -> i64 {
        let next = self.get(key, 0i64) + 1;
        self.insert(key, next);
        next
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
