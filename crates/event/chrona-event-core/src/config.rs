//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// What to do when a prediction lands before the earliest admissible time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PastSchedulingPolicy {
    /// Abort with [`EventError::PastSchedulingViolation`].
    Fail,
    /// Move the instance to the earliest admissible time and log a warning.
    Clamp,
}

impl Default for PastSchedulingPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            PastSchedulingPolicy::Fail
        } else {
            PastSchedulingPolicy::Clamp
        }
    }
}

/// Limits and policies for an [`EventLoop`](crate::EventLoop).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub past_scheduling: PastSchedulingPolicy,
    /// Invocations allowed at one simulated instant within one `advance`.
    pub max_invocations_per_instant: usize,
    /// Invocations allowed within one `advance`.
    pub max_invocations_per_advance: usize,
    /// Keep an [`InvocationRecord`](crate::InvocationRecord) per firing.
    pub record_trace: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            past_scheduling: PastSchedulingPolicy::default(),
            max_invocations_per_instant: 1024,
            max_invocations_per_advance: 1 << 20,
            record_trace: false,
        }
    }
}

impl LoopConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, EventError> {
        let config: LoopConfig = serde_json::from_str(raw).map_err(|err| EventError::Config {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.max_invocations_per_instant == 0 {
            return Err(EventError::Config {
                reason: "max_invocations_per_instant must be at least 1".into(),
            });
        }
        if self.max_invocations_per_advance == 0 {
            return Err(EventError::Config {
                reason: "max_invocations_per_advance must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn with_policy(mut self, policy: PastSchedulingPolicy) -> Self {
        self.past_scheduling = policy;
        self
    }

    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = LoopConfig::from_json_str(r#"{"past_scheduling":"clamp","record_trace":true}"#)
            .unwrap();
        assert_eq!(cfg.past_scheduling, PastSchedulingPolicy::Clamp);
        assert!(cfg.record_trace);
        assert_eq!(cfg.max_invocations_per_instant, 1024);
    }

    #[test]
    fn zero_caps_are_rejected() {
        let err = LoopConfig::from_json_str(r#"{"max_invocations_per_advance":0}"#).unwrap_err();
        assert!(matches!(err, EventError::Config { .. }));
        assert!(LoopConfig::from_json_str("{not json").is_err());
    }
}
