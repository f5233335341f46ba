//! Fixed-point simulation time.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits in the raw representation.
pub const FRAC_BITS: u32 = 16;

const ONE: i64 = 1 << FRAC_BITS;

/// A point on the simulation clock.
///
/// Stored as a signed 48.16 fixed-point number so that ordering and equality are
/// exact and identical on every platform. `i64::MIN` and `i64::MAX` are reserved
/// for `-inf` (the timeline sentinel) and `+inf` ("never").
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(i64);

impl SimTime {
    /// `-inf`: the time of every timeline sentinel.
    pub const MIN: SimTime = SimTime(i64::MIN);
    /// `+inf`: "never".
    pub const MAX: SimTime = SimTime(i64::MAX);
    pub const ZERO: SimTime = SimTime(0);
    /// Smallest representable step.
    pub const EPSILON: SimTime = SimTime(1);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        SimTime(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole seconds, saturating into the infinities.
    #[inline]
    pub const fn from_int(secs: i64) -> Self {
        SimTime(secs.saturating_mul(ONE))
    }

    /// Rounds to the nearest representable time. Out of range values saturate and
    /// NaN maps to zero.
    #[inline]
    pub fn from_f64(secs: f64) -> Self {
        SimTime((secs * ONE as f64).round() as i64)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            SimTime::MIN => f64::NEG_INFINITY,
            SimTime::MAX => f64::INFINITY,
            SimTime(raw) => raw as f64 / ONE as f64,
        }
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == i64::MAX
    }

    #[inline]
    pub const fn is_finite(self) -> bool {
        self.0 != i64::MIN && self.0 != i64::MAX
    }
}

impl From<i64> for SimTime {
    fn from(secs: i64) -> Self {
        SimTime::from_int(secs)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    /// Saturating; the infinities absorb finite operands.
    fn add(self, rhs: SimTime) -> SimTime {
        if !self.is_finite() {
            return self;
        }
        if !rhs.is_finite() {
            return rhs;
        }
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        if !self.is_finite() {
            return self;
        }
        match rhs {
            SimTime::MIN => SimTime::MAX,
            SimTime::MAX => SimTime::MIN,
            SimTime(raw) => SimTime(self.0.saturating_sub(raw)),
        }
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

impl SubAssign for SimTime {
    fn sub_assign(&mut self, rhs: SimTime) {
        *self = *self - rhs;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SimTime::MIN => f.write_str("-inf"),
            SimTime::MAX => f.write_str("inf"),
            t => write!(f, "{}", t.to_f64()),
        }
    }
}
