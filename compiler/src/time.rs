// time.rs — Unit-tagged time values
//
// Time literals as declared in the source: timer offsets and periods,
// action minimum delays, and reaction deadlines. Conversion to a single
// canonical unit (nanoseconds) is provided for renderers that need one.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none; out-of-range conversions saturate.
// Side effects: none.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Ns,
    Us,
    Ms,
    Sec,
    Min,
    Hour,
}

impl TimeUnit {
    /// Nanoseconds per unit.
    pub fn nanos(self) -> u64 {
        match self {
            TimeUnit::Ns => 1,
            TimeUnit::Us => 1_000,
            TimeUnit::Ms => 1_000_000,
            TimeUnit::Sec => 1_000_000_000,
            TimeUnit::Min => 60_000_000_000,
            TimeUnit::Hour => 3_600_000_000_000,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::Sec => "s",
            TimeUnit::Min => "min",
            TimeUnit::Hour => "h",
        }
    }
}

/// A time literal: magnitude plus unit.
///
/// The declared unit is preserved so renderers can spell the value the way
/// the source did; comparisons go through `as_nanos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeValue {
    pub magnitude: u64,
    pub unit: TimeUnit,
}

impl TimeValue {
    pub const ZERO: TimeValue = TimeValue::new(0, TimeUnit::Ns);

    pub const fn new(magnitude: u64, unit: TimeUnit) -> Self {
        TimeValue { magnitude, unit }
    }

    pub const fn ns(magnitude: u64) -> Self {
        TimeValue::new(magnitude, TimeUnit::Ns)
    }

    pub const fn us(magnitude: u64) -> Self {
        TimeValue::new(magnitude, TimeUnit::Us)
    }

    pub const fn ms(magnitude: u64) -> Self {
        TimeValue::new(magnitude, TimeUnit::Ms)
    }

    pub const fn sec(magnitude: u64) -> Self {
        TimeValue::new(magnitude, TimeUnit::Sec)
    }

    /// Canonical magnitude in nanoseconds (saturating).
    pub fn as_nanos(&self) -> u64 {
        self.magnitude.saturating_mul(self.unit.nanos())
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.suffix())
    }
}
