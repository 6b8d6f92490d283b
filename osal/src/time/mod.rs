//! Monotonic time.
//!
//! All timestamps and deadlines in this crate live on the monotonic clock of
//! the backend, never on the wall clock, so clock adjustments cannot shorten
//! or stretch a timed wait.
//!
//! It includes:
//! - [`now`] / [`now_ns`] for reading the clock,
//! - [`Deadline`] for bounding blocking calls,
//! - [`sleep`] / [`sleep_until`] for suspending the calling thread.

mod deadline;
mod sleep;

#[doc(inline)]
pub use deadline::Deadline;

pub(crate) use deadline::Wait;

#[doc(inline)]
pub use sleep::{sleep, sleep_until};

use crate::sys;

use std::ops::Add;
use std::time::Duration;

/// A point on the monotonic clock, in nanoseconds.
///
/// The origin is unspecified; only differences between timestamps and
/// comparisons are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wraps a raw nanosecond value.
    pub const fn from_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    /// Returns the raw nanosecond value.
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Adds `duration`, clamping at the end of the clock range.
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(nanos))
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Time elapsed since this timestamp.
    pub fn elapsed(self) -> Duration {
        now().saturating_duration_since(self)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        self.saturating_add(rhs)
    }
}

/// Reads the monotonic clock.
#[inline]
pub fn now() -> Timestamp {
    Timestamp(sys::clock::now_ns())
}

/// Reads the monotonic clock as raw nanoseconds.
#[inline]
pub fn now_ns() -> u64 {
    sys::clock::now_ns()
}
