use super::{Timestamp, now};

use std::time::Duration;

/// Upper bound for a blocking call.
///
/// A deadline is fixed when it is built and is never recomputed while a call
/// waits on it. A timestamp that already passed behaves exactly like
/// [`Deadline::Immediate`]: the call tries once and reports `Timeout` without
/// suspending.
///
/// # Examples
///
/// ```rust,ignore
/// let deadline = Deadline::after(Duration::from_millis(5));
/// mutex.timedlock(deadline)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deadline {
    /// Block until the operation completes.
    Infinite,
    /// Never block.
    Immediate,
    /// Block until the given point on the monotonic clock.
    At(Timestamp),
}

/// How a timed operation must behave for a given deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    Forever,
    Poll,
    Until(Timestamp),
}

impl Deadline {
    /// Builds a deadline `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Deadline::At(now().saturating_add(duration))
    }

    /// Builds a deadline at an absolute timestamp.
    pub fn at(timestamp: Timestamp) -> Self {
        Deadline::At(timestamp)
    }

    /// Whether a call bounded by this deadline would time out right now.
    pub fn is_expired(&self) -> bool {
        match self {
            Deadline::Infinite => false,
            Deadline::Immediate => true,
            Deadline::At(t) => now() >= *t,
        }
    }

    /// Time left before expiry, `None` for [`Deadline::Infinite`].
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Deadline::Infinite => None,
            Deadline::Immediate => Some(Duration::ZERO),
            Deadline::At(t) => Some(t.saturating_duration_since(now())),
        }
    }

    pub(crate) fn wait(self) -> Wait {
        match self {
            Deadline::Infinite => Wait::Forever,
            Deadline::Immediate => Wait::Poll,
            Deadline::At(t) if now() >= t => Wait::Poll,
            Deadline::At(t) => Wait::Until(t),
        }
    }
}

impl From<Duration> for Deadline {
    fn from(duration: Duration) -> Self {
        Deadline::after(duration)
    }
}
