use super::{Deadline, Wait};
use crate::error::{Error, Result};
use crate::sys;

use std::time::Duration;

/// Suspends the calling thread for `duration`.
///
/// The wake-up time is computed once as an absolute deadline, so a sleep
/// interrupted and resumed by the caller does not drift.
///
/// # Errors
///
/// Returns [`Error::Interrupted`] if a signal cut the sleep short.
pub fn sleep(duration: Duration) -> Result<()> {
    sleep_until(Deadline::after(duration))
}

/// Suspends the calling thread until `deadline`.
///
/// An expired deadline returns immediately. [`Deadline::Infinite`] is
/// rejected with [`Error::InvalidParam`].
pub fn sleep_until(deadline: Deadline) -> Result<()> {
    match deadline.wait() {
        Wait::Forever => Err(Error::InvalidParam),
        Wait::Poll => Ok(()),
        Wait::Until(t) => sys::clock::sleep_until(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn sleep_waits_at_least_duration() {
        let start = now();
        sleep(Duration::from_millis(5)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn infinite_sleep_is_rejected() {
        assert_eq!(sleep_until(Deadline::Infinite), Err(Error::InvalidParam));
    }
}
