use super::Mutex;
use crate::builder;
use crate::error::{Error, Result};
use crate::sys;
use crate::time::{Deadline, Wait};

/// Condition variable bound to a [`Mutex`].
///
/// The caller must hold the mutex exactly once (recursion depth 1) when
/// waiting. The mutex is released for the duration of the wait and held
/// again when the call returns, whatever the outcome. Spurious wake-ups are
/// possible; always re-check the predicate.
///
/// Deadlines are measured on the monotonic clock.
pub struct ConditionVariable {
    raw: sys::Condvar,
    destroyed: bool,
}

impl ConditionVariable {
    /// Creates a condition variable.
    pub fn new() -> Result<Self> {
        builder::require_context()?;

        Ok(Self {
            raw: sys::Condvar::new()?,
            destroyed: false,
        })
    }

    #[inline]
    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            return Err(Error::InvalidParam);
        }
        Ok(())
    }

    /// Releases `mutex`, waits for a notification and reacquires it.
    pub fn wait(&self, mutex: &Mutex) -> Result<()> {
        self.timedwait(mutex, Deadline::Infinite)
    }

    /// Like [`wait`](Self::wait), bounded by `deadline`.
    ///
    /// An already expired deadline returns `Timeout` without releasing the
    /// mutex.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if the caller does not own `mutex`,
    /// - `InvalidParam` if it owns it recursively, or either object was
    ///   destroyed,
    /// - `Timeout` when the deadline expires,
    /// - `OwnerDead` if `mutex` is robust and its state must be recovered.
    pub fn timedwait(&self, mutex: &Mutex, deadline: Deadline) -> Result<()> {
        self.ensure_live()?;
        if mutex.is_destroyed() {
            return Err(Error::InvalidParam);
        }

        let owner = mutex.ownership();
        if !owner.is_mine() {
            return Err(Error::PermissionDenied);
        }
        if owner.depth() != 1 {
            return Err(Error::InvalidParam);
        }

        let until = match deadline.wait() {
            Wait::Poll => return Err(Error::Timeout),
            Wait::Forever => None,
            Wait::Until(t) => Some(t),
        };

        // Another thread may take the mutex while this one waits; it must not
        // see a stale owner.
        owner.release()?;

        let result = match until {
            None => self.raw.wait(mutex.raw()),
            Some(t) => self.raw.timedwait(mutex.raw(), t),
        };

        match result {
            Err(Error::OwnerDead) => {
                owner.acquire_inconsistent();
                Err(Error::OwnerDead)
            }
            result => {
                owner.acquire();
                result
            }
        }
    }

    /// Wakes at least one waiter, if any.
    pub fn signal(&self) -> Result<()> {
        self.ensure_live()?;
        self.raw.signal()
    }

    /// Wakes every waiter.
    pub fn broadcast(&self) -> Result<()> {
        self.ensure_live()?;
        self.raw.broadcast()
    }

    /// Destroys the native condition variable.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.raw.destroy()?;
        self.destroyed = true;
        Ok(())
    }
}
