use super::{ConditionVariable, Mutex};
use crate::config::LockConfig;
use crate::error::{Error, Result};
use crate::time::{Deadline, Wait};

use std::sync::atomic::{AtomicU32, Ordering};

/// A counting semaphore bounded by `max`.
///
/// The count always stays within `0..=max`: [`post`](Self::post) at the
/// bound fails with `SystemLimitReached` instead of incrementing.
///
/// # Examples
///
/// ```rust,ignore
/// let sem = Semaphore::new(0, 4)?;
/// sem.post()?;
/// sem.wait()?;
/// assert_eq!(sem.trywait(), Err(Error::Busy));
/// ```
pub struct Semaphore {
    /// Only modified with `lock` held; read lock-free by [`value`](Self::value).
    count: AtomicU32,
    max: u32,
    lock: Mutex,
    available: ConditionVariable,
    destroyed: bool,
}

impl Semaphore {
    /// Creates a semaphore holding `initial` tokens.
    ///
    /// `InvalidParam` when `max == 0` or `initial > max`.
    pub fn new(initial: u32, max: u32) -> Result<Self> {
        if max == 0 || initial > max {
            return Err(Error::InvalidParam);
        }

        Ok(Self {
            count: AtomicU32::new(initial),
            max,
            lock: Mutex::new(LockConfig::new())?,
            available: ConditionVariable::new()?,
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

    /// Adds one token and wakes a waiter.
    pub fn post(&self) -> Result<()> {
        self.ensure_live()?;
        let _guard = self.lock.guard()?;

        let count = self.count.load(Ordering::Relaxed);
        if count >= self.max {
            return Err(Error::SystemLimitReached);
        }

        self.count.store(count + 1, Ordering::Relaxed);
        self.available.signal()
    }

    /// Blocks until a token is available and takes it.
    pub fn wait(&self) -> Result<()> {
        self.timedwait(Deadline::Infinite)
    }

    /// Takes a token if one is available, `Busy` otherwise.
    pub fn trywait(&self) -> Result<()> {
        self.ensure_live()?;
        let _guard = self.lock.guard()?;

        self.take().ok_or(Error::Busy)
    }

    /// Blocks until a token is available or `deadline` expires (`Timeout`).
    pub fn timedwait(&self, deadline: Deadline) -> Result<()> {
        self.ensure_live()?;

        if deadline.wait() == Wait::Poll {
            return self.trywait().map_err(|e| match e {
                Error::Busy => Error::Timeout,
                e => e,
            });
        }

        let _guard = self.lock.guard()?;
        loop {
            if self.take().is_some() {
                return Ok(());
            }

            match self.available.timedwait(&self.lock, deadline) {
                Ok(()) => {}
                Err(Error::Timeout) => return self.take().ok_or(Error::Timeout),
                Err(e) => return Err(e),
            }
        }
    }

    /// Current number of tokens.
    pub fn value(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Upper bound of the count.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Destroys the semaphore's mutex and condition variable.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.available.destroy()?;
        self.lock.destroy()?;
        self.destroyed = true;
        Ok(())
    }

    /// Requires `lock` to be held.
    fn take(&self) -> Option<()> {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        self.count.store(count - 1, Ordering::Relaxed);
        Some(())
    }
}
