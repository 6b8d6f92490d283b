use super::owner::{Attempt, Ownership};
use crate::builder;
use crate::config::LockConfig;
use crate::error::{Error, Result};
use crate::sys;
use crate::time::{Deadline, Wait};

use std::fmt;
use std::mem::ManuallyDrop;

/// A blocking mutual-exclusion lock.
///
/// Unlike `std::sync::Mutex`, this lock does not wrap data: it is locked and
/// unlocked explicitly, and its behavior is driven by a [`LockConfig`].
///
/// - Only the thread that locked the mutex may unlock it; any other thread
///   gets `PermissionDenied`, whatever the lock type.
/// - A relock by the owner increments the recursion depth for
///   [`LockType::Recursive`](crate::LockType::Recursive). Other types report
///   `DeadLock` from [`lock`](Self::lock) / [`timedlock`](Self::timedlock)
///   and `Busy` from [`trylock`](Self::trylock).
/// - On a robust mutex whose owner terminated, the lock calls acquire the
///   mutex and return `OwnerDead`. Call
///   [`make_consistent`](Self::make_consistent) before unlocking, or the
///   mutex becomes `NotRecoverable`.
///
/// # Examples
///
/// ```rust,ignore
/// let _osal = Osal::init()?;
/// let mutex = Mutex::new(LockConfig::new().lock_type(LockType::Recursive))?;
///
/// mutex.lock()?;
/// mutex.lock()?;
/// mutex.unlock()?;
/// mutex.unlock()?;
/// ```
pub struct Mutex {
    /// Native lock. Not dropped while still held.
    raw: ManuallyDrop<sys::Mutex>,
    owner: Ownership,
    config: LockConfig,
    destroyed: bool,
}

impl Mutex {
    /// Creates an unlocked mutex.
    ///
    /// # Errors
    ///
    /// - `Unavailable` without a live [`Osal`](crate::Osal) context,
    /// - `InvalidParam` if `config` does not validate,
    /// - `NotImplemented` for attributes the backend cannot honor,
    /// - the native initialization error otherwise.
    pub fn new(config: LockConfig) -> Result<Self> {
        builder::require_context()?;
        config.validate()?;

        let raw = sys::Mutex::new(&config)?;

        Ok(Self {
            raw: ManuallyDrop::new(raw),
            owner: Ownership::new(),
            config,
            destroyed: false,
        })
    }

    /// Returns the configuration the mutex was created with.
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Whether the calling thread currently holds the mutex.
    pub fn is_owned(&self) -> bool {
        self.owner.is_mine()
    }

    #[inline]
    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            return Err(Error::InvalidParam);
        }
        Ok(())
    }

    fn acquired(&self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.owner.acquire();
                Ok(())
            }
            Err(Error::OwnerDead) => {
                self.owner.acquire_inconsistent();
                Err(Error::OwnerDead)
            }
            Err(e) => Err(e),
        }
    }

    /// Blocks until the mutex is acquired.
    pub fn lock(&self) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Blocking) {
            return result;
        }

        self.acquired(self.raw.lock())
    }

    /// Acquires the mutex if it is free, `Busy` otherwise.
    pub fn trylock(&self) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Try) {
            return result;
        }

        self.acquired(self.raw.trylock())
    }

    /// Blocks until the mutex is acquired or `deadline` expires (`Timeout`).
    ///
    /// An expired deadline still acquires a free mutex.
    pub fn timedlock(&self, deadline: Deadline) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Blocking) {
            return result;
        }

        let result = match deadline.wait() {
            Wait::Forever => self.raw.lock(),
            Wait::Poll => self.raw.trylock().map_err(|e| match e {
                Error::Busy => Error::Timeout,
                e => e,
            }),
            Wait::Until(t) => self.raw.timedlock(t),
        };

        self.acquired(result)
    }

    /// Releases one level of ownership.
    ///
    /// Unlocking an inconsistent robust mutex marks it permanently
    /// unusable (`NotRecoverable`).
    pub fn unlock(&self) -> Result<()> {
        self.ensure_live()?;

        if !self.owner.release()? {
            return Ok(());
        }

        if let Err(e) = self.raw.unlock() {
            self.owner.acquire();
            return Err(e);
        }

        self.owner.set_consistent();
        Ok(())
    }

    /// Marks the state protected by a robust mutex as consistent again.
    ///
    /// Must be called by the owner after a lock call returned `OwnerDead`.
    ///
    /// # Errors
    ///
    /// - `InvalidParam` if the mutex is not robust or not inconsistent,
    /// - `PermissionDenied` if the caller does not own it,
    /// - `NotRecoverable` if the backend has no robust support.
    pub fn make_consistent(&self) -> Result<()> {
        self.ensure_live()?;

        if !self.config.robust {
            return Err(Error::InvalidParam);
        }
        if !self.owner.is_mine() {
            return Err(Error::PermissionDenied);
        }
        if !self.owner.is_inconsistent() {
            return Err(Error::InvalidParam);
        }

        self.raw.make_consistent()?;
        self.owner.set_consistent();
        Ok(())
    }

    /// Destroys the native lock.
    ///
    /// Returns `MutexIsLocked` if the mutex is held, by any thread. After a
    /// successful call every operation reports `InvalidParam`.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;

        if self.owner.is_held() {
            return Err(Error::MutexIsLocked);
        }

        self.raw.destroy().map_err(|e| match e {
            Error::Busy => Error::MutexIsLocked,
            e => e,
        })?;

        self.destroyed = true;
        Ok(())
    }

    /// Locks the mutex and returns a guard that unlocks it on drop.
    ///
    /// An `OwnerDead` outcome is returned as an error with the mutex held;
    /// the caller must recover and unlock it explicitly.
    pub fn guard(&self) -> Result<MutexGuard<'_>> {
        self.lock()?;
        Ok(MutexGuard { mutex: self })
    }

    pub(super) fn raw(&self) -> &sys::Mutex {
        &self.raw
    }

    pub(super) fn ownership(&self) -> &Ownership {
        &self.owner
    }

    pub(super) fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("config", &self.config)
            .field("locked", &self.owner.is_held())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        if self.owner.is_held() {
            log::warn!("mutex dropped while locked; leaking the native object");
            return;
        }

        unsafe { ManuallyDrop::drop(&mut self.raw) };
    }
}

/// RAII guard returned by [`Mutex::guard`].
#[must_use = "the mutex is unlocked as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
}

impl MutexGuard<'_> {
    /// The locked mutex, e.g. to wait on a condition variable.
    pub fn mutex(&self) -> &Mutex {
        self.mutex
    }
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.mutex.unlock() {
            log::warn!("failed to unlock mutex from guard: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Osal;
    use crate::config::LockType;

    use std::sync::Arc;
    use std::thread;

    #[test]
    fn recursive_needs_matching_unlocks() {
        let _osal = Osal::init().unwrap();
        let m = Arc::new(Mutex::new(LockConfig::new().lock_type(LockType::Recursive)).unwrap());

        m.lock().unwrap();
        m.trylock().unwrap();
        m.unlock().unwrap();

        let other = m.clone();
        let busy = thread::spawn(move || other.trylock()).join().unwrap();
        assert_eq!(busy, Err(Error::Busy));

        m.unlock().unwrap();
        assert!(!m.is_owned());
    }

    #[test]
    fn destroyed_mutex_rejects_operations() {
        let _osal = Osal::init().unwrap();
        let mut m = Mutex::new(LockConfig::new()).unwrap();

        m.destroy().unwrap();
        assert_eq!(m.lock(), Err(Error::InvalidParam));
        assert_eq!(m.destroy(), Err(Error::InvalidParam));
    }

    #[test]
    fn make_consistent_requires_robust() {
        let _osal = Osal::init().unwrap();
        let m = Mutex::new(LockConfig::new()).unwrap();
        m.lock().unwrap();
        assert_eq!(m.make_consistent(), Err(Error::InvalidParam));
        m.unlock().unwrap();
    }

    #[test]
    fn guard_unlocks_on_drop() {
        let _osal = Osal::init().unwrap();
        let m = Mutex::new(LockConfig::new()).unwrap();
        {
            let g = m.guard().unwrap();
            assert!(g.mutex().is_owned());
        }
        assert!(!m.is_owned());
        m.trylock().unwrap();
        m.unlock().unwrap();
    }
}
