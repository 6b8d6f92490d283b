//! Native pthread mutex.
//!
//! The `pthread_mutex_t` lives in its own heap allocation so its address is
//! stable for the kernel futex and for condition variables that reference
//! it. The allocation is only released after a successful
//! `pthread_mutex_destroy`; otherwise it is leaked.

use super::clock::to_timespec;
use super::{errno, ffi};
use crate::config::{LockConfig, LockType, Protocol};
use crate::error::{Error, Result};
use crate::time::Timestamp;

use libc::{
    CLOCK_MONOTONIC, PTHREAD_MUTEX_ERRORCHECK, PTHREAD_MUTEX_INITIALIZER, PTHREAD_MUTEX_NORMAL,
    PTHREAD_MUTEX_RECURSIVE, pthread_mutex_destroy, pthread_mutex_init, pthread_mutex_lock,
    pthread_mutex_t, pthread_mutex_trylock, pthread_mutex_unlock, pthread_mutexattr_destroy,
    pthread_mutexattr_init, pthread_mutexattr_settype, pthread_mutexattr_t,
};
use std::cell::UnsafeCell;
use std::mem::{ManuallyDrop, MaybeUninit};

/// Owned `pthread_mutexattr_t`, destroyed on drop.
struct MutexAttr(pthread_mutexattr_t);

impl MutexAttr {
    fn new() -> Result<Self> {
        let mut attr = MaybeUninit::<pthread_mutexattr_t>::uninit();
        errno::init(unsafe { pthread_mutexattr_init(attr.as_mut_ptr()) })?;
        Ok(Self(unsafe { attr.assume_init() }))
    }

    fn apply(&mut self, config: &LockConfig) -> Result<()> {
        let attr = &mut self.0 as *mut pthread_mutexattr_t;

        let kind = match config.lock_type {
            LockType::Normal => PTHREAD_MUTEX_NORMAL,
            LockType::Recursive => PTHREAD_MUTEX_RECURSIVE,
            LockType::ErrorCheck => PTHREAD_MUTEX_ERRORCHECK,
        };
        errno::init(unsafe { pthread_mutexattr_settype(attr, kind) })?;

        if config.robust {
            errno::init(unsafe { ffi::pthread_mutexattr_setrobust(attr, ffi::PTHREAD_MUTEX_ROBUST) })?;
        }

        let protocol = match config.protocol {
            Protocol::None => ffi::PTHREAD_PRIO_NONE,
            Protocol::Inherit => ffi::PTHREAD_PRIO_INHERIT,
            Protocol::Protect => ffi::PTHREAD_PRIO_PROTECT,
        };
        errno::init(unsafe { ffi::pthread_mutexattr_setprotocol(attr, protocol) })?;

        if let Some(ceiling) = config.priority_ceiling {
            errno::init(unsafe { ffi::pthread_mutexattr_setprioceiling(attr, ceiling) })?;
        }

        Ok(())
    }
}

impl Drop for MutexAttr {
    fn drop(&mut self) {
        unsafe { pthread_mutexattr_destroy(&mut self.0) };
    }
}

pub(crate) struct RawMutex {
    inner: ManuallyDrop<Box<UnsafeCell<pthread_mutex_t>>>,
    destroyed: bool,
}

// The pthread mutex is designed to be shared between threads; its address
// never changes after initialization.
unsafe impl Send for RawMutex {}
unsafe impl Sync for RawMutex {}

impl RawMutex {
    pub(crate) fn new(config: &LockConfig) -> Result<Self> {
        // The mutex lives in private heap memory, so no other process can map it.
        if config.process_shared {
            return Err(Error::NotImplemented);
        }

        let mut attr = MutexAttr::new()?;
        attr.apply(config)?;

        let inner = Box::new(UnsafeCell::new(PTHREAD_MUTEX_INITIALIZER));
        errno::init(unsafe { pthread_mutex_init(inner.get(), &attr.0) })?;

        Ok(Self {
            inner: ManuallyDrop::new(inner),
            destroyed: false,
        })
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut pthread_mutex_t {
        self.inner.get()
    }

    pub(crate) fn lock(&self) -> Result<()> {
        errno::lock(unsafe { pthread_mutex_lock(self.as_ptr()) })
    }

    pub(crate) fn trylock(&self) -> Result<()> {
        errno::lock(unsafe { pthread_mutex_trylock(self.as_ptr()) })
    }

    pub(crate) fn timedlock(&self, deadline: Timestamp) -> Result<()> {
        let ts = to_timespec(deadline);
        errno::lock(unsafe { ffi::pthread_mutex_clocklock(self.as_ptr(), CLOCK_MONOTONIC, &ts) })
    }

    pub(crate) fn unlock(&self) -> Result<()> {
        errno::unlock(unsafe { pthread_mutex_unlock(self.as_ptr()) })
    }

    pub(crate) fn make_consistent(&self) -> Result<()> {
        errno::unlock(unsafe { ffi::pthread_mutex_consistent(self.as_ptr()) })
    }

    pub(crate) fn destroy(&mut self) -> Result<()> {
        if !self.destroyed {
            errno::destroy(unsafe { pthread_mutex_destroy(self.as_ptr()) })?;
            self.destroyed = true;
        }
        Ok(())
    }
}

impl Drop for RawMutex {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::warn!("leaking native mutex that failed to destroy: {e}");
            return;
        }

        unsafe { ManuallyDrop::drop(&mut self.inner) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_errorcheck_reports_relock() {
        let m = RawMutex::new(&LockConfig::new().lock_type(LockType::ErrorCheck)).unwrap();
        m.lock().unwrap();
        assert_eq!(m.lock(), Err(Error::DeadLock));
        assert_eq!(m.trylock(), Err(Error::Busy));
        m.unlock().unwrap();
    }

    #[test]
    fn invalid_ceiling_is_rejected_natively() {
        let cfg = LockConfig {
            protocol: Protocol::Protect,
            priority_ceiling: Some(100_000),
            ..LockConfig::default()
        };
        assert_eq!(RawMutex::new(&cfg).err(), Some(Error::InvalidParam));
    }

    #[test]
    fn process_shared_is_not_implemented() {
        let cfg = LockConfig::new().process_shared(true);
        assert_eq!(RawMutex::new(&cfg).err(), Some(Error::NotImplemented));
    }
}
