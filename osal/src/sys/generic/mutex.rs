//! Blocking mutex on `std::sync::{Mutex, Condvar}`.
//!
//! The std mutex only guards the `locked` flag; the lock handed out to
//! callers is the flag itself, so it can be released from any call site
//! without a guard object.

use super::clock;
use crate::config::{LockConfig, Protocol};
use crate::error::{Error, Result};
use crate::time::Timestamp;

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub(crate) struct RawMutex {
    locked: Mutex<bool>,
    released: Condvar,
}

impl RawMutex {
    pub(crate) fn new(config: &LockConfig) -> Result<Self> {
        if config.robust || config.process_shared || config.protocol != Protocol::None {
            return Err(Error::NotImplemented);
        }

        Ok(Self {
            locked: Mutex::new(false),
            released: Condvar::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, bool> {
        self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock(&self) -> Result<()> {
        let mut locked = self.state();
        while *locked {
            locked = self
                .released
                .wait(locked)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *locked = true;
        Ok(())
    }

    pub(crate) fn trylock(&self) -> Result<()> {
        let mut locked = self.state();
        if *locked {
            return Err(Error::Busy);
        }
        *locked = true;
        Ok(())
    }

    pub(crate) fn timedlock(&self, deadline: Timestamp) -> Result<()> {
        let mut locked = self.state();
        while *locked {
            let Some(left) = clock::until(deadline) else {
                return Err(Error::Timeout);
            };
            locked = self
                .released
                .wait_timeout(locked, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *locked = true;
        Ok(())
    }

    pub(crate) fn unlock(&self) -> Result<()> {
        let mut locked = self.state();
        if !*locked {
            return Err(Error::PermissionDenied);
        }
        *locked = false;
        drop(locked);

        self.released.notify_one();
        Ok(())
    }

    pub(crate) fn make_consistent(&self) -> Result<()> {
        Err(Error::NotRecoverable)
    }

    pub(crate) fn destroy(&mut self) -> Result<()> {
        if *self.state() {
            return Err(Error::Busy);
        }
        Ok(())
    }
}
