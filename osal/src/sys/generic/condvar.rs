//! Condition variable over [`RawMutex`].
//!
//! Each notification bumps a sequence number. A waiter records the sequence
//! while still holding the internal lock, then releases the caller's mutex;
//! a notifier needs that internal lock, so no notification issued after the
//! release can be missed.

use super::clock;
use super::mutex::RawMutex;
use crate::error::{Error, Result};
use crate::time::Timestamp;

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub(crate) struct RawCondvar {
    seq: Mutex<u64>,
    cond: Condvar,
}

impl RawCondvar {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            seq: Mutex::new(0),
            cond: Condvar::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, u64> {
        self.seq.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait(&self, mutex: &RawMutex) -> Result<()> {
        let seq = self.state();
        let start = *seq;
        mutex.unlock()?;

        let seq = self
            .cond
            .wait_while(seq, |s| *s == start)
            .unwrap_or_else(PoisonError::into_inner);
        drop(seq);

        mutex.lock()
    }

    pub(crate) fn timedwait(&self, mutex: &RawMutex, deadline: Timestamp) -> Result<()> {
        let mut seq = self.state();
        let start = *seq;
        mutex.unlock()?;

        let mut outcome = Ok(());
        while *seq == start {
            let Some(left) = clock::until(deadline) else {
                outcome = Err(Error::Timeout);
                break;
            };
            seq = self
                .cond
                .wait_timeout(seq, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        drop(seq);

        mutex.lock()?;
        outcome
    }

    pub(crate) fn signal(&self) -> Result<()> {
        *self.state() += 1;
        self.cond.notify_one();
        Ok(())
    }

    pub(crate) fn broadcast(&self) -> Result<()> {
        *self.state() += 1;
        self.cond.notify_all();
        Ok(())
    }

    pub(crate) fn destroy(&mut self) -> Result<()> {
        Ok(())
    }
}
