//! Ticket spinlock.
//!
//! Two counters: `next_ticket` and `now_serving`. A locker takes the next
//! ticket and spins until it is served; unlocking serves the next ticket.
//! Waiters are therefore served in arrival order. `trylock` only succeeds
//! when nobody is queued, by claiming the ticket currently being served.
//!
//! A waiter spins for a bounded number of rounds and then yields the CPU on
//! every further round. On a single core a preempted holder only runs again
//! once the waiters yield.

use super::owner::{Attempt, Ownership};
use crate::builder;
use crate::config::{LockConfig, Protocol};
use crate::error::{Error, Result};
use crate::time::{Deadline, Wait, now};

use std::hint;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

/// Busy rounds before a waiter starts yielding.
const SPIN_LIMIT: u32 = 64;

/// Spin-then-yield wait step.
#[derive(Default)]
struct Backoff {
    rounds: u32,
}

impl Backoff {
    #[inline]
    fn snooze(&mut self) {
        if self.rounds < SPIN_LIMIT {
            self.rounds += 1;
            hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }
}

/// A busy-waiting lock with the [`Mutex`](super::Mutex) contract.
///
/// No call on a spinlock ever suspends the thread; a waiter stays runnable
/// and only yields its time slice once it has spun for a while. Lock types behave as for
/// [`Mutex`](super::Mutex); robust, process-shared and priority-protocol
/// configurations are rejected with `NotImplemented`.
pub struct Spinlock {
    next_ticket: AtomicU32,
    now_serving: AtomicU32,
    owner: Ownership,
    config: LockConfig,
    destroyed: bool,
}

impl Spinlock {
    /// Creates an unlocked spinlock.
    pub fn new(config: LockConfig) -> Result<Self> {
        builder::require_context()?;
        config.validate()?;

        if config.robust || config.process_shared || config.protocol != Protocol::None {
            return Err(Error::NotImplemented);
        }

        Ok(Self {
            next_ticket: AtomicU32::new(0),
            now_serving: AtomicU32::new(0),
            owner: Ownership::new(),
            config,
            destroyed: false,
        })
    }

    /// The configuration the spinlock was created with.
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Whether the calling thread currently holds the spinlock.
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

    /// Claims the lock only if no ticket is outstanding.
    #[inline]
    fn try_acquire(&self) -> bool {
        let serving = self.now_serving.load(Ordering::Relaxed);
        self.next_ticket
            .compare_exchange(
                serving,
                serving.wrapping_add(1),
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Spins until the lock is acquired.
    pub fn lock(&self) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Blocking) {
            return result;
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut backoff = Backoff::default();
        while self.now_serving.load(Ordering::Acquire) != ticket {
            backoff.snooze();
        }

        self.owner.acquire();
        Ok(())
    }

    /// Acquires the lock if it is free, `Busy` otherwise.
    pub fn trylock(&self) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Try) {
            return result;
        }

        if !self.try_acquire() {
            return Err(Error::Busy);
        }

        self.owner.acquire();
        Ok(())
    }

    /// Polls the lock until it is acquired or `deadline` expires.
    pub fn timedlock(&self, deadline: Deadline) -> Result<()> {
        self.ensure_live()?;

        if let Some(result) = self.owner.relock(self.config.lock_type, Attempt::Blocking) {
            return result;
        }

        let until = match deadline.wait() {
            Wait::Forever => return self.lock(),
            Wait::Poll => None,
            Wait::Until(t) => Some(t),
        };

        let mut backoff = Backoff::default();
        loop {
            if self.try_acquire() {
                self.owner.acquire();
                return Ok(());
            }

            match until {
                Some(t) if now() < t => backoff.snooze(),
                _ => return Err(Error::Timeout),
            }
        }
    }

    /// Releases one level of ownership.
    pub fn unlock(&self) -> Result<()> {
        self.ensure_live()?;

        if self.owner.release()? {
            self.now_serving.fetch_add(1, Ordering::Release);
        }
        Ok(())
    }

    /// Spinlocks are never robust: always `InvalidParam`.
    pub fn make_consistent(&self) -> Result<()> {
        self.ensure_live()?;
        Err(Error::InvalidParam)
    }

    /// Destroys the spinlock; `MutexIsLocked` while it is held.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;

        if self.owner.is_held() {
            return Err(Error::MutexIsLocked);
        }

        self.destroyed = true;
        Ok(())
    }

    /// Locks the spinlock and returns a guard that unlocks it on drop.
    pub fn guard(&self) -> Result<SpinlockGuard<'_>> {
        self.lock()?;
        Ok(SpinlockGuard { lock: self })
    }
}

impl Drop for Spinlock {
    fn drop(&mut self) {
        if self.owner.is_held() {
            log::warn!("spinlock dropped while locked");
        }
    }
}

/// RAII guard returned by [`Spinlock::guard`].
#[must_use = "the spinlock is unlocked as soon as the guard is dropped"]
pub struct SpinlockGuard<'a> {
    lock: &'a Spinlock,
}

impl Drop for SpinlockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.unlock() {
            log::warn!("failed to unlock spinlock from guard: {e}");
        }
    }
}
