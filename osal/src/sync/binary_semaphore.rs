use super::Mutex;
use crate::config::LockConfig;
use crate::error::{Error, Result};
use crate::time::{Deadline, Timestamp, Wait, now};

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, Thread};

/// Set in `waker` while `parked` names a consumer that may be asleep.
const PARKED: usize = 1;
/// One poster inside `post`, counted in the remaining bits of `waker`.
const WAKER: usize = 2;

/// A semaphore whose count is either 0 or 1.
///
/// Posting an already signaled semaphore is a no-op. The signal is a single
/// atomic flag and [`post`](Self::post) never takes a lock: a sleeping
/// consumer registers its thread handle and `post` unparks it directly.
/// Consumers queue on an internal mutex so that at most one of them is
/// parked at a time.
pub struct BinarySemaphore {
    signaled: AtomicBool,
    waker: AtomicUsize,
    parked: UnsafeCell<Option<Thread>>,
    lock: Mutex,
    destroyed: bool,
}

// `parked` is written only by the consumer holding `lock`, and only while no
// poster can read it (see `register` and `unregister`).
unsafe impl Sync for BinarySemaphore {}

impl BinarySemaphore {
    /// Creates a semaphore, initially signaled or not.
    pub fn new(signaled: bool) -> Result<Self> {
        Ok(Self {
            signaled: AtomicBool::new(signaled),
            waker: AtomicUsize::new(0),
            parked: UnsafeCell::new(None),
            lock: Mutex::new(LockConfig::new())?,
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

    /// Sets the signal and wakes the parked consumer, if any. Never blocks.
    pub fn post(&self) -> Result<()> {
        self.ensure_live()?;

        // Pairs with `register`: either the consumer sees the flag on its
        // next check or this thread sees `PARKED`.
        if self.signaled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if self.waker.fetch_add(WAKER, Ordering::SeqCst) & PARKED != 0 {
            if let Some(consumer) = unsafe { &*self.parked.get() } {
                consumer.unpark();
            }
        }
        self.waker.fetch_sub(WAKER, Ordering::Release);
        Ok(())
    }

    /// Blocks until signaled, then clears the signal.
    pub fn wait(&self) -> Result<()> {
        self.timedwait(Deadline::Infinite)
    }

    /// Clears the signal if set, `Busy` otherwise.
    pub fn trywait(&self) -> Result<()> {
        self.ensure_live()?;

        if self.signaled.swap(false, Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    /// Blocks until signaled or until `deadline` expires (`Timeout`).
    pub fn timedwait(&self, deadline: Deadline) -> Result<()> {
        self.ensure_live()?;

        if self.signaled.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let until = match deadline.wait() {
            Wait::Poll => return Err(Error::Timeout),
            Wait::Forever => None,
            Wait::Until(t) => Some(t),
        };

        match self.lock.timedlock(deadline) {
            Ok(()) => {}
            Err(Error::Timeout) => return self.trywait().map_err(|_| Error::Timeout),
            Err(e) => return Err(e),
        }

        let result = self.park_until(until);
        self.lock.unlock()?;
        result
    }

    /// Parks the calling consumer until the flag is taken or `until` passes.
    /// Must be called with `lock` held.
    fn park_until(&self, until: Option<Timestamp>) -> Result<()> {
        self.register();

        let result = loop {
            if self.signaled.swap(false, Ordering::SeqCst) {
                break Ok(());
            }

            match until {
                None => thread::park(),
                Some(t) => {
                    let left = t.saturating_duration_since(now());
                    if left.is_zero() {
                        break Err(Error::Timeout);
                    }
                    thread::park_timeout(left);
                }
            }
        };

        self.unregister();
        result
    }

    fn register(&self) {
        // No poster reads `parked` while `PARKED` is clear.
        unsafe { *self.parked.get() = Some(thread::current()) };
        self.waker.fetch_or(PARKED, Ordering::SeqCst);
    }

    fn unregister(&self) {
        self.waker.fetch_and(!PARKED, Ordering::SeqCst);

        // Posters that saw `PARKED` may still hold a reference to `parked`.
        // Yield rather than spin: a poster preempted here needs this CPU.
        while self.waker.load(Ordering::Acquire) != 0 {
            thread::yield_now();
        }
    }

    /// Whether the semaphore is currently signaled.
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::SeqCst)
    }

    /// Releases the internal lock; any later call is `InvalidParam`.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.lock.destroy()?;
        self.destroyed = true;
        Ok(())
    }
}
