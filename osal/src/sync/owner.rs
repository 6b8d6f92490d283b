//! Owner and recursion tracking shared by [`Mutex`](super::Mutex) and
//! [`Spinlock`](super::Spinlock).
//!
//! Lock-type semantics (recursion, relock detection, owner-only unlock) are
//! enforced here, on top of the raw lock, so they behave the same on every
//! backend.

use crate::config::LockType;
use crate::error::{Error, Result};

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Identifier `0` means "no owner".
const NONE: u64 = 0;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Process-unique id of the current thread, never reused.
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Returns the id of the calling thread.
#[inline]
pub(crate) fn current() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// How a relock by the owner must be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// `lock` / `timedlock`.
    Blocking,
    /// `trylock`.
    Try,
}

/// Ownership record of a lock.
///
/// `owner` and `depth` are only written by the thread holding the raw lock;
/// other threads read `owner` solely to compare it with their own id.
pub(crate) struct Ownership {
    owner: AtomicU64,
    depth: AtomicU32,
    inconsistent: AtomicBool,
}

impl Ownership {
    pub(crate) const fn new() -> Self {
        Self {
            owner: AtomicU64::new(NONE),
            depth: AtomicU32::new(0),
            inconsistent: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_mine(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == current()
    }

    #[inline]
    pub(crate) fn is_held(&self) -> bool {
        self.owner.load(Ordering::Relaxed) != NONE
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth.load(Ordering::Relaxed)
    }

    /// Handles a lock request from the current owner.
    ///
    /// Returns `None` when the caller does not own the lock and must go
    /// through the raw lock.
    pub(crate) fn relock(&self, lock_type: LockType, attempt: Attempt) -> Option<Result<()>> {
        if !self.is_mine() {
            return None;
        }

        Some(match (lock_type, attempt) {
            (LockType::Recursive, _) => {
                let depth = self.depth();
                if depth == u32::MAX {
                    Err(Error::SystemLimitReached)
                } else {
                    self.depth.store(depth + 1, Ordering::Relaxed);
                    Ok(())
                }
            }
            (_, Attempt::Blocking) => Err(Error::DeadLock),
            (_, Attempt::Try) => Err(Error::Busy),
        })
    }

    /// Records the calling thread as owner after the raw lock was taken.
    pub(crate) fn acquire(&self) {
        self.owner.store(current(), Ordering::Relaxed);
        self.depth.store(1, Ordering::Relaxed);
    }

    /// Same as [`acquire`](Self::acquire), after the previous owner died.
    pub(crate) fn acquire_inconsistent(&self) {
        self.acquire();
        self.inconsistent.store(true, Ordering::Relaxed);
    }

    /// Drops one level of ownership.
    ///
    /// Returns `Ok(true)` when the lock is fully released and the raw lock
    /// must be unlocked. A caller that does not own the lock gets
    /// `PermissionDenied`.
    pub(crate) fn release(&self) -> Result<bool> {
        if !self.is_mine() {
            return Err(Error::PermissionDenied);
        }

        let depth = self.depth();
        if depth > 1 {
            self.depth.store(depth - 1, Ordering::Relaxed);
            return Ok(false);
        }

        self.depth.store(0, Ordering::Relaxed);
        self.owner.store(NONE, Ordering::Relaxed);
        Ok(true)
    }

    pub(crate) fn is_inconsistent(&self) -> bool {
        self.inconsistent.load(Ordering::Relaxed)
    }

    pub(crate) fn set_consistent(&self) {
        self.inconsistent.store(false, Ordering::Relaxed);
    }
}
