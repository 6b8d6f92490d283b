//! Synchronization primitives.
//!
//! Every primitive here blocks the calling thread (except [`Spinlock`], which
//! busy-waits) and behaves identically on every backend:
//!
//! - [`Mutex`]: owner-tracked mutual exclusion, optionally recursive,
//!   error-checking, robust or priority-aware,
//! - [`Spinlock`]: the same contract as [`Mutex`], never suspends,
//! - [`Semaphore`]: bounded counting semaphore,
//! - [`BinarySemaphore`]: a single signal flag,
//! - [`ConditionVariable`]: wait/notify on a [`Mutex`].
//!
//! ## Design notes
//!
//! - Constructors fail with `Unavailable` while no [`Osal`](crate::Osal)
//!   context is alive.
//! - `destroy` takes `&mut self`, so a primitive cannot be destroyed while
//!   another thread still borrows it.
//! - Dropping a primitive destroys it; a still-locked native object is leaked
//!   with a warning instead.

mod binary_semaphore;
mod condvar;
mod mutex;
mod owner;
mod semaphore;
mod spinlock;

pub use binary_semaphore::BinarySemaphore;
pub use condvar::ConditionVariable;
pub use mutex::{Mutex, MutexGuard};
pub use semaphore::Semaphore;
pub use spinlock::{Spinlock, SpinlockGuard};
