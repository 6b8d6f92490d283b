//! Platform backend abstraction.
//!
//! The rest of the crate talks to the operating system only through this
//! module. Each backend exposes the same set of items:
//!
//! - `Mutex` / `Condvar`: native blocking primitives,
//! - `clock`: monotonic clock and absolute sleep,
//! - `thread`: scheduling attributes of native threads,
//! - `memory`: process-wide memory locking.
//!
//! The concrete implementation is selected at compile time. Linux/glibc uses
//! the pthread backend unless the `portable` feature is enabled; every other
//! target uses the std-only backend.

#[cfg(all(target_os = "linux", target_env = "gnu", not(feature = "portable")))]
pub(crate) mod posix;

#[cfg(all(target_os = "linux", target_env = "gnu", not(feature = "portable")))]
pub(crate) use posix as platform;

#[cfg(not(all(target_os = "linux", target_env = "gnu", not(feature = "portable"))))]
pub(crate) mod generic;

#[cfg(not(all(target_os = "linux", target_env = "gnu", not(feature = "portable"))))]
pub(crate) use generic as platform;

pub(crate) use platform::{clock, memory, thread};

pub(crate) type Mutex = platform::mutex::RawMutex;

pub(crate) type Condvar = platform::condvar::RawCondvar;

/// Name of the active backend, for diagnostics.
pub(crate) const BACKEND: &str = platform::NAME;
