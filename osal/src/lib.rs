//! # osal
//!
//! **osal** is an operating-system abstraction layer for real-time and
//! embedded control software. It gives application code one set of
//! synchronization and timing primitives whose observable behavior
//! (blocking, ownership, timeouts, robustness, priority handling) is the same
//! on every supported platform.
//!
//! It provides:
//!
//! - **Locks**: [`Mutex`] and [`Spinlock`], configured by a [`LockConfig`]
//!   (recursive, error-checking, robust, priority inheritance / ceiling)
//! - **Semaphores**: bounded [`Semaphore`] and [`BinarySemaphore`]
//! - **Condition variables** bound to the monotonic clock
//! - **Tasks** with scheduling policy, priority and CPU affinity
//! - **Monotonic time**: timestamps, deadlines and absolute sleeps
//! - **A jitter tracer** for measuring the periodicity of real-time loops
//!
//! Every fallible call returns [`Result`] with a closed [`Error`] taxonomy;
//! each variant has a stable numeric code.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use osal::{Deadline, LockConfig, Mutex, Osal};
//! use std::time::Duration;
//!
//! fn main() -> osal::Result<()> {
//!     let _osal = Osal::init()?;
//!
//!     let mutex = Mutex::new(LockConfig::new())?;
//!     mutex.timedlock(Deadline::after(Duration::from_millis(10)))?;
//!     mutex.unlock()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`sync`]: locks, semaphores and condition variables
//! - [`task`]: native threads with real-time attributes
//! - [`time`]: monotonic clock, deadlines and sleeping
//! - [`trace`]: latency-jitter tracer
//! - [`config`]: lock configuration
//! - [`error`]: outcome taxonomy
//!
//! ## Backends
//!
//! On Linux with glibc the primitives are built on pthreads; everywhere else
//! (or with the `portable` feature) on `std`. Features the std backend cannot
//! provide fail with [`Error::NotImplemented`] rather than being emulated
//! with weaker guarantees.

mod builder;
mod sys;

pub mod config;
pub mod error;
pub mod sync;
pub mod task;
pub mod time;
pub mod trace;

pub use builder::{Osal, OsalBuilder};
pub use config::{LockConfig, LockType, Protocol};
pub use error::{Error, ErrorClass, Result};
pub use sync::{BinarySemaphore, ConditionVariable, Mutex, Semaphore, Spinlock};
pub use task::{SchedPolicy, Task, TaskConfig};
pub use time::{Deadline, Timestamp};
pub use trace::Tracer;
