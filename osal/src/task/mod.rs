//! Native threads with real-time scheduling attributes.
//!
//! A [`Task`] is created from a [`TaskConfig`] and a closure. Scheduling
//! policy, priority and CPU affinity are applied by the new thread itself
//! before the closure runs; if that fails the thread is reaped and
//! [`Task::create`] returns the error, so a handle only exists for a thread
//! that is running with the requested attributes.
//!
//! # Examples
//!
//! ```rust,ignore
//! let _osal = Osal::init()?;
//!
//! let config = TaskConfig::new()
//!     .name("sampler")
//!     .policy(SchedPolicy::Fifo)
//!     .priority(80);
//!
//! let mut task = Task::create(config, || 42)?;
//! assert_eq!(task.join()?, 42);
//! ```

mod config;
mod handle;
mod state;

pub use config::{CpuSet, SchedPolicy, TaskConfig};
pub use handle::{Task, exit};
pub use state::TaskState;

/// Yields the calling thread's time slice.
pub fn yield_now() {
    std::thread::yield_now();
}
