use super::config::{CpuSet, SchedPolicy, TaskConfig};
use super::state::TaskState;
use crate::builder;
use crate::error::{Error, Result};
use crate::sys;

use std::any::Any;
use std::fmt;
use std::io;
use std::panic;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// Panic payload carrying the value passed to [`exit`].
struct TaskExit<T>(T);

/// Terminates the calling task early; [`Task::join`] yields `value`.
///
/// The task's stack is unwound, so destructors run. `T` must be the result
/// type of the task's entry closure, otherwise `join` reports
/// `OperationFailed`.
///
/// # Panics
///
/// Unwinds the calling thread. Called outside a task it behaves like an
/// uncaught panic of that thread; with `panic = "abort"` it aborts.
pub fn exit<T: Send + 'static>(value: T) -> ! {
    panic::resume_unwind(Box::new(TaskExit(value)))
}

/// Handle to a native thread.
///
/// Dropping a handle that was neither joined nor detached detaches the
/// thread.
pub struct Task<T> {
    /// `None` once joined or detached.
    thread: Option<JoinHandle<Option<T>>>,
    native: sys::thread::Native,
    name: Option<String>,
    state: TaskState,
}

fn spawn_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::WouldBlock => Error::SystemLimitReached,
        io::ErrorKind::OutOfMemory => Error::OutOfMemory,
        io::ErrorKind::PermissionDenied => Error::PermissionDenied,
        io::ErrorKind::InvalidInput => Error::InvalidParam,
        _ => Error::Unavailable,
    }
}

/// Applies scheduling attributes to the calling thread.
fn apply(config: &TaskConfig) -> Result<()> {
    let me = sys::thread::current();

    if config.has_scheduling() {
        sys::thread::set_scheduling(me, config.policy, config.priority)?;
    }
    if let Some(cpus) = &config.affinity {
        sys::thread::set_affinity(me, cpus)?;
    }
    Ok(())
}

impl<T: Send + 'static> Task<T> {
    /// Spawns a thread running `entry` with the given attributes.
    ///
    /// # Errors
    ///
    /// - `Unavailable` without a live [`Osal`](crate::Osal) context,
    /// - `InvalidParam` for malformed attributes or a priority outside the
    ///   policy's range,
    /// - `PermissionDenied` when real-time scheduling is not permitted,
    /// - `NotImplemented` for scheduling attributes on the generic backend,
    /// - `SystemLimitReached` / `OutOfMemory` when the thread cannot be
    ///   spawned.
    pub fn create<F>(config: TaskConfig, entry: F) -> Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        builder::require_context()?;
        config.validate()?;

        let mut builder = thread::Builder::new();
        if let Some(name) = &config.name {
            builder = builder.name(name.clone());
        }
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        let (ack_tx, ack_rx) = mpsc::sync_channel::<Result<()>>(1);
        let attrs = config.clone();

        let thread = builder
            .spawn(move || {
                let applied = apply(&attrs);
                let proceed = applied.is_ok();

                // The creator blocks on this channel until it hears back.
                let _ = ack_tx.send(applied);
                drop(ack_tx);

                proceed.then(entry)
            })
            .map_err(spawn_error)?;

        let started = ack_rx.recv().unwrap_or(Err(Error::OperationFailed));
        if let Err(e) = started {
            let _ = thread.join();
            log::debug!("task {:?} failed to start: {e}", config.name);
            return Err(e);
        }

        log::debug!("task {:?} started", config.name);

        Ok(Self {
            native: sys::thread::native_of(&thread),
            thread: Some(thread),
            name: config.name,
            state: TaskState::Running,
        })
    }

    /// Waits for the task to finish and returns the entry's result, or the
    /// value passed to [`exit`].
    ///
    /// # Errors
    ///
    /// - `InvalidParam` if the task was already joined or detached,
    /// - `OperationFailed` if the entry panicked.
    pub fn join(&mut self) -> Result<T> {
        let thread = self.take_thread()?;
        self.state = TaskState::Joined;

        match thread.join() {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Error::OperationFailed),
            Err(payload) => self.unwound(payload),
        }
    }

    fn unwound(&self, payload: Box<dyn Any + Send>) -> Result<T> {
        match payload.downcast::<TaskExit<T>>() {
            Ok(exit) => Ok(exit.0),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());

                log::error!("task {:?} panicked: {message}", self.name);
                Err(Error::OperationFailed)
            }
        }
    }
}

impl<T> Task<T> {
    fn take_thread(&mut self) -> Result<JoinHandle<Option<T>>> {
        if !self.state.is_joinable() {
            return Err(Error::InvalidParam);
        }
        self.thread.take().ok_or(Error::InvalidParam)
    }

    /// Lets the thread run to completion on its own; its result is lost.
    pub fn detach(&mut self) -> Result<()> {
        drop(self.take_thread()?);
        self.state = TaskState::Detached;
        log::debug!("task {:?} detached", self.name);
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The name given in [`TaskConfig::name`], if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the entry has returned. The task still needs to be joined.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn native(&self) -> Result<sys::thread::Native> {
        if self.state != TaskState::Running {
            return Err(Error::InvalidParam);
        }
        Ok(self.native)
    }

    /// Changes the scheduling policy and priority of the running task.
    pub fn set_priority(&self, policy: SchedPolicy, priority: i32) -> Result<()> {
        sys::thread::set_scheduling(self.native()?, policy, priority)
    }

    /// Current scheduling policy and priority.
    pub fn priority(&self) -> Result<(SchedPolicy, i32)> {
        sys::thread::scheduling(self.native()?)
    }

    /// Pins the running task to `cpus`.
    pub fn set_affinity(&self, cpus: CpuSet) -> Result<()> {
        if cpus.is_empty() {
            return Err(Error::InvalidParam);
        }
        sys::thread::set_affinity(self.native()?, &cpus)
    }

    /// CPUs the task may currently run on.
    pub fn affinity(&self) -> Result<CpuSet> {
        sys::thread::affinity(self.native()?)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_errors_are_classified() {
        let e = io::Error::from(io::ErrorKind::WouldBlock);
        assert_eq!(spawn_error(e), Error::SystemLimitReached);
        let e = io::Error::from(io::ErrorKind::OutOfMemory);
        assert_eq!(spawn_error(e), Error::OutOfMemory);
        let e = io::Error::other("boom");
        assert_eq!(spawn_error(e), Error::Unavailable);
    }
}
