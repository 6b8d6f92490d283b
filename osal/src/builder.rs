//! Process-wide library context.
//!
//! Primitive constructors refuse to run (`Unavailable`) unless at least one
//! [`Osal`] handle is alive. Handles are reference counted: the first one
//! performs the setup requested by its [`OsalBuilder`], dropping the last
//! one undoes it.

use crate::error::{Error, Result};
use crate::sys;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

struct Context {
    /// Number of live [`Osal`] handles.
    refs: usize,
    /// Whether `mlockall` is in effect and must be undone on teardown.
    memory_locked: bool,
}

static CONTEXT: Mutex<Context> = Mutex::new(Context {
    refs: 0,
    memory_locked: false,
});

/// Mirrors `CONTEXT.refs > 0` for the constructor fast path.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Fails with `Unavailable` while no context is alive.
pub(crate) fn require_context() -> Result<()> {
    if ACTIVE.load(Ordering::Acquire) {
        Ok(())
    } else {
        Err(Error::Unavailable)
    }
}

/// Handle on the library context.
///
/// # Examples
///
/// ```rust,ignore
/// let _osal = Osal::init()?;
/// let mutex = Mutex::new(LockConfig::new())?;
/// ```
#[derive(Debug)]
#[must_use = "the context is torn down when the last handle is dropped"]
pub struct Osal {
    _private: (),
}

impl Osal {
    /// Initializes the context with default options.
    pub fn init() -> Result<Self> {
        OsalBuilder::new().build()
    }

    /// Whether a context is currently alive in this process.
    pub fn is_initialized() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }

    /// Name of the backend compiled into this build (`"posix"` or `"generic"`).
    pub fn backend() -> &'static str {
        sys::BACKEND
    }
}

impl Drop for Osal {
    fn drop(&mut self) {
        let mut ctx = CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
        ctx.refs -= 1;

        if ctx.refs > 0 {
            return;
        }

        ACTIVE.store(false, Ordering::Release);

        if ctx.memory_locked {
            if let Err(e) = sys::memory::unlock_all() {
                log::warn!("failed to unlock process memory: {e}");
            }
            ctx.memory_locked = false;
        }

        log::debug!("osal context torn down");
    }
}

/// Builder for the library context.
///
/// Options only take effect when the built handle is the first live one;
/// later handles join the existing context.
///
/// # Examples
///
/// ```rust,ignore
/// let osal = OsalBuilder::new()
///     .lock_memory(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct OsalBuilder {
    /// Lock all current and future pages in RAM (`mlockall`).
    lock_memory: bool,
}

impl OsalBuilder {
    /// Creates a builder with default options: no memory locking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that process memory be locked for the context's lifetime.
    ///
    /// Only the posix backend supports this; elsewhere
    /// [`build`](Self::build) fails with `NotImplemented`.
    pub fn lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Creates or joins the context.
    pub fn build(self) -> Result<Osal> {
        let mut ctx = CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);

        if ctx.refs == 0 {
            if self.lock_memory {
                sys::memory::lock_all()?;
                ctx.memory_locked = true;
            }
            log::debug!(
                "osal context initialized (backend: {}, lock_memory: {})",
                sys::BACKEND,
                self.lock_memory
            );
        }

        ctx.refs += 1;
        ACTIVE.store(true, Ordering::Release);

        Ok(Osal { _private: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_reference_counted() {
        let a = Osal::init().unwrap();
        let b = Osal::init().unwrap();
        drop(a);
        assert!(Osal::is_initialized());
        assert!(require_context().is_ok());
        drop(b);
    }
}
