//! Portable backend built on `std::sync` and `std::time`.
//!
//! Features without a std counterpart (robust and process-shared locks,
//! priority protocols, scheduling attributes, memory locking) are reported as
//! `NotImplemented`.

pub(crate) mod clock;
pub(crate) mod condvar;
pub(crate) mod memory;
pub(crate) mod mutex;
pub(crate) mod thread;

pub(crate) const NAME: &str = "generic";
