//! pthread backend for Linux/glibc.
//!
//! Every native return code is reduced to an [`Error`](crate::Error) in
//! [`errno`]; nothing outside this module sees a raw `errno` value.

mod errno;
mod ffi;

pub(crate) mod clock;
pub(crate) mod condvar;
pub(crate) mod memory;
pub(crate) mod mutex;
pub(crate) mod thread;

pub(crate) const NAME: &str = "posix";
