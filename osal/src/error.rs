//! Backend-independent outcome taxonomy.
//!
//! Every operation in this crate reduces its native result to exactly one
//! [`Error`] variant (or `Ok`). Native codes without a dedicated variant
//! become [`Error::Unavailable`]; raw platform values never leave the crate.
//!
//! Each variant carries a fixed negative code (see [`Error::code`]) so callers
//! matching on numeric values keep working across releases. Success is
//! [`OK`].

use thiserror::Error;

/// Numeric code for success.
pub const OK: i32 = 0;

/// Result alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of failure outcomes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Error {
    /// Generic failure of the requested operation.
    #[error("operation failed")]
    OperationFailed = -1,

    /// An argument was rejected at the call boundary.
    #[error("invalid parameter")]
    InvalidParam = -2,

    /// The caller lacks the right to perform the operation.
    #[error("permission denied")]
    PermissionDenied = -3,

    /// A system or primitive limit would be exceeded.
    #[error("system limit reached")]
    SystemLimitReached = -4,

    /// The deadline expired before the operation could complete.
    #[error("operation timed out")]
    Timeout = -5,

    /// The backend cannot serve the request right now.
    #[error("currently unavailable")]
    Unavailable = -6,

    /// Allocation failed.
    #[error("out of memory")]
    OutOfMemory = -7,

    /// The protected state can no longer be made consistent.
    #[error("not recoverable")]
    NotRecoverable = -8,

    /// The previous owner died while holding the lock.
    #[error("previous owner died")]
    OwnerDead = -9,

    /// The operation would deadlock the calling thread.
    #[error("deadlock detected")]
    DeadLock = -10,

    /// The resource is held by someone else.
    #[error("resource busy")]
    Busy = -11,

    /// The referenced resource does not exist.
    #[error("not found")]
    NotFound = -12,

    /// The backend does not implement the requested feature.
    #[error("not implemented")]
    NotImplemented = -13,

    /// No data available.
    #[error("no data")]
    NoData = -14,

    /// A blocking call was interrupted.
    #[error("interrupted")]
    Interrupted = -15,

    /// The primitive is still locked.
    #[error("mutex is locked")]
    MutexIsLocked = -16,
}

/// Recovery policy a caller should apply to an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient contention; the caller may retry with backoff.
    Contention,
    /// Programming error at the call site.
    Misuse,
    /// Memory or system resources are exhausted.
    Exhaustion,
    /// Shared state needs a domain-specific recovery.
    Consistency,
    /// The backend cannot guarantee the requested semantics.
    Unsupported,
    /// Any other failure.
    Failure,
}

const ALL: [Error; 16] = [
    Error::OperationFailed,
    Error::InvalidParam,
    Error::PermissionDenied,
    Error::SystemLimitReached,
    Error::Timeout,
    Error::Unavailable,
    Error::OutOfMemory,
    Error::NotRecoverable,
    Error::OwnerDead,
    Error::DeadLock,
    Error::Busy,
    Error::NotFound,
    Error::NotImplemented,
    Error::NoData,
    Error::Interrupted,
    Error::MutexIsLocked,
];

impl Error {
    /// Returns the stable numeric code of this outcome.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up the outcome for a numeric code.
    ///
    /// Returns `None` for [`OK`] and for codes outside the taxonomy.
    pub fn from_code(code: i32) -> Option<Error> {
        ALL.iter().copied().find(|e| e.code() == code)
    }

    /// Classifies the outcome by recovery policy.
    pub const fn class(self) -> ErrorClass {
        match self {
            Error::Busy | Error::Timeout => ErrorClass::Contention,
            Error::InvalidParam | Error::MutexIsLocked | Error::PermissionDenied => {
                ErrorClass::Misuse
            }
            Error::OutOfMemory | Error::SystemLimitReached => ErrorClass::Exhaustion,
            Error::OwnerDead | Error::NotRecoverable | Error::DeadLock => ErrorClass::Consistency,
            Error::NotImplemented | Error::Unavailable => ErrorClass::Unsupported,
            Error::OperationFailed | Error::NotFound | Error::NoData | Error::Interrupted => {
                ErrorClass::Failure
            }
        }
    }

    /// Whether retrying the same call later may succeed.
    pub const fn is_transient(self) -> bool {
        matches!(self.class(), ErrorClass::Contention)
    }
}

/// Flattens a result into its numeric code.
pub fn code_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => OK,
        Err(e) => e.code(),
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
