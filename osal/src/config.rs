//! Lock configuration shared by [`Mutex`](crate::sync::Mutex) and
//! [`Spinlock`](crate::sync::Spinlock).
//!
//! A [`LockConfig`] is a plain value with named fields. It is validated when a
//! lock is constructed; combinations the backend cannot honor are rejected
//! there instead of being silently degraded.
//!
//! For callers that exchange configurations as packed integers the value can
//! be converted to and from a `u32` bitfield:
//!
//! | bits   | meaning                                        |
//! |--------|------------------------------------------------|
//! | 0-1    | type: 0 normal, 1 error-check, 2 recursive     |
//! | 4      | robust                                         |
//! | 5      | process shared                                 |
//! | 6-7    | protocol: 0 none, 1 inherit, 2 protect         |
//! | 24-31  | priority ceiling (0 = unset)                   |

use crate::error::{Error, Result};

use bitflags::bitflags;

/// Highest priority ceiling accepted by [`LockConfig::validate`].
pub const PRIORITY_CEILING_MAX: i32 = 99;

const CEILING_SHIFT: u32 = 24;

bitflags! {
    /// Packed representation of a [`LockConfig`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LockAttr: u32 {
        const ERRORCHECK = 0x0000_0001;
        const RECURSIVE = 0x0000_0002;
        const ROBUST = 0x0000_0010;
        const PROCESS_SHARED = 0x0000_0020;
        const PRIO_INHERIT = 0x0000_0040;
        const PRIO_PROTECT = 0x0000_0080;
        const PRIO_CEILING = 0xFF00_0000;
    }
}

/// Behavior on relock and on unlock by another thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockType {
    /// Relocking by the owner is reported, never recursive.
    #[default]
    Normal,
    /// The owner may lock repeatedly; each lock needs one unlock.
    Recursive,
    /// Relock and foreign unlock are reported as errors.
    ErrorCheck,
}

/// Priority-inversion avoidance protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    None,
    /// The owner inherits the priority of the highest waiter.
    Inherit,
    /// The owner runs at the configured priority ceiling.
    Protect,
}

/// Configuration of a mutual-exclusion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LockConfig {
    pub lock_type: LockType,
    /// Report `OwnerDead` instead of hanging when the owner terminates.
    pub robust: bool,
    /// Allow use from several processes when placed in shared memory.
    pub process_shared: bool,
    pub protocol: Protocol,
    /// Only meaningful together with [`Protocol::Protect`].
    pub priority_ceiling: Option<i32>,
}

impl LockConfig {
    /// Creates the default configuration: normal, private, no protocol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lock type.
    pub fn lock_type(mut self, lock_type: LockType) -> Self {
        self.lock_type = lock_type;
        self
    }

    /// Enables or disables robustness.
    pub fn robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    /// Enables or disables process sharing. No backend places locks in
    /// shared memory, so construction rejects this with `NotImplemented`.
    pub fn process_shared(mut self, shared: bool) -> Self {
        self.process_shared = shared;
        self
    }

    /// Sets the priority protocol.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the priority ceiling used by [`Protocol::Protect`].
    pub fn priority_ceiling(mut self, ceiling: i32) -> Self {
        self.priority_ceiling = Some(ceiling);
        self
    }

    /// Checks that the fields form a meaningful combination.
    ///
    /// A ceiling requires [`Protocol::Protect`] and vice versa; the ceiling
    /// must lie in `1..=PRIORITY_CEILING_MAX`.
    pub fn validate(&self) -> Result<()> {
        match (self.protocol, self.priority_ceiling) {
            (Protocol::Protect, Some(c)) if (1..=PRIORITY_CEILING_MAX).contains(&c) => Ok(()),
            (Protocol::Protect, _) => Err(Error::InvalidParam),
            (_, Some(_)) => Err(Error::InvalidParam),
            (_, None) => Ok(()),
        }
    }

    /// Decodes and validates a packed configuration.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let attr = LockAttr::from_bits(bits).ok_or(Error::InvalidParam)?;

        let lock_type = match (
            attr.contains(LockAttr::ERRORCHECK),
            attr.contains(LockAttr::RECURSIVE),
        ) {
            (false, false) => LockType::Normal,
            (true, false) => LockType::ErrorCheck,
            (false, true) => LockType::Recursive,
            (true, true) => return Err(Error::InvalidParam),
        };

        let protocol = match (
            attr.contains(LockAttr::PRIO_INHERIT),
            attr.contains(LockAttr::PRIO_PROTECT),
        ) {
            (false, false) => Protocol::None,
            (true, false) => Protocol::Inherit,
            (false, true) => Protocol::Protect,
            (true, true) => return Err(Error::InvalidParam),
        };

        let ceiling = (bits & LockAttr::PRIO_CEILING.bits()) >> CEILING_SHIFT;

        let config = LockConfig {
            lock_type,
            robust: attr.contains(LockAttr::ROBUST),
            process_shared: attr.contains(LockAttr::PROCESS_SHARED),
            protocol,
            priority_ceiling: (ceiling != 0).then_some(ceiling as i32),
        };

        config.validate()?;
        Ok(config)
    }

    /// Encodes the configuration into its packed form.
    ///
    /// Ceilings outside `0..=255` cannot be represented and are truncated;
    /// [`validate`](Self::validate) rejects them anyway.
    pub fn to_bits(&self) -> u32 {
        let mut attr = match self.lock_type {
            LockType::Normal => LockAttr::empty(),
            LockType::ErrorCheck => LockAttr::ERRORCHECK,
            LockType::Recursive => LockAttr::RECURSIVE,
        };

        attr.set(LockAttr::ROBUST, self.robust);
        attr.set(LockAttr::PROCESS_SHARED, self.process_shared);

        match self.protocol {
            Protocol::None => {}
            Protocol::Inherit => attr |= LockAttr::PRIO_INHERIT,
            Protocol::Protect => attr |= LockAttr::PRIO_PROTECT,
        }

        let ceiling = self.priority_ceiling.unwrap_or(0) as u32 & 0xFF;

        attr.bits() | (ceiling << CEILING_SHIFT)
    }
}
