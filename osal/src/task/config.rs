use crate::error::{Error, Result};

/// Scheduling policy of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedPolicy {
    /// Default time-sharing policy; priority must be 0.
    #[default]
    Other,
    /// Real-time first-in first-out.
    Fifo,
    /// Real-time round robin.
    RoundRobin,
}

/// Set of CPUs a task may run on, for CPUs `0..CpuSet::MAX_CPUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuSet {
    mask: u64,
}

impl CpuSet {
    pub const MAX_CPUS: usize = 64;

    /// An empty set.
    pub const fn new() -> Self {
        Self { mask: 0 }
    }

    /// A set holding only `cpu`.
    pub fn single(cpu: usize) -> Result<Self> {
        let mut set = Self::new();
        set.insert(cpu)?;
        Ok(set)
    }

    /// Builds a set from a bit mask, bit `n` standing for CPU `n`.
    pub const fn from_mask(mask: u64) -> Self {
        Self { mask }
    }

    /// The set as a bit mask.
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// Adds `cpu`; `InvalidParam` beyond [`MAX_CPUS`](Self::MAX_CPUS).
    pub fn insert(&mut self, cpu: usize) -> Result<()> {
        if cpu >= Self::MAX_CPUS {
            return Err(Error::InvalidParam);
        }
        self.mask |= 1u64 << cpu;
        Ok(())
    }

    /// Removes `cpu`; out-of-range CPUs are ignored.
    pub fn remove(&mut self, cpu: usize) {
        if cpu < Self::MAX_CPUS {
            self.mask &= !(1u64 << cpu);
        }
    }

    /// Whether `cpu` is in the set.
    pub fn contains(&self, cpu: usize) -> bool {
        cpu < Self::MAX_CPUS && self.mask & (1u64 << cpu) != 0
    }

    /// Whether the set holds no CPU.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Number of CPUs in the set.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// CPUs in the set, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::MAX_CPUS).filter(|&cpu| self.contains(cpu))
    }
}

/// Attributes of a new [`Task`](super::Task).
///
/// # Examples
///
/// ```rust,ignore
/// let config = TaskConfig::new()
///     .name("control-loop")
///     .policy(SchedPolicy::RoundRobin)
///     .priority(50)
///     .affinity(CpuSet::single(1)?)
///     .stack_size(256 * 1024);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskConfig {
    pub(crate) name: Option<String>,
    pub(crate) policy: SchedPolicy,
    pub(crate) priority: i32,
    pub(crate) affinity: Option<CpuSet>,
    pub(crate) stack_size: Option<usize>,
}

impl TaskConfig {
    /// Default attributes: unnamed, [`SchedPolicy::Other`], priority 0, no
    /// affinity, platform stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the scheduling policy.
    pub fn policy(mut self, policy: SchedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the priority within the range of the chosen policy.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pins the task to `cpus`.
    pub fn affinity(mut self, cpus: CpuSet) -> Self {
        self.affinity = Some(cpus);
        self
    }

    /// Sets the stack size in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Whether scheduling attributes differ from the platform default.
    pub(crate) fn has_scheduling(&self) -> bool {
        self.policy != SchedPolicy::Other || self.priority != 0
    }

    /// Rejects attributes no backend can apply.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.as_deref().is_some_and(|n| n.contains('\0')) {
            return Err(Error::InvalidParam);
        }
        if self.affinity.is_some_and(|cpus| cpus.is_empty()) {
            return Err(Error::InvalidParam);
        }
        if self.stack_size == Some(0) {
            return Err(Error::InvalidParam);
        }
        Ok(())
    }
}
