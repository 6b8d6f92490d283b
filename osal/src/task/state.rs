/// Lifecycle of a [`Task`](super::Task) handle.
///
/// `Created → Running → Joined | Detached`. A handle is returned to the
/// caller in `Running`; `Joined` and `Detached` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// The thread was spawned but has not applied its attributes yet.
    Created,

    /// The thread is running, or has finished and awaits `join`.
    Running,

    /// The result was collected by [`Task::join`](super::Task::join).
    Joined,

    /// The handle was released by [`Task::detach`](super::Task::detach).
    Detached,
}

impl TaskState {
    /// Whether `join` / `detach` may still be called.
    pub fn is_joinable(self) -> bool {
        matches!(self, TaskState::Created | TaskState::Running)
    }
}
