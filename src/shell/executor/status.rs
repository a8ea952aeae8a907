use std::fmt;

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// How a direct child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Exited { pid: Pid, code: i32 },
    Signaled { pid: Pid, signal: Signal },
}

impl ChildStatus {
    /// Keeps only terminal states; stop/continue notifications yield `None`.
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(pid, code) => Some(ChildStatus::Exited { pid, code }),
            WaitStatus::Signaled(pid, signal, _core_dumped) => {
                Some(ChildStatus::Signaled { pid, signal })
            }
            _ => None,
        }
    }

    pub fn pid(&self) -> Pid {
        match self {
            ChildStatus::Exited { pid, .. } | ChildStatus::Signaled { pid, .. } => *pid,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChildStatus::Exited { code: 0, .. })
    }

    /// Exit code as a shell reports it: signals map to `128 + signo`.
    pub fn code(&self) -> i32 {
        match self {
            ChildStatus::Exited { code, .. } => *code,
            ChildStatus::Signaled { signal, .. } => 128 + *signal as i32,
        }
    }

    /// True when the process died of SIGPIPE, directly or as the `128 + signo`
    /// code of an intermediate child.
    pub fn is_broken_pipe(&self) -> bool {
        self.code() == 128 + Signal::SIGPIPE as i32
    }

    /// Status of a pipe from the statuses of its two sides. A failing right
    /// side wins, then a failing left side, otherwise the right side. A left
    /// side stopped by SIGPIPE only lost its reader and does not count as a
    /// failure.
    pub fn combine(left: ChildStatus, right: ChildStatus) -> ChildStatus {
        if !right.is_success() || left.is_success() || left.is_broken_pipe() {
            right
        } else {
            left
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildStatus::Exited { code, .. } => write!(f, "exit {}", code),
            ChildStatus::Signaled { signal, .. } => write!(f, "killed by {}", signal.as_str()),
        }
    }
}
