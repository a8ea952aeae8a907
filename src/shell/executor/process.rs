use std::convert::Infallible;
use std::ffi::CString;
use std::os::fd::{IntoRawFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, pipe, ForkResult, Pid};

use super::status::ChildStatus;
use crate::shell::parser::ast::Direction;
use crate::shell::signals;

pub const STDIN_FILENO: RawFd = libc::STDIN_FILENO;
pub const STDOUT_FILENO: RawFd = libc::STDOUT_FILENO;

/// Both ends of an anonymous pipe, owned by the call that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeEnds {
    pub read: RawFd,
    pub write: RawFd,
}

/// The OS primitives the executor is written against.
pub trait ProcessOps: Sized {
    /// Starts a child process that runs `body` and exits with the code it
    /// returns. Returns the child's pid in the parent.
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32;

    fn pipe(&mut self) -> nix::Result<PipeEnds>;

    fn dup2(&mut self, fd: RawFd, target: RawFd) -> nix::Result<()>;

    fn close(&mut self, fd: RawFd) -> nix::Result<()>;

    /// `In` opens read-only, `Out` opens write/create/truncate.
    fn open(&mut self, path: &str, direction: Direction) -> nix::Result<RawFd>;

    /// Replaces the process image. Only ever returns on failure.
    fn exec(&mut self, argv: &[String]) -> nix::Result<Infallible>;

    /// Blocks until `pid` terminates.
    fn wait(&mut self, pid: Pid) -> nix::Result<ChildStatus>;
}

/// [`ProcessOps`] backed by the real system calls.
#[derive(Debug, Default)]
pub struct NixOps;

impl ProcessOps for NixOps {
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32,
    {
        // SAFETY: the shell runs a single thread, and the child only runs the
        // executor before it execs or exits.
        match unsafe { fork() }? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                let code = body(self);
                std::process::exit(code)
            }
        }
    }

    fn pipe(&mut self) -> nix::Result<PipeEnds> {
        let (read, write) = pipe()?;
        Ok(PipeEnds {
            read: read.into_raw_fd(),
            write: write.into_raw_fd(),
        })
    }

    fn dup2(&mut self, fd: RawFd, target: RawFd) -> nix::Result<()> {
        dup2(fd, target).map(drop)
    }

    fn close(&mut self, fd: RawFd) -> nix::Result<()> {
        close(fd)
    }

    fn open(&mut self, path: &str, direction: Direction) -> nix::Result<RawFd> {
        let flags = match direction {
            Direction::In => OFlag::O_RDONLY,
            Direction::Out => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        };
        open(path, flags | OFlag::O_CLOEXEC, Mode::from_bits_truncate(0o644))
    }

    fn exec(&mut self, argv: &[String]) -> nix::Result<Infallible> {
        let args = argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<CString>, _>>()
            .map_err(|_| Errno::EINVAL)?;
        let program = args.first().ok_or(Errno::EINVAL)?;
        // 否则管道读端提前退出时，写端只会收到 EPIPE
        signals::restore_sigpipe()?;
        execvp(program, &args)
    }

    fn wait(&mut self, pid: Pid) -> nix::Result<ChildStatus> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some(status) = ChildStatus::from_wait(status) {
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
