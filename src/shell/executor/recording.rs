//! A [`ProcessOps`] that performs nothing and records every call.
//!
//! Child bodies run inline, so the log reads as a depth-first trace of the
//! process tree. A successful exec unwinds out of the child body the way a
//! real exec never returns.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::os::fd::RawFd;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use nix::errno::Errno;
use nix::unistd::Pid;

use super::process::{PipeEnds, ProcessOps};
use super::status::ChildStatus;
use crate::shell::parser::ast::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fork(i32),
    Exit(i32, i32),
    Pipe(RawFd, RawFd),
    Dup2(RawFd, RawFd),
    Close(RawFd),
    Open(String, Direction),
    Exec(Vec<String>),
    Wait(i32),
}

struct ImageReplaced(i32);

pub struct RecordingOps {
    pub calls: Vec<Call>,
    next_pid: i32,
    next_fd: RawFd,
    forks: usize,
    fail_fork: Option<usize>,
    missing_programs: HashSet<String>,
    missing_files: HashSet<String>,
    exit_codes: HashMap<String, i32>,
    statuses: HashMap<i32, i32>,
}

impl RecordingOps {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            next_pid: 100,
            next_fd: 10,
            forks: 0,
            fail_fork: None,
            missing_programs: HashSet::new(),
            missing_files: HashSet::new(),
            exit_codes: HashMap::new(),
            statuses: HashMap::new(),
        }
    }

    /// Exec of `program` fails with `ENOENT`.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.missing_programs.insert(program.to_string());
        self
    }

    /// Opening `path` for reading fails with `ENOENT`.
    pub fn missing_file(mut self, path: &str) -> Self {
        self.missing_files.insert(path.to_string());
        self
    }

    /// `program` execs fine and later exits with `code`.
    pub fn exits_with(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    /// The `nth` fork (0-based) fails with `EAGAIN`.
    pub fn failing_fork(mut self, nth: usize) -> Self {
        self.fail_fork = Some(nth);
        self
    }

    pub fn execs(&self) -> Vec<Vec<String>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Exec(argv) => Some(argv.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProcessOps for RecordingOps {
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32,
    {
        let nth = self.forks;
        self.forks += 1;
        if self.fail_fork == Some(nth) {
            return Err(Errno::EAGAIN);
        }

        let pid = self.next_pid;
        self.next_pid += 1;
        self.calls.push(Call::Fork(pid));

        let this = &mut *self;
        let code = match catch_unwind(AssertUnwindSafe(move || body(this))) {
            Ok(code) => code,
            Err(payload) => match payload.downcast::<ImageReplaced>() {
                Ok(replaced) => replaced.0,
                Err(other) => resume_unwind(other),
            },
        };
        self.calls.push(Call::Exit(pid, code));
        self.statuses.insert(pid, code);
        Ok(Pid::from_raw(pid))
    }

    fn pipe(&mut self) -> nix::Result<PipeEnds> {
        let ends = PipeEnds {
            read: self.next_fd,
            write: self.next_fd + 1,
        };
        self.next_fd += 2;
        self.calls.push(Call::Pipe(ends.read, ends.write));
        Ok(ends)
    }

    fn dup2(&mut self, fd: RawFd, target: RawFd) -> nix::Result<()> {
        self.calls.push(Call::Dup2(fd, target));
        Ok(())
    }

    fn close(&mut self, fd: RawFd) -> nix::Result<()> {
        self.calls.push(Call::Close(fd));
        Ok(())
    }

    fn open(&mut self, path: &str, direction: Direction) -> nix::Result<RawFd> {
        self.calls.push(Call::Open(path.to_string(), direction));
        if direction == Direction::In && self.missing_files.contains(path) {
            return Err(Errno::ENOENT);
        }
        let fd = self.next_fd;
        self.next_fd += 1;
        Ok(fd)
    }

    fn exec(&mut self, argv: &[String]) -> nix::Result<Infallible> {
        self.calls.push(Call::Exec(argv.to_vec()));
        let program = argv.first().map(String::as_str).unwrap_or_default();
        if self.missing_programs.contains(program) {
            return Err(Errno::ENOENT);
        }
        let code = self.exit_codes.get(program).copied().unwrap_or(0);
        resume_unwind(Box::new(ImageReplaced(code)))
    }

    fn wait(&mut self, pid: Pid) -> nix::Result<ChildStatus> {
        self.calls.push(Call::Wait(pid.as_raw()));
        let code = *self.statuses.get(&pid.as_raw()).ok_or(Errno::ECHILD)?;
        Ok(ChildStatus::Exited { pid, code })
    }
}
