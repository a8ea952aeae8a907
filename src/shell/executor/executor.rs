use std::convert::Infallible;
use std::os::fd::RawFd;

use colored::Colorize;
use log::{debug, error, warn};

use super::process::{PipeEnds, ProcessOps, STDIN_FILENO, STDOUT_FILENO};
use super::status::ChildStatus;
use crate::shell::error::ProcessError;
use crate::shell::parser::ast::{Command, Direction};
use crate::shell::session::Session;

/// Maps a command tree onto [`ProcessOps`] calls.
///
/// Every node is realized inside a process of its own: `execute` forks one
/// child per input line and everything below runs in descendants of it, so
/// no failure down the tree can take the shell with it.
pub struct Executor<'a, P: ProcessOps> {
    ops: &'a mut P,
    session: &'a Session,
}

impl<'a, P: ProcessOps> Executor<'a, P> {
    pub fn new(ops: &'a mut P, session: &'a Session) -> Self {
        Self { ops, session }
    }

    /// Runs one parsed line from the shell process. A blank line is a no-op
    /// and yields `None`.
    pub fn execute(&mut self, command: &Command) -> Result<Option<ChildStatus>, ProcessError> {
        if command.is_empty() {
            debug!("空命令，跳过");
            return Ok(None);
        }

        debug!("执行命令树: {}", command);
        let session = self.session;
        let pid = self
            .ops
            .spawn(|ops| Executor::new(ops, session).run(command))
            .map_err(ProcessError::spawn("fork"))?;
        debug!("命令进程已启动: {}", pid);

        let status = self.ops.wait(pid).map_err(ProcessError::spawn("waitpid"))?;
        debug!("命令进程结束: {} {}", pid, status);
        Ok(Some(status))
    }

    /// Realizes `command` in the current process and returns the code this
    /// process must exit with.
    fn run(&mut self, command: &Command) -> i32 {
        match self.realize(command) {
            Ok(status) => status.code(),
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&self, err: &ProcessError) -> i32 {
        error!("{}", err);
        eprintln!("{} {}", "forksh:".bright_red(), err);
        err.exit_code()
    }

    fn realize(&mut self, command: &Command) -> Result<ChildStatus, ProcessError> {
        match command {
            Command::Exec { argv } => match self.exec(argv)? {},
            Command::Pipe { left, right } => self.pipe(left, right),
            Command::Redirect {
                inner,
                direction,
                path,
            } => self.redirect(inner, *direction, path),
        }
    }

    fn exec(&mut self, argv: &[String]) -> Result<Infallible, ProcessError> {
        let argv = self
            .session
            .aliases
            .expand(argv)
            .into_iter()
            .filter(|arg| !arg.trim().is_empty())
            .collect::<Vec<String>>();
        let program = argv.first().cloned().ok_or(ProcessError::EmptyCommand)?;

        debug!("exec: {:?}", argv);
        self.ops
            .exec(&argv)
            .map_err(|source| ProcessError::Exec { program, source })
    }

    fn pipe(&mut self, left: &Command, right: &Command) -> Result<ChildStatus, ProcessError> {
        let ends = self.ops.pipe().map_err(ProcessError::spawn("pipe"))?;
        let session = self.session;

        let left_pid = self.ops.spawn(|ops| {
            let mut child = Executor::new(ops, session);
            match child.attach(ends.read, ends.write, STDOUT_FILENO) {
                Ok(()) => child.run(left),
                Err(e) => child.fail(&e),
            }
        });
        let left_pid = match left_pid {
            Ok(pid) => pid,
            Err(e) => {
                self.close_ends(ends);
                return Err(ProcessError::spawn("fork")(e));
            }
        };

        let right_pid = self.ops.spawn(|ops| {
            let mut child = Executor::new(ops, session);
            match child.attach(ends.write, ends.read, STDIN_FILENO) {
                Ok(()) => child.run(right),
                Err(e) => child.fail(&e),
            }
        });

        // 父进程不参与数据传输
        self.close_ends(ends);

        let right_pid = match right_pid {
            Ok(pid) => pid,
            Err(e) => {
                if let Ok(status) = self.ops.wait(left_pid) {
                    self.note(&status);
                }
                return Err(ProcessError::spawn("fork")(e));
            }
        };
        debug!("管道进程已启动: {} | {}", left_pid, right_pid);

        let left_status = self.ops.wait(left_pid);
        let right_status = self.ops.wait(right_pid);
        let left_status = left_status.map_err(ProcessError::spawn("waitpid"))?;
        let right_status = right_status.map_err(ProcessError::spawn("waitpid"))?;
        self.note(&left_status);
        self.note(&right_status);
        Ok(ChildStatus::combine(left_status, right_status))
    }

    fn redirect(
        &mut self,
        inner: &Command,
        direction: Direction,
        path: &str,
    ) -> Result<ChildStatus, ProcessError> {
        let session = self.session;
        let pid = self
            .ops
            .spawn(|ops| {
                let mut child = Executor::new(ops, session);
                match child.open_onto(path, direction) {
                    Ok(()) => child.run(inner),
                    Err(e) => child.fail(&e),
                }
            })
            .map_err(ProcessError::spawn("fork"))?;
        debug!("重定向进程已启动: {} {} {}", pid, direction.symbol(), path);

        let status = self.ops.wait(pid).map_err(ProcessError::spawn("waitpid"))?;
        self.note(&status);
        Ok(status)
    }

    /// Child side of a pipe: drop the end we do not use and move the other
    /// onto `target`.
    fn attach(&mut self, unused: RawFd, used: RawFd, target: RawFd) -> Result<(), ProcessError> {
        self.ops.close(unused).map_err(ProcessError::spawn("close"))?;
        self.move_fd(used, target)
    }

    fn open_onto(&mut self, path: &str, direction: Direction) -> Result<(), ProcessError> {
        let fd = self
            .ops
            .open(path, direction)
            .map_err(|source| ProcessError::File {
                path: path.to_string(),
                direction,
                source,
            })?;
        let target = match direction {
            Direction::In => STDIN_FILENO,
            Direction::Out => STDOUT_FILENO,
        };
        self.move_fd(fd, target)
    }

    fn move_fd(&mut self, fd: RawFd, target: RawFd) -> Result<(), ProcessError> {
        if fd == target {
            return Ok(());
        }
        self.ops
            .dup2(fd, target)
            .map_err(ProcessError::spawn("dup2"))?;
        self.ops.close(fd).map_err(ProcessError::spawn("close"))
    }

    fn close_ends(&mut self, ends: PipeEnds) {
        for fd in [ends.read, ends.write] {
            if let Err(e) = self.ops.close(fd) {
                warn!("关闭管道描述符 {} 失败: {}", fd, e);
            }
        }
    }

    fn note(&self, status: &ChildStatus) {
        if !status.is_success() {
            warn!("子进程 {} 异常结束: {}", status.pid(), status);
        }
    }
}
