use nix::errno::Errno;
use thiserror::Error;

use super::parser::ast::Direction;

/// Exit code of a leaf whose program could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code of a leaf whose program exists but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit code of a process that could not open its redirect target.
pub const EXIT_FILE_ERROR: i32 = 1;
/// Exit code of a process whose fork/pipe/dup2 plumbing failed.
pub const EXIT_SPAWN_ERROR: i32 = 2;

/// Rejected input line. Reported to the user; the line is abandoned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated quote starting at column {column}")]
    UnterminatedQuote { column: usize },

    #[error("missing file name after `{}`", .direction.symbol())]
    MissingRedirectTarget { direction: Direction },

    #[error("missing command before `{0}`")]
    MissingCommand(char),

    #[error("missing command after `|`")]
    MissingPipeTarget,
}

/// Failure inside a process that is realizing part of a command tree.
///
/// Every variant is fatal to the process it happens in and never to the
/// shell itself.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{op} failed: {source}")]
    Spawn {
        op: &'static str,
        #[source]
        source: Errno,
    },

    #[error("{program}: {}", exec_reason(.source))]
    Exec {
        program: String,
        #[source]
        source: Errno,
    },

    #[error("{path}: cannot open for {}: {source}", .direction.verb())]
    File {
        path: String,
        direction: Direction,
        #[source]
        source: Errno,
    },

    #[error("empty command")]
    EmptyCommand,
}

impl ProcessError {
    pub fn spawn(op: &'static str) -> impl FnOnce(Errno) -> Self {
        move |source| ProcessError::Spawn { op, source }
    }

    /// Status the failing process terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Spawn { .. } | ProcessError::EmptyCommand => EXIT_SPAWN_ERROR,
            ProcessError::Exec {
                source: Errno::ENOENT,
                ..
            } => EXIT_NOT_FOUND,
            ProcessError::Exec { .. } => EXIT_NOT_EXECUTABLE,
            ProcessError::File { .. } => EXIT_FILE_ERROR,
        }
    }
}

fn exec_reason(errno: &Errno) -> String {
    match *errno {
        Errno::ENOENT => "command not found".to_string(),
        Errno::EACCES => "permission denied".to_string(),
        other => other.desc().to_string(),
    }
}
