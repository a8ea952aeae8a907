use std::io;

use log::{debug, error};

use super::builtins::{self, BuiltinOutcome};
use super::error::{ParseError, ProcessError};
use super::executor::{ChildStatus, Executor, ProcessOps};
use super::parser::lexer::trim;
use super::parser::Parser;
use super::session::Session;

/// What became of one input line.
#[derive(Debug)]
pub enum LineOutcome {
    Blank,
    Handled,
    Quit,
    BuiltinFailed(io::Error),
    ParseFailed(ParseError),
    SpawnFailed(ProcessError),
    Finished(ChildStatus),
}

/// Builtins first, then parse, then run the tree. Nothing is forked for a
/// builtin or for a line that does not parse.
pub fn evaluate<P: ProcessOps>(line: &str, ops: &mut P, session: &Session) -> LineOutcome {
    let line = trim(line);
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    match builtins::dispatch(line, session) {
        BuiltinOutcome::NotBuiltin => {}
        BuiltinOutcome::Handled => return LineOutcome::Handled,
        BuiltinOutcome::Failed(e) => return LineOutcome::BuiltinFailed(e),
        BuiltinOutcome::Quit => return LineOutcome::Quit,
    }

    let command = match Parser::new(line).parse_command() {
        Ok(command) => command,
        Err(e) => {
            debug!("解析失败: {:?} {}", line, e);
            return LineOutcome::ParseFailed(e);
        }
    };
    debug!("解析结果: {:?}", command);

    match Executor::new(ops, session).execute(&command) {
        Ok(Some(status)) => LineOutcome::Finished(status),
        Ok(None) => LineOutcome::Blank,
        Err(e) => {
            error!("执行失败: {}", e);
            LineOutcome::SpawnFailed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::alias::AliasTable;
    use crate::shell::executor::recording::{Call, RecordingOps};
    use serial_test::serial;
    use std::path::PathBuf;

    fn session() -> Session {
        Session::new(PathBuf::from("/home/zako"), AliasTable::with_defaults())
    }

    fn forks(ops: &RecordingOps) -> usize {
        ops.calls
            .iter()
            .filter(|call| matches!(call, Call::Fork(_)))
            .count()
    }

    #[test]
    fn test_blank_lines_fork_nothing() {
        let mut ops = RecordingOps::new();
        assert!(matches!(evaluate(" \t ", &mut ops, &session()), LineOutcome::Blank));
        assert!(matches!(evaluate(r#""""#, &mut ops, &session()), LineOutcome::Blank));
        assert!(ops.calls.is_empty());
    }

    #[test]
    fn test_parse_error_abandons_line() {
        let mut ops = RecordingOps::new();
        let outcome = evaluate(r#"echo "abc"#, &mut ops, &session());
        assert!(matches!(
            outcome,
            LineOutcome::ParseFailed(ParseError::UnterminatedQuote { column: 5 })
        ));
        let outcome = evaluate("ls |", &mut ops, &session());
        assert!(matches!(
            outcome,
            LineOutcome::ParseFailed(ParseError::MissingPipeTarget)
        ));
        assert!(ops.calls.is_empty());
    }

    #[test]
    fn test_quit_forks_nothing() {
        let mut ops = RecordingOps::new();
        assert!(matches!(evaluate("quit", &mut ops, &session()), LineOutcome::Quit));
        assert!(matches!(evaluate(" exit ", &mut ops, &session()), LineOutcome::Quit));
        assert!(ops.calls.is_empty());
    }

    #[test]
    fn test_failed_cd_forks_nothing() {
        let mut ops = RecordingOps::new();
        let outcome = evaluate("cd /forksh/no/such/dir", &mut ops, &session());
        assert!(matches!(outcome, LineOutcome::BuiltinFailed(_)));
        assert!(ops.calls.is_empty());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    #[serial]
    fn test_cd_runs_in_shell_process() {
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();
        let mut ops = RecordingOps::new();

        let outcome = evaluate(&format!("cd {}", target.display()), &mut ops, &session());
        assert!(matches!(outcome, LineOutcome::Handled));
        assert_eq!(std::env::current_dir().unwrap(), target);
        assert!(ops.calls.is_empty());

        std::env::set_current_dir(original).unwrap();
    }

    #[test]
    fn test_command_line_forks() {
        let mut ops = RecordingOps::new().exits_with("wc", 3);
        let outcome = evaluate("ls | wc", &mut ops, &session());
        match outcome {
            LineOutcome::Finished(status) => assert_eq!(status.code(), 3),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(forks(&ops), 3);
    }

    #[test]
    fn test_line_fork_failure_is_reported() {
        let mut ops = RecordingOps::new().failing_fork(0);
        let outcome = evaluate("ls", &mut ops, &session());
        assert!(matches!(
            outcome,
            LineOutcome::SpawnFailed(ProcessError::Spawn { op: "fork", .. })
        ));
    }
}
