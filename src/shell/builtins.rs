use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::parser::lexer::{is_whitespace, trim, Lexer};
use super::session::Session;

#[derive(Debug)]
pub enum BuiltinOutcome {
    NotBuiltin,
    Handled,
    Failed(io::Error),
    Quit,
}

/// Runs the line in the shell process itself when it names a builtin.
///
/// Must be called before the line is parsed: a builtin never reaches the
/// executor.
pub fn dispatch(line: &str, session: &Session) -> BuiltinOutcome {
    let line = trim(line);
    let (name, rest) = match line.find(is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    };

    match name {
        "cd" => match builtin_cd(rest, &session.home_dir) {
            Ok(()) => BuiltinOutcome::Handled,
            Err(e) => BuiltinOutcome::Failed(e),
        },
        "quit" | "exit" if trim(rest).is_empty() => BuiltinOutcome::Quit,
        _ => BuiltinOutcome::NotBuiltin,
    }
}

fn builtin_cd(args: &str, home: &Path) -> io::Result<()> {
    let words = Lexer::new(args)
        .words()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let target = match words.as_slice() {
        [] => home.to_path_buf(),
        [dir] => cd_target(dir, home),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cd: too many arguments",
            ))
        }
    };
    debug!("切换目录: {}", target.display());
    std::env::set_current_dir(&target)
        .map_err(|e| io::Error::new(e.kind(), format!("cd: {}: {}", target.display(), e)))
}

/// Resolves a `cd` argument, substituting a leading `~` with `home`.
pub fn cd_target(arg: &str, home: &Path) -> PathBuf {
    let home = home.to_string_lossy();
    let home: &str = &home;
    PathBuf::from(shellexpand::tilde_with_context(arg, || Some(home)).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::alias::AliasTable;
    use serial_test::serial;

    fn session(home: &Path) -> Session {
        Session::new(home.to_path_buf(), AliasTable::new())
    }

    #[test]
    fn test_cd_target() {
        let home = Path::new("/home/zako");
        assert_eq!(cd_target("~", home), PathBuf::from("/home/zako"));
        assert_eq!(cd_target("~/src", home), PathBuf::from("/home/zako/src"));
        assert_eq!(cd_target("/tmp", home), PathBuf::from("/tmp"));
        assert_eq!(cd_target("rel/dir", home), PathBuf::from("rel/dir"));
    }

    #[test]
    fn test_not_builtin() {
        let s = session(Path::new("/"));
        assert!(matches!(dispatch("ls -l", &s), BuiltinOutcome::NotBuiltin));
        assert!(matches!(dispatch("cdrom", &s), BuiltinOutcome::NotBuiltin));
        assert!(matches!(dispatch("quitter", &s), BuiltinOutcome::NotBuiltin));
        assert!(matches!(dispatch("exit now", &s), BuiltinOutcome::NotBuiltin));
    }

    #[test]
    fn test_quit() {
        let s = session(Path::new("/"));
        assert!(matches!(dispatch("  quit ", &s), BuiltinOutcome::Quit));
        assert!(matches!(dispatch("exit", &s), BuiltinOutcome::Quit));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    #[serial]
    fn test_cd_changes_directory() {
        let original = std::env::current_dir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let home_path = home.path().canonicalize().unwrap();
        std::fs::create_dir(home_path.join("sub dir")).unwrap();
        let s = session(&home_path);

        assert!(matches!(dispatch("cd", &s), BuiltinOutcome::Handled));
        assert_eq!(std::env::current_dir().unwrap(), home_path);

        assert!(matches!(
            dispatch(r#"cd "~/sub dir""#, &s),
            BuiltinOutcome::Handled
        ));
        assert_eq!(std::env::current_dir().unwrap(), home_path.join("sub dir"));

        assert!(matches!(
            dispatch("cd ~/missing", &s),
            BuiltinOutcome::Failed(_)
        ));
        assert!(matches!(dispatch("cd a b", &s), BuiltinOutcome::Failed(_)));
        assert_eq!(std::env::current_dir().unwrap(), home_path.join("sub dir"));

        std::env::set_current_dir(original).unwrap();
    }
}
