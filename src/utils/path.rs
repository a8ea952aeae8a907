use std::borrow::Cow;
use std::env;
use std::path::Path;

use log::error;

pub fn basename(path: &str) -> Cow<'_, str> {
    let mut pieces = path.trim_end_matches('/').rsplit('/');
    match pieces.next() {
        Some(p) if !p.is_empty() => p.into(),
        _ => path.into(),
    }
}

pub fn current_dir() -> String {
    let _current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("forksh: PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    let current_dir = match _current_dir.to_str() {
        Some(x) => x,
        None => {
            error!("forksh: PROMPT: to_str error");
            return String::new();
        }
    };

    current_dir.to_string()
}

/// Directory as the prompt shows it: `~` for home, `/` for the root,
/// otherwise only the last component.
pub fn prompt_dir(cwd: &str, home: &Path) -> String {
    if Path::new(cwd) == home {
        "~".to_string()
    } else if cwd == "/" || cwd.is_empty() {
        cwd.to_string()
    } else {
        basename(cwd).into_owned()
    }
}
