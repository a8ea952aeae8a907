use std::env;
use std::path::Path;

use log::warn;
use nix::unistd::{gethostname, getuid, User};

use crate::utils::path::{current_dir, prompt_dir};
use crate::utils::theme::Theme;

/// The pieces of `[user@host dir]> `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInfo {
    pub user: String,
    pub host: String,
    pub dir: String,
}

impl PromptInfo {
    pub fn collect(home: &Path) -> Self {
        Self {
            user: user_name(),
            host: short_hostname(),
            dir: prompt_dir(&current_dir(), home),
        }
    }

    pub fn render(&self) -> String {
        format!("[{}@{} {}]> ", self.user, self.host, self.dir)
    }
}

pub fn prompt(theme: &Theme, home: &Path) -> String {
    (theme.prompt_style)(PromptInfo::collect(home).render())
}

fn user_name() -> String {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => user.name,
        _ => env::var("USER").unwrap_or_else(|_| "?".to_string()),
    }
}

/// Hostname up to the first `.`.
fn short_hostname() -> String {
    match gethostname() {
        Ok(name) => name
            .to_string_lossy()
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(e) => {
            warn!("无法获取主机名: {}", e);
            "localhost".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let info = PromptInfo {
            user: "root".to_string(),
            host: "box".to_string(),
            dir: "~".to_string(),
        };
        assert_eq!(info.render(), "[root@box ~]> ");
    }

    #[test]
    fn test_short_hostname_has_no_domain() {
        assert!(!short_hostname().contains('.'));
    }
}
