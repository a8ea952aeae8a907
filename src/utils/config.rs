use dotenv::dotenv;
use nix::unistd::{getuid, User};
use rustyline::EditMode;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub theme: String,
    pub config_dir: PathBuf,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub log_to_stderr: bool,
    pub home_dir: PathBuf,
    pub aliases: Option<String>,
}

impl Config {
    /// Home directory of the real user: passwd entry first, then `$HOME`.
    fn detect_home_dir() -> PathBuf {
        match User::from_uid(getuid()) {
            Ok(Some(user)) => user.dir,
            _ => env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/")),
        }
    }

    fn default_for(home_dir: PathBuf) -> Self {
        let config_dir = home_dir.join(".config/forksh");
        Config {
            name: String::from("forksh"),
            theme: String::from("default"),
            history_file: config_dir.join(".forksh_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            log_to_stderr: false,
            home_dir,
            aliases: None,
            config_dir,
        }
    }

    /// Builds the configuration from a variable lookup, on top of defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home_dir = lookup("FORKSH_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(Self::detect_home_dir);
        let mut config = Config::default_for(home_dir);

        if let Some(theme) = lookup("FORKSH_THEME") {
            config.theme = theme;
        }

        if let Some(editor) = lookup("FORKSH_EDITOR") {
            config.editor_mode = editor;
        }

        if let Some(history) = lookup("FORKSH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }

        if let Some(level) = lookup("FORKSH_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Some(dir) = lookup("FORKSH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup("FORKSH_LOG_STDERR") {
            config.log_to_stderr = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config.aliases = lookup("FORKSH_ALIASES");
        config
    }

    pub fn new() -> io::Result<Self> {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let config = Config::from_lookup(|key| env::var(key).ok());

        // 确保历史文件目录存在
        if let Some(parent) = config.history_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&config.logger_dir)?;

        Ok(config)
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
