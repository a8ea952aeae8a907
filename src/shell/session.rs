use std::path::PathBuf;

use super::alias::AliasTable;
use crate::utils::config::Config;

/// State shared by the builtin dispatcher and the executor for the lifetime
/// of the shell. Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Session {
    pub home_dir: PathBuf,
    pub aliases: AliasTable,
}

impl Session {
    pub fn new(home_dir: PathBuf, aliases: AliasTable) -> Self {
        Self { home_dir, aliases }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut aliases = AliasTable::with_defaults();
        if let Some(defs) = &config.aliases {
            aliases.load_definitions(defs);
        }
        Self::new(config.home_dir.clone(), aliases)
    }
}
