use std::collections::HashMap;

use log::{debug, warn};

/// Static name → expansion table applied to the first word of each command.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// The table every session starts with.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.aliases.insert(
            "ll".to_string(),
            vec!["ls".to_string(), "-l".to_string()],
        );
        table
    }

    /// Defines `name` as the words of `expansion`. Blank expansions are ignored.
    pub fn define(&mut self, name: &str, expansion: &str) -> Result<(), shell_words::ParseError> {
        let words = shell_words::split(expansion)?;
        let name = name.trim();
        if name.is_empty() || words.is_empty() {
            warn!("忽略空别名: {:?}={:?}", name, expansion);
            return Ok(());
        }
        debug!("定义别名: {} -> {:?}", name, words);
        self.aliases.insert(name.to_string(), words);
        Ok(())
    }

    /// Loads `name=expansion` pairs separated by `;`.
    pub fn load_definitions(&mut self, defs: &str) {
        for entry in defs.split(';').filter(|e| !e.trim().is_empty()) {
            match entry.split_once('=') {
                Some((name, expansion)) => {
                    if let Err(e) = self.define(name, expansion) {
                        warn!("无法解析别名 {}: {}", entry, e);
                    }
                }
                None => warn!("别名缺少 '=': {}", entry),
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&[String]> {
        self.aliases.get(name).map(Vec::as_slice)
    }

    /// Replaces `argv[0]` by its expansion, once. The expansion itself is not
    /// looked up again.
    pub fn expand(&self, argv: &[String]) -> Vec<String> {
        match argv.split_first() {
            Some((first, rest)) => match self.resolve(first) {
                Some(expansion) => expansion.iter().chain(rest).cloned().collect(),
                None => argv.to_vec(),
            },
            None => Vec::new(),
        }
    }
}
