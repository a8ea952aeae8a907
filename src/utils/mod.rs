pub mod config;
pub mod log;
pub mod path;
pub mod prompt;
pub mod theme;
