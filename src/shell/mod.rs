mod alias;
mod builtins;
mod error;
mod executor;
mod line;
mod parser;
mod readline;
mod session;
#[allow(clippy::module_inception)]
mod shell;
mod signals;

pub use shell::Shell;
