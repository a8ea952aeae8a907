#[allow(clippy::module_inception)]
mod executor;
mod process;
#[cfg(test)]
pub(crate) mod recording;
mod status;

pub use executor::Executor;
pub use process::{NixOps, ProcessOps};
pub use status::ChildStatus;
