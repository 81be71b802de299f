//! External script execution
//!
//! Runs exactly one control or remote script invocation at a time on behalf
//! of the dispatcher.

#[cfg(test)]
pub(crate) mod fake;
mod process;
mod traits;

pub use process::{ProcessRunner, RunnerConfig};
pub use traits::ScriptRunner;
