//! Per-command failure taxonomy
//!
//! None of these reach the caller that enqueued the command: the drain loop
//! logs them and moves on to the next command.

use rflights_shared::StatusError;
use std::time::Duration;
use thiserror::Error;

/// Errors from running one script invocation to completion
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Script exited non-zero (-1 when terminated by a signal)
    #[error("Script exited with code {0}")]
    ScriptExit(i32),

    /// Script exited 0 but stdout was not a valid status payload
    #[error("Malformed script output: {0}")]
    MalformedResponse(#[from] StatusError),

    /// Script exceeded its time budget and was killed
    #[error("Script timed out after {0:?}")]
    Timeout(Duration),

    /// Script could not be started or its pipes could not be read
    #[error("Failed to run script: {0}")]
    Spawn(#[from] std::io::Error),
}

impl DispatchError {
    /// Short label for logs and counters
    pub fn label(&self) -> &'static str {
        match self {
            DispatchError::ScriptExit(_) => "exit",
            DispatchError::MalformedResponse(_) => "malformed",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Spawn(_) => "spawn",
        }
    }
}
