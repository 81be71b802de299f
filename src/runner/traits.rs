//! Script runner trait abstraction for pluggable process backends

use crate::error::DispatchError;
use async_trait::async_trait;
use bytes::Bytes;
use rflights_shared::ScriptKind;

/// Fully materialized result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub exit_code: i32,
    pub stdout: Bytes,
}

/// Runs one external script invocation to completion
///
/// Implementations must not return before the process has exited (or been
/// killed). A non-zero exit is reported as [`DispatchError::ScriptExit`].
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, kind: ScriptKind, args: &[String]) -> Result<ScriptOutput, DispatchError>;

    /// Human-readable name for this runner
    fn name(&self) -> &'static str;
}
