//! RF Lights Shared Types
//!
//! This crate provides the light state model and the codec for the status
//! payload emitted by the external control script.

pub mod model;
pub mod status;

// Re-export commonly used types at crate root
pub use model::{light_id, Command, LightState, ScriptKind, DEFAULT_PART};
pub use status::{parse_status, StatusError, StatusPayload, StatusUpdate};

/// Timing parameters for script invocations
pub mod timing {
    /// Default hard timeout for a single script invocation, in seconds
    pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 30;
}

/// Brightness bounds accepted by the fixtures
pub mod brightness {
    /// Lowest brightness value
    pub const MIN: u8 = 0;

    /// Highest brightness value (also the power-on default)
    pub const MAX: u8 = 100;
}
