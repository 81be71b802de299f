//! Host bridge wire types
//!
//! One JSON object per line in each direction:
//! ```text
//! -> {"op":"set_brightness","light":"tao95","part":"main","value":60}
//! <- {"ok":true,"queued":true}
//! ```

use crate::dispatcher::QueueStatus;
use rflights_shared::LightState;
use serde::{Deserialize, Serialize};

/// A request from the home-automation host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostRequest {
    Init {
        light: String,
    },
    GetState {
        id: String,
    },
    GetOn {
        light: String,
        #[serde(default)]
        part: Option<String>,
    },
    GetBrightness {
        light: String,
        #[serde(default)]
        part: Option<String>,
    },
    SetOn {
        light: String,
        #[serde(default)]
        part: Option<String>,
        value: bool,
    },
    SetBrightness {
        light: String,
        #[serde(default)]
        part: Option<String>,
        value: u8,
    },
    /// Color temperature in kelvin
    SetColorTemp {
        light: String,
        #[serde(default)]
        part: Option<String>,
        value: u32,
    },
    Remote {
        light: String,
        button: String,
    },
    Sync {
        light: String,
    },
    Queue,
}

impl HostRequest {
    /// Wire name of this request
    pub fn op(&self) -> &'static str {
        match self {
            HostRequest::Init { .. } => "init",
            HostRequest::GetState { .. } => "get_state",
            HostRequest::GetOn { .. } => "get_on",
            HostRequest::GetBrightness { .. } => "get_brightness",
            HostRequest::SetOn { .. } => "set_on",
            HostRequest::SetBrightness { .. } => "set_brightness",
            HostRequest::SetColorTemp { .. } => "set_color_temp",
            HostRequest::Remote { .. } => "remote",
            HostRequest::Sync { .. } => "sync",
            HostRequest::Queue => "queue",
        }
    }
}

/// Reply to one request; unset fields are omitted on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LightState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queued: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Encode as a single JSON line (without the trailing newline)
    pub fn to_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"encode failed: {}"}}"#, e))
    }
}
