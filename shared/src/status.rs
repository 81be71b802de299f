//! Status payload codec for control-script output
//!
//! A successful control invocation writes either nothing or a single JSON
//! object to stdout:
//! ```text
//! { "light": "tao95", "power": true, "brightness": 80,
//!   "parts": [ { "partName": "main", "power": true, "brightness": 60 } ] }
//! ```
//!
//! `parts` is optional. Unknown fields (color temperature etc.) are ignored.

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::brightness;
use crate::model::{light_id, LightState, DEFAULT_PART};

/// `(identifier, state)` pairs to merge into the state cache
pub type StatusUpdate = Vec<(String, LightState)>;

/// Errors that can occur while decoding script output
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Invalid status JSON: {source}")]
    InvalidJson {
        raw: Bytes,
        #[source]
        source: serde_json::Error,
    },

    #[error("Field {field} out of range: {value}")]
    OutOfRange {
        raw: Bytes,
        field: String,
        value: i64,
    },

    #[error("Empty light name in status payload")]
    EmptyName { raw: Bytes },
}

impl StatusError {
    /// The raw stdout that failed to decode
    pub fn raw(&self) -> &Bytes {
        match self {
            StatusError::InvalidJson { raw, .. }
            | StatusError::OutOfRange { raw, .. }
            | StatusError::EmptyName { raw } => raw,
        }
    }
}

/// Top-level status object written by the control script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusPayload {
    pub light: String,
    pub power: bool,
    pub brightness: i64,
    #[serde(default)]
    pub parts: Vec<PartStatus>,
}

/// Status of one named part of a fixture
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartStatus {
    #[serde(rename = "partName")]
    pub part_name: String,
    pub power: bool,
    pub brightness: i64,
}

impl StatusPayload {
    /// Validate the payload and flatten it into cache entries
    ///
    /// The top-level values land under `"<light>-default"`, each part under
    /// `"<light>-<partName>"`.
    fn into_update(self, raw: &Bytes) -> Result<StatusUpdate, StatusError> {
        if self.light.is_empty() {
            return Err(StatusError::EmptyName { raw: raw.clone() });
        }

        let mut update = Vec::with_capacity(1 + self.parts.len());
        update.push((
            light_id(&self.light, DEFAULT_PART),
            LightState {
                on: self.power,
                brightness: checked_brightness(raw, "brightness", self.brightness)?,
            },
        ));

        for part in self.parts {
            if part.part_name.is_empty() {
                return Err(StatusError::EmptyName { raw: raw.clone() });
            }
            let field = format!("parts.{}.brightness", part.part_name);
            let brightness = checked_brightness(raw, &field, part.brightness)?;
            update.push((
                light_id(&self.light, &part.part_name),
                LightState {
                    on: part.power,
                    brightness,
                },
            ));
        }

        Ok(update)
    }
}

fn checked_brightness(raw: &Bytes, field: &str, value: i64) -> Result<u8, StatusError> {
    if (i64::from(brightness::MIN)..=i64::from(brightness::MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(StatusError::OutOfRange {
            raw: raw.clone(),
            field: field.to_string(),
            value,
        })
    }
}

/// Decode the stdout of a successful script run
///
/// Returns:
/// - `Ok(None)` if stdout is empty (set, sync and remote commands)
/// - `Ok(Some(update))` if stdout carried a valid status payload
/// - `Err(...)` if stdout is present but not a valid payload
pub fn parse_status(stdout: &Bytes) -> Result<Option<StatusUpdate>, StatusError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let payload: StatusPayload =
        serde_json::from_slice(stdout).map_err(|source| StatusError::InvalidJson {
            raw: stdout.clone(),
            source,
        })?;

    payload.into_update(stdout).map(Some)
}
