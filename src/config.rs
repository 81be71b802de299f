//! Bridge configuration
//!
//! Loaded from a JSON file using the same camelCase keys as the host plugin
//! configuration (`scriptDir`, `devices`, ...).

use crate::runner::RunnerConfig;
use anyhow::{bail, Context, Result};
use rflights_shared::{light_id, timing, DEFAULT_PART};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightsConfig {
    /// Directory holding the control and remote scripts
    pub script_dir: PathBuf,
    /// Interpreter to run the scripts with (e.g. /usr/bin/python3)
    #[serde(default)]
    pub interpreter: Option<PathBuf>,
    /// Control script file name, relative to `script_dir`
    #[serde(default = "default_control_script")]
    pub control_script: String,
    /// Remote script file name, relative to `script_dir`
    #[serde(default = "default_remote_script")]
    pub remote_script: String,
    /// Hard limit for one script invocation
    #[serde(default = "default_timeout_secs")]
    pub script_timeout_secs: u64,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// One configured fixture
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    #[serde(default)]
    pub device_id: String,
    /// Name passed to the scripts as `--light`
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_label: String,
    #[serde(default)]
    pub parts: Vec<PartConfig>,
    #[serde(default)]
    pub remote: Vec<RemoteButton>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartConfig {
    pub part_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteButton {
    pub button_name: String,
    #[serde(rename = "buttonID")]
    pub button_id: String,
}

fn default_control_script() -> String {
    "control.py".into()
}

fn default_remote_script() -> String {
    "remote.py".into()
}

fn default_timeout_secs() -> u64 {
    timing::DEFAULT_SCRIPT_TIMEOUT_SECS
}

impl LightsConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse and validate config text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.script_dir.as_os_str().is_empty() {
            bail!("scriptDir must not be empty");
        }
        if self.script_timeout_secs == 0 {
            bail!("scriptTimeoutSecs must be positive");
        }
        Ok(())
    }

    /// Script locations and limits for the process runner
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            control_script: self.script_dir.join(&self.control_script),
            remote_script: self.script_dir.join(&self.remote_script),
            interpreter: self.interpreter.clone(),
            timeout: Duration::from_secs(self.script_timeout_secs),
        }
    }

    /// Devices with all required fields; the rest are logged and skipped
    pub fn valid_devices(&self) -> Vec<&DeviceConfig> {
        self.devices
            .iter()
            .filter(|device| {
                let valid = device.is_valid();
                if !valid {
                    error!(
                        "Device configuration is missing required properties: {:?}",
                        device
                    );
                }
                valid
            })
            .collect()
    }
}

impl DeviceConfig {
    pub fn is_valid(&self) -> bool {
        !self.device_id.is_empty() && !self.device_name.is_empty() && !self.device_label.is_empty()
    }

    /// Cache identifiers this device populates: the default part plus each named part
    pub fn light_ids(&self) -> Vec<String> {
        std::iter::once(DEFAULT_PART)
            .chain(self.parts.iter().map(|p| p.part_name.as_str()))
            .map(|part| light_id(&self.device_name, part))
            .collect()
    }

    /// Configured remote button by id
    pub fn button(&self, button_id: &str) -> Option<&RemoteButton> {
        self.remote.iter().find(|b| b.button_id == button_id)
    }

    /// Whether `button` is a known remote button (sync is always accepted)
    pub fn has_button(&self, button: &str) -> bool {
        button == crate::bridge::SYNC_BUTTON
            || self.remote.is_empty()
            || self.button(button).is_some()
    }
}
