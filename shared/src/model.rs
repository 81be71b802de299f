//! Light state and command model
//!
//! Every addressable unit (a whole fixture or one of its parts) is keyed by a
//! composite identifier `"<light>-<part>"`.

use serde::Serialize;
use std::fmt;

use crate::brightness;

/// Part name used for fixtures that have no sub-parts
pub const DEFAULT_PART: &str = "default";

/// Build the cache identifier for a light/part pair
pub fn light_id(light: &str, part: &str) -> String {
    format!("{}-{}", light, part)
}

/// Cached power/brightness of one light or part
///
/// Turning a light off keeps its brightness; the read path decides whether to
/// report zero while off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub on: bool,
    pub brightness: u8,
}

impl LightState {
    /// Create a state, clamping brightness into the valid range
    pub fn new(on: bool, brightness: u8) -> Self {
        Self {
            on,
            brightness: brightness.min(brightness::MAX),
        }
    }

    /// Brightness as a home-automation host sees it: zero while off
    pub fn effective_brightness(&self) -> u8 {
        if self.on {
            self.brightness
        } else {
            0
        }
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: false,
            brightness: brightness::MAX,
        }
    }
}

/// Which external script a command runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Queries or sets power/brightness/color temperature
    Control,
    /// Emulates one remote-control button press
    Remote,
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptKind::Control => write!(f, "control"),
            ScriptKind::Remote => write!(f, "remote"),
        }
    }
}

/// One queued script invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: ScriptKind,
    args: Vec<String>,
}

impl Command {
    /// Create a command from raw argv tokens
    pub fn new(kind: ScriptKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }

    /// Status query: `--light <light> --status`
    pub fn status(light: &str) -> Self {
        Self::control(light, ["--status"])
    }

    /// Sync: `--light <light> --sync`
    pub fn sync(light: &str) -> Self {
        Self::control(light, ["--sync"])
    }

    /// Control command: `--light <light> <extra...>`
    pub fn control<I, S>(light: &str, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = vec!["--light".to_string(), light.to_string()];
        args.extend(extra.into_iter().map(Into::into));
        Self::new(ScriptKind::Control, args)
    }

    /// Remote button press: `--light <light> --button <button>`
    pub fn remote(light: &str, button: &str) -> Self {
        Self::new(
            ScriptKind::Remote,
            vec![
                "--light".to_string(),
                light.to_string(),
                "--button".to_string(),
                button.to_string(),
            ],
        )
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.args.join(" "))
    }
}
