//! Power and brightness handlers
//!
//! Sets are compared against the cache first; a value the cache already holds
//! issues no command.

use super::HandlerContext;
use crate::bridge::HandlerResult;
use rflights_shared::{brightness, light_id};
use tracing::debug;

/// Handle GET_ON
pub fn handle_get_on(ctx: &HandlerContext, light: &str, part: &str) -> HandlerResult {
    let id = light_id(light, part);
    match ctx.dispatcher.get_state(&id) {
        Some(state) => {
            debug!("{} get On -> {}", id, state.on);
            HandlerResult::Power(state.on)
        }
        None => HandlerResult::Unknown { id },
    }
}

/// Handle GET_BRIGHTNESS
///
/// Reports 0 while the light is off; the remembered brightness stays cached.
pub fn handle_get_brightness(ctx: &HandlerContext, light: &str, part: &str) -> HandlerResult {
    let id = light_id(light, part);
    match ctx.dispatcher.get_state(&id) {
        Some(state) => {
            let value = state.effective_brightness();
            debug!("{} get Brightness -> {}", id, value);
            HandlerResult::Brightness(value)
        }
        None => HandlerResult::Unknown { id },
    }
}

/// Handle SET_ON
pub fn handle_set_on(ctx: &HandlerContext, light: &str, part: &str, value: bool) -> HandlerResult {
    let id = light_id(light, part);
    let current = ctx.dispatcher.get_state(&id).map(|s| s.on);

    if current == Some(value) {
        debug!("{} set On -> {} (unchanged)", id, value);
        return HandlerResult::Unchanged;
    }

    let switch = if value { "--on" } else { "--off" };
    ctx.dispatcher
        .control_power(&id, value, light, ["--part", part, switch]);
    debug!("{} set On -> {}", id, value);
    HandlerResult::Queued
}

/// Handle SET_COLOR_TEMP (kelvin)
///
/// Always queued: color temperature is not cached, so there is nothing to
/// compare against.
pub fn handle_set_color_temp(
    ctx: &HandlerContext,
    light: &str,
    part: &str,
    kelvin: u32,
) -> HandlerResult {
    if kelvin == 0 {
        return HandlerResult::Rejected {
            message: "Color temperature must be positive".into(),
        };
    }

    let kelvin = kelvin.to_string();
    ctx.dispatcher
        .control_color_temp(light, ["--part", part, "--colortemp", kelvin.as_str()]);
    debug!("{}-{} set ColorTemperature -> {}K", light, part, kelvin);
    HandlerResult::Queued
}

/// Handle SET_BRIGHTNESS
///
/// A value of 0 is ignored: hosts send it alongside power-off, which the
/// power handler already covers.
pub fn handle_set_brightness(
    ctx: &HandlerContext,
    light: &str,
    part: &str,
    value: u8,
) -> HandlerResult {
    if value > brightness::MAX {
        return HandlerResult::Rejected {
            message: format!("Brightness {} out of range (max {})", value, brightness::MAX),
        };
    }

    let id = light_id(light, part);
    let current = ctx.dispatcher.get_state(&id).map(|s| s.brightness);

    if value == 0 || current == Some(value) {
        debug!("{} set Brightness -> {} (unchanged)", id, value);
        return HandlerResult::Unchanged;
    }

    let level = value.to_string();
    ctx.dispatcher.control_brightness(
        &id,
        value,
        light,
        ["--part", part, "--brightness", level.as_str()],
    );
    debug!("{} set Brightness -> {}", id, value);
    HandlerResult::Queued
}
