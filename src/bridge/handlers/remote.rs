//! Remote button and sync handlers

use super::HandlerContext;
use crate::bridge::{HandlerResult, SYNC_BUTTON};
use tracing::debug;

/// Handle REMOTE
///
/// The pseudo-button `sync` maps to a sync command; configured devices only
/// accept their own buttons.
pub fn handle_remote(ctx: &HandlerContext, light: &str, button: &str) -> HandlerResult {
    if button == SYNC_BUTTON {
        return handle_sync(ctx, light);
    }

    let mut label = None;
    if let Some(device) = ctx.devices.get(light) {
        if !device.has_button(button) {
            return HandlerResult::Rejected {
                message: format!("Unknown button {} for {}", button, light),
            };
        }
        label = device.button(button).map(|b| b.button_name.as_str());
    }

    debug!(
        "{} remote button {} ({})",
        light,
        button,
        label.unwrap_or("unnamed")
    );
    ctx.dispatcher.remote(light, button);
    HandlerResult::Queued
}

/// Handle SYNC
pub fn handle_sync(ctx: &HandlerContext, light: &str) -> HandlerResult {
    debug!("{} sync", light);
    ctx.dispatcher.sync(light);
    HandlerResult::Queued
}
