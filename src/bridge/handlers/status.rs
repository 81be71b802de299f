//! Status and queue handlers

use super::HandlerContext;
use crate::bridge::HandlerResult;

/// Handle INIT: queue a status query
pub fn handle_init(ctx: &HandlerContext, light: &str) -> HandlerResult {
    ctx.dispatcher.init_state(light);
    HandlerResult::Queued
}

/// Handle GET_STATE: raw cached entry, if any
pub fn handle_get_state(ctx: &HandlerContext, id: &str) -> HandlerResult {
    HandlerResult::State(ctx.dispatcher.get_state(id))
}

/// Handle QUEUE
pub fn handle_queue(ctx: &HandlerContext) -> HandlerResult {
    HandlerResult::Queue(ctx.dispatcher.status())
}
