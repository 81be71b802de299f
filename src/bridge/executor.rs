//! Request executor - validates and dispatches host requests

use super::handlers::{self, HandlerContext};
use crate::config::DeviceConfig;
use crate::dispatcher::{Dispatcher, QueueStatus};
use crate::protocol::{HostRequest, HostResponse};
use rflights_shared::{LightState, DEFAULT_PART};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of handling one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// A command was queued
    Queued,
    /// The request matched the cache; nothing was queued
    Unchanged,
    /// Raw cache entry (None when the id has not been seen)
    State(Option<LightState>),
    Power(bool),
    Brightness(u8),
    Queue(QueueStatus),
    /// No cached state yet for this id
    Unknown { id: String },
    /// Request refused before reaching the queue
    Rejected { message: String },
}

impl From<HandlerResult> for HostResponse {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Queued => HostResponse {
                queued: Some(true),
                ..HostResponse::ok()
            },
            HandlerResult::Unchanged => HostResponse {
                queued: Some(false),
                ..HostResponse::ok()
            },
            HandlerResult::State(state) => HostResponse {
                state,
                ..HostResponse::ok()
            },
            HandlerResult::Power(on) => HostResponse {
                on: Some(on),
                ..HostResponse::ok()
            },
            HandlerResult::Brightness(brightness) => HostResponse {
                brightness: Some(brightness),
                ..HostResponse::ok()
            },
            HandlerResult::Queue(queue) => HostResponse {
                queue: Some(queue),
                ..HostResponse::ok()
            },
            HandlerResult::Unknown { id } => {
                HostResponse::error(format!("No state for {} yet", id))
            }
            HandlerResult::Rejected { message } => HostResponse::error(message),
        }
    }
}

/// Executes requests received from the host
pub struct RequestExecutor {
    ctx: HandlerContext,
}

impl RequestExecutor {
    /// Create an executor over `dispatcher`; `devices` limits remote buttons per light
    pub fn new<I>(dispatcher: Dispatcher, devices: I) -> Self
    where
        I: IntoIterator<Item = DeviceConfig>,
    {
        let devices: HashMap<String, DeviceConfig> = devices
            .into_iter()
            .map(|d| (d.device_name.clone(), d))
            .collect();

        Self {
            ctx: HandlerContext {
                dispatcher,
                devices: Arc::new(devices),
            },
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.ctx.dispatcher
    }

    /// Parse and execute one request line
    pub fn execute_line(&self, line: &str) -> HostResponse {
        match serde_json::from_str::<HostRequest>(line) {
            Ok(request) => self.execute(request),
            Err(e) => {
                warn!("Invalid request line: {} ({})", line, e);
                HostResponse::error(format!("Invalid request: {}", e))
            }
        }
    }

    /// Execute a request and build the response
    pub fn execute(&self, request: HostRequest) -> HostResponse {
        let op = request.op();
        let ctx = &self.ctx;

        let result = match request {
            HostRequest::Init { light } => handlers::handle_init(ctx, &light),
            HostRequest::GetState { id } => handlers::handle_get_state(ctx, &id),
            HostRequest::GetOn { light, part } => {
                handlers::handle_get_on(ctx, &light, part_or_default(&part))
            }
            HostRequest::GetBrightness { light, part } => {
                handlers::handle_get_brightness(ctx, &light, part_or_default(&part))
            }
            HostRequest::SetOn { light, part, value } => {
                handlers::handle_set_on(ctx, &light, part_or_default(&part), value)
            }
            HostRequest::SetBrightness { light, part, value } => {
                handlers::handle_set_brightness(ctx, &light, part_or_default(&part), value)
            }
            HostRequest::SetColorTemp { light, part, value } => {
                handlers::handle_set_color_temp(ctx, &light, part_or_default(&part), value)
            }
            HostRequest::Remote { light, button } => handlers::handle_remote(ctx, &light, &button),
            HostRequest::Sync { light } => handlers::handle_sync(ctx, &light),
            HostRequest::Queue => handlers::handle_queue(ctx),
        };

        match &result {
            HandlerResult::Rejected { message } => warn!("{} rejected: {}", op, message),
            other => debug!("{} -> {:?}", op, other),
        }

        result.into()
    }
}

fn part_or_default(part: &Option<String>) -> &str {
    part.as_deref().unwrap_or(DEFAULT_PART)
}
