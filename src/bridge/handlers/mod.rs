//! Request handlers for the different host operations

mod light;
mod remote;
mod status;

pub use light::{
    handle_get_brightness, handle_get_on, handle_set_brightness, handle_set_color_temp,
    handle_set_on,
};
pub use remote::{handle_remote, handle_sync};
pub use status::{handle_get_state, handle_init, handle_queue};

use crate::config::DeviceConfig;
use crate::dispatcher::Dispatcher;
use std::collections::HashMap;
use std::sync::Arc;

/// Context passed to request handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub dispatcher: Dispatcher,
    /// Configured devices by script name
    pub devices: Arc<HashMap<String, DeviceConfig>>,
}
