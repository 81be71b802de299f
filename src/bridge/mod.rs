//! Host bridge request handling
//!
//! This module handles:
//! - Parsing request lines from the home-automation host
//! - Suppressing sets that match the cached state
//! - Dispatching to the queue and building responses

mod executor;
pub mod handlers;

pub use executor::{HandlerResult, RequestExecutor};

/// Remote button name that triggers a sync instead of a button press
pub const SYNC_BUTTON: &str = "sync";
