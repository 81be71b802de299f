//! Command dispatch and light state caching
//!
//! This module handles:
//! - Serializing control/remote commands into one ordered queue
//! - Running them one at a time through the script runner
//! - Merging status output into the light state cache
//! - Optimistic cache writes for power/brightness sets

mod queue;
mod store;

pub use queue::{Dispatcher, DrainState, QueueStatus};
