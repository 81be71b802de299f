//! Command queue and drain loop
//!
//! Every command from every caller goes through one unbounded inbox that a
//! single worker task drains in order. The worker runs each script to
//! completion before taking the next one, so at most one invocation is ever
//! in flight per dispatcher.

use super::store::{StateField, StateStore};
use crate::error::DispatchError;
use crate::runner::ScriptRunner;
use futures::FutureExt;
use rflights_shared::{parse_status, Command, LightState};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Whether the drain loop has work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainState {
    Idle,
    Draining,
}

/// Snapshot of queue progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    /// Enqueued and not yet finished, including the one in flight
    pub pending: usize,
    /// Finished successfully
    pub completed: u64,
    /// Finished with an error
    pub failed: u64,
}

impl QueueStatus {
    pub fn drain_state(&self) -> DrainState {
        if self.pending == 0 {
            DrainState::Idle
        } else {
            DrainState::Draining
        }
    }
}

/// A command plus the cache entry it wrote ahead of time, if any
#[derive(Debug)]
struct QueuedCommand {
    command: Command,
    optimistic_id: Option<String>,
}

/// Serializes script invocations and owns the light state cache
///
/// Cheap to clone; every clone feeds the same queue and reads the same
/// cache. The drain loop stops once the last clone is dropped and the queue
/// is empty.
#[derive(Clone)]
pub struct Dispatcher {
    inbox: mpsc::UnboundedSender<QueuedCommand>,
    store: StateStore,
    status: Arc<watch::Sender<QueueStatus>>,
}

impl Dispatcher {
    /// Create a dispatcher and spawn its drain loop on the current runtime
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        let (inbox, rx) = mpsc::unbounded_channel();
        let (status_tx, _) = watch::channel(QueueStatus::default());
        let status = Arc::new(status_tx);
        let store = StateStore::new();

        tokio::spawn(drain_loop(rx, runner, store.clone(), status.clone()));

        Self {
            inbox,
            store,
            status,
        }
    }

    /// Queue a status query for `light`
    pub fn init_state(&self, light: &str) {
        self.enqueue(Command::status(light));
    }

    /// Cached state for `"<light>-<part>"`
    pub fn get_state(&self, id: &str) -> Option<LightState> {
        self.store.get(id)
    }

    /// Record `on = value` immediately, then queue the control command
    pub fn control_power<I, S>(&self, id: &str, value: bool, light: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.apply_optimistic(id, StateField::On(value));
        self.push(Command::control(light, args), Some(id));
    }

    /// Record `brightness = value` immediately, then queue the control command
    pub fn control_brightness<I, S>(&self, id: &str, value: u8, light: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.apply_optimistic(id, StateField::Brightness(value));
        self.push(Command::control(light, args), Some(id));
    }

    /// Queue a color-temperature set; the cache has no field for it
    pub fn control_color_temp<I, S>(&self, light: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enqueue(Command::control(light, args));
    }

    /// Queue a remote button press
    pub fn remote(&self, light: &str, button: &str) {
        self.enqueue(Command::remote(light, button));
    }

    /// Queue a sync for `light`
    pub fn sync(&self, light: &str) {
        self.enqueue(Command::sync(light));
    }

    /// Append a command to the tail of the queue. Never blocks.
    pub fn enqueue(&self, command: Command) {
        self.push(command, None);
    }

    fn push(&self, command: Command, optimistic_id: Option<&str>) {
        self.status.send_modify(|s| s.pending += 1);

        let queued = QueuedCommand {
            command,
            optimistic_id: optimistic_id.map(str::to_string),
        };
        if let Err(mpsc::error::SendError(queued)) = self.inbox.send(queued) {
            error!(
                "[DISPATCH] Drain loop not running, dropping: {}",
                queued.command
            );
            self.status.send_modify(|s| {
                s.pending = s.pending.saturating_sub(1);
                s.failed += 1;
            });
        }
    }

    /// Current queue counters
    pub fn status(&self) -> QueueStatus {
        *self.status.borrow()
    }

    /// Watch queue counters as they change
    pub fn subscribe(&self) -> watch::Receiver<QueueStatus> {
        self.status.subscribe()
    }

    /// Wait until every queued command has finished
    pub async fn wait_idle(&self) {
        let mut rx = self.status.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|s| s.drain_state() == DrainState::Idle).await;
    }

    /// The underlying state cache
    pub fn store(&self) -> &StateStore {
        &self.store
    }
}

/// The single worker: pop, run to completion, record, repeat
async fn drain_loop(
    mut inbox: mpsc::UnboundedReceiver<QueuedCommand>,
    runner: Arc<dyn ScriptRunner>,
    store: StateStore,
    status: Arc<watch::Sender<QueueStatus>>,
) {
    info!("[DISPATCH] Drain loop started ({} runner)", runner.name());

    while let Some(queued) = inbox.recv().await {
        let run = execute(runner.as_ref(), &store, &queued.command);
        let outcome = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!("[DISPATCH] Runner panicked on: {}", queued.command);
                Err(DispatchError::Spawn(std::io::Error::other("runner panicked")))
            }
        };

        let ok = match outcome {
            Ok(updated) => {
                debug!(
                    "[DISPATCH] Completed: {} ({} entries updated)",
                    queued.command, updated
                );
                true
            }
            Err(e) => {
                match &e {
                    DispatchError::ScriptExit(_) | DispatchError::MalformedResponse(_) => {
                        warn!("[DISPATCH] Command failed ({}): {}: {}", e.label(), queued.command, e);
                    }
                    DispatchError::Timeout(_) | DispatchError::Spawn(_) => {
                        error!("[DISPATCH] Command failed ({}): {}: {}", e.label(), queued.command, e);
                    }
                }
                if let Some(id) = &queued.optimistic_id {
                    warn!(
                        "[DISPATCH] {} keeps its optimistic state until the next status query",
                        id
                    );
                }
                false
            }
        };

        status.send_modify(|s| {
            s.pending = s.pending.saturating_sub(1);
            if ok {
                s.completed += 1;
            } else {
                s.failed += 1;
            }
        });
    }

    info!("[DISPATCH] Drain loop stopped");
}

/// Run one command and merge any status payload into the cache
///
/// Returns the number of cache entries written.
async fn execute(
    runner: &dyn ScriptRunner,
    store: &StateStore,
    command: &Command,
) -> Result<usize, DispatchError> {
    debug!("[DISPATCH] Running: {}", command);

    let output = runner.run(command.kind(), command.args()).await?;
    debug!(
        "[DISPATCH] {} exited {} ({} bytes of output)",
        command.kind(),
        output.exit_code,
        output.stdout.len()
    );

    match parse_status(&output.stdout)? {
        Some(update) => {
            let count = update.len();
            store.apply_authoritative(update);
            Ok(count)
        }
        None => Ok(0),
    }
}
