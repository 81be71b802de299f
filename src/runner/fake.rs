//! In-memory script runner for tests

use crate::error::DispatchError;
use crate::runner::traits::{ScriptOutput, ScriptRunner};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rflights_shared::ScriptKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

type Respond = dyn Fn(&[String]) -> Result<ScriptOutput, DispatchError> + Send + Sync;

/// Records every call and answers from a closure
pub struct FakeRunner {
    calls: Mutex<Vec<(ScriptKind, Vec<String>)>>,
    respond: Box<Respond>,
    gate: Semaphore,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[String]) -> Result<ScriptOutput, DispatchError> + Send + Sync + 'static,
    {
        Self::with_permits(respond, Semaphore::MAX_PERMITS)
    }

    /// Every run blocks until `release` hands out a permit
    pub fn gated<F>(respond: F) -> Self
    where
        F: Fn(&[String]) -> Result<ScriptOutput, DispatchError> + Send + Sync + 'static,
    {
        Self::with_permits(respond, 0)
    }

    fn with_permits<F>(respond: F, permits: usize) -> Self
    where
        F: Fn(&[String]) -> Result<ScriptOutput, DispatchError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            gate: Semaphore::new(permits),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, runs: usize) {
        self.gate.add_permits(runs);
    }

    pub fn calls(&self) -> Vec<(ScriptKind, Vec<String>)> {
        self.calls.lock().clone()
    }

    pub fn args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|(_, args)| args).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptRunner for FakeRunner {
    async fn run(&self, kind: ScriptKind, args: &[String]) -> Result<ScriptOutput, DispatchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().push((kind, args.to_vec()));

        // Let other tasks enqueue while this "process" runs
        tokio::task::yield_now().await;
        self.gate.acquire().await.expect("gate closed").forget();

        let result = (self.respond)(args);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Successful exit with the given stdout
pub fn ok(stdout: &str) -> Result<ScriptOutput, DispatchError> {
    Ok(ScriptOutput {
        exit_code: 0,
        stdout: Bytes::copy_from_slice(stdout.as_bytes()),
    })
}
