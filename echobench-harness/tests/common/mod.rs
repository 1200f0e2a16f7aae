#![allow(dead_code)]

use echobench_common::{BenchError, BenchmarkMessage, Invoke, Result, REPLY_FIELD2, SUCCESS_MARKER};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-process stand-in for the echo service.
///
/// Calls are numbered globally from 0 in arrival order; a call can be made to
/// fail at the transport level or to reply without the success marker.
#[derive(Default)]
pub struct MockInvoker {
    calls: AtomicUsize,
    fail_at: Option<usize>,
    bad_marker_at: Option<usize>,
    delay: Duration,
    targets: Mutex<HashSet<String>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    pub fn bad_marker_at(mut self, call: usize) -> Self {
        self.bad_marker_at = Some(call);
        self
    }

    /// Delay applied to every call except a failing one.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> HashSet<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Invoke for MockInvoker {
    async fn invoke(
        &self,
        service: &str,
        schema: &str,
        operation: &str,
        args: &BenchmarkMessage,
        reply: &mut BenchmarkMessage,
    ) -> Result<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().insert(format!("{service}/{schema}/{operation}"));

        if self.fail_at == Some(n) {
            return Err(BenchError::NetworkError(format!("injected failure on call {n}")));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        *reply = args.clone();
        reply.field1 = if self.bad_marker_at == Some(n) { "NOPE".to_string() } else { SUCCESS_MARKER.to_string() };
        reply.field2 = REPLY_FIELD2;
        Ok(())
    }
}
