use echobench_common::{BenchError, BenchmarkMessage, Invoke, OPERATION_NAME, SCHEMA_NAME, SERVICE_NAME};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use crate::counters::GlobalCounters;
use crate::error::{Phase, RunError};
use crate::latch::CompletionLatch;

/// Untimed calls each worker issues before measuring.
pub const WARMUP_CALLS: usize = 5;

/// Where the clock is read relative to a measured call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingMode {
    /// Start the clock before dispatch and stop it when the reply arrives.
    #[default]
    WrapCall,
    /// Take both clock readings back to back before dispatch. Every sample is
    /// close to zero and says nothing about the call; selectable to reproduce
    /// figures from harnesses that timed this way.
    PreDispatch,
}

impl TimingMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wrap-call" => Some(TimingMode::WrapCall),
            "pre-dispatch" => Some(TimingMode::PreDispatch),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            TimingMode::WrapCall => "wrap-call",
            TimingMode::PreDispatch => "pre-dispatch",
        }
    }
}

/// Latencies recorded by one worker, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub latency_ns: Vec<i64>,
}

/// One closed-loop benchmarking unit: warmup, then `calls` timed calls.
pub struct Worker<I> {
    id: usize,
    invoker: Arc<I>,
    args: Arc<BenchmarkMessage>,
    calls: usize,
    timing: TimingMode,
    counters: Arc<GlobalCounters>,
    latch: Arc<CompletionLatch>,
}

impl<I: Invoke> Worker<I> {
    pub fn new(
        id: usize,
        invoker: Arc<I>,
        args: Arc<BenchmarkMessage>,
        calls: usize,
        timing: TimingMode,
        counters: Arc<GlobalCounters>,
        latch: Arc<CompletionLatch>,
    ) -> Self {
        Self { id, invoker, args, calls, timing, counters, latch }
    }

    /// Run warmup and measurement to completion, or stop at the first failure
    /// or shutdown signal.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<WorkerResult, RunError> {
        tracing::debug!(worker_id = self.id, calls = self.calls, "Worker warming up");

        for call in 0..WARMUP_CALLS {
            let mut reply = BenchmarkMessage::default();
            self.call(&mut shutdown, &mut reply)
                .await
                .map_err(|e| self.fail(Phase::Warmup, call, e))?;
        }

        let mut latency_ns = Vec::with_capacity(self.calls);

        for call in 0..self.calls {
            let mut reply = BenchmarkMessage::default();

            let (elapsed, outcome) = match self.timing {
                TimingMode::WrapCall => {
                    let start = Instant::now();
                    let outcome = self.call(&mut shutdown, &mut reply).await;
                    (start.elapsed(), outcome)
                }
                TimingMode::PreDispatch => {
                    let start = Instant::now();
                    let elapsed = start.elapsed();
                    (elapsed, self.call(&mut shutdown, &mut reply).await)
                }
            };
            latency_ns.push(duration_to_ns(elapsed));

            outcome.map_err(|e| self.fail(Phase::Measurement, call, e))?;
            if !reply.has_success_marker() {
                let err = BenchError::MissingSuccessMarker(reply.field1);
                return Err(self.fail(Phase::Measurement, call, err));
            }

            self.counters.record_success();
            self.latch.count_down();
        }

        tracing::debug!(worker_id = self.id, samples = latency_ns.len(), "Worker finished");
        Ok(WorkerResult { worker_id: self.id, latency_ns })
    }

    /// Issue one call, abandoning it if the run is shut down meanwhile.
    async fn call(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
        reply: &mut BenchmarkMessage,
    ) -> Result<(), BenchError> {
        tokio::select! {
            biased;

            _ = shutdown.recv() => Err(BenchError::Cancelled),

            result = self.invoker.invoke(SERVICE_NAME, SCHEMA_NAME, OPERATION_NAME, &self.args, reply) => result,
        }
    }

    fn fail(&self, phase: Phase, call: usize, source: BenchError) -> RunError {
        if source != BenchError::Cancelled {
            tracing::error!(
                worker_id = self.id,
                %phase,
                call,
                class = source.class(),
                error = %source,
                "Worker call failed"
            );
        }
        RunError::Worker { worker_id: self.id, phase, call, source }
    }
}

fn duration_to_ns(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}
