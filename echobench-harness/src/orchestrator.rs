use echobench_common::{BenchmarkMessage, Invoke};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

use crate::counters::{CounterSnapshot, GlobalCounters};
use crate::error::RunError;
use crate::latch::CompletionLatch;
use crate::plan::RunPlan;
use crate::worker::{TimingMode, Worker, WorkerResult};

/// Everything a fully successful run produced, ready for aggregation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One entry per worker, ordered by worker id.
    pub worker_results: Vec<WorkerResult>,
    pub counters: CounterSnapshot,
    /// Wall-clock time from the first spawn to latch release, warmup included.
    pub elapsed: Duration,
}

/// Drive `plan.concurrency()` workers against `invoker` until every measured
/// call has completed.
///
/// The first worker failure broadcasts shutdown to the others, aborts them and
/// is returned as-is; nothing partial is reported.
pub async fn run<I>(
    invoker: Arc<I>,
    plan: &RunPlan,
    args: Arc<BenchmarkMessage>,
    timing: TimingMode,
) -> Result<RunOutcome, RunError>
where
    I: Invoke + 'static,
{
    let counters = Arc::new(GlobalCounters::new());
    let latch = Arc::new(CompletionLatch::new(plan.total_calls()));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (fatal_tx, mut fatal_rx) = mpsc::channel::<RunError>(plan.concurrency());

    tracing::info!(
        concurrency = plan.concurrency(),
        calls_per_worker = plan.calls_per_worker(),
        ?timing,
        "Starting run"
    );

    let started = Instant::now();

    let mut tasks = JoinSet::new();
    for id in 0..plan.concurrency() {
        let worker = Worker::new(
            id,
            Arc::clone(&invoker),
            Arc::clone(&args),
            plan.calls_per_worker(),
            timing,
            Arc::clone(&counters),
            Arc::clone(&latch),
        );
        let shutdown = shutdown_tx.subscribe();
        let fatal_tx = fatal_tx.clone();
        tasks.spawn(async move {
            let result = worker.run(shutdown).await;
            if let Err(err) = &result {
                // Receiver is gone once the orchestrator has already bailed out.
                fatal_tx.send(err.clone()).await.ok();
            }
            result
        });
    }
    drop(fatal_tx);

    tokio::select! {
        biased;

        _ = latch.wait() => {}

        fatal = fatal_rx.recv() => {
            shutdown_tx.send(()).ok();
            tasks.shutdown().await;
            // `None` means every worker exited without finishing or reporting.
            let err = fatal.unwrap_or_else(|| RunError::WorkerLost("all workers exited early".to_string()));
            tracing::error!(error = %err, "Run aborted");
            return Err(err);
        }
    }

    let elapsed = started.elapsed();
    let counters = counters.snapshot();

    let mut worker_results = Vec::with_capacity(plan.concurrency());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(result)) => worker_results.push(result),
            Ok(Err(err)) => return Err(err),
            Err(join_err) => return Err(RunError::WorkerLost(join_err.to_string())),
        }
    }
    worker_results.sort_by_key(|r| r.worker_id);

    tracing::info!(
        elapsed_ms = elapsed.as_millis() as u64,
        attempted = counters.attempted,
        succeeded = counters.succeeded,
        "Run complete"
    );

    Ok(RunOutcome { worker_results, counters, elapsed })
}
