use echobench_common::{BenchError, Result};

/// Validated shape of one run.
///
/// Fields are private so the orchestrator can only ever see the corrected
/// values produced by [`RunPlan::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    concurrency: usize,
    total_requests: usize,
    calls_per_worker: usize,
}

impl RunPlan {
    /// Clamp `concurrency` and `total` to at least 1, then reject runs with more
    /// workers than requests.
    ///
    /// The per-worker count is `total / concurrency`; the remainder is dropped.
    pub fn new(concurrency: i64, total: i64) -> Result<Self> {
        let concurrency = clamp_to_one("concurrency", concurrency);
        let total_requests = clamp_to_one("total", total);

        if concurrency > total_requests {
            return Err(BenchError::Configuration(format!(
                "concurrency ({concurrency}) must be <= total requests ({total_requests})"
            )));
        }

        let calls_per_worker = total_requests / concurrency;
        let plan = Self { concurrency, total_requests, calls_per_worker };
        if plan.dropped_calls() > 0 {
            tracing::warn!(
                dropped = plan.dropped_calls(),
                "total requests not divisible by concurrency; remainder dropped"
            );
        }
        Ok(plan)
    }

    /// Number of workers (C).
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Requested aggregate call count (N), after clamping.
    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    /// Measured calls each worker issues (M).
    pub fn calls_per_worker(&self) -> usize {
        self.calls_per_worker
    }

    /// Calls the run actually issues in the measurement phase (C × M).
    pub fn total_calls(&self) -> usize {
        self.concurrency * self.calls_per_worker
    }

    /// Requested calls that no worker will issue (N mod C).
    pub fn dropped_calls(&self) -> usize {
        self.total_requests - self.total_calls()
    }
}

fn clamp_to_one(name: &str, value: i64) -> usize {
    if value < 1 {
        tracing::warn!(value, "{name} < 1, reset to 1");
        1
    } else {
        value as usize
    }
}
