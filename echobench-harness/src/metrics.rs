use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::RunOutcome;
use crate::plan::RunPlan;

/// Percentile reported as the tail latency.
pub const TAIL_PERCENTILE: f64 = 99.9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("cannot compute statistics over an empty sample set")]
    EmptyInput,

    #[error("percentile {0} is outside [0, 100]")]
    OutOfBounds(f64),
}

/// Latency distribution summary, all values in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub mean_ns: f64,
    pub median_ns: f64,
    pub min_ns: f64,
    pub max_ns: f64,
    pub p999_ns: f64,
}

/// Merged results of a completed run.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Calls issued in the measurement phase (C × M).
    pub requests_sent: u64,
    pub attempted: u64,
    pub succeeded: u64,
    /// Every worker's samples, concatenated in worker order.
    pub latency_ns: Vec<i64>,
    pub elapsed_ms: u64,
}

impl Metrics {
    /// Flatten per-worker samples and carry over counters and elapsed time.
    pub fn aggregate(plan: &RunPlan, outcome: RunOutcome) -> Self {
        let latency_ns = outcome
            .worker_results
            .into_iter()
            .flat_map(|r| r.latency_ns)
            .collect();

        Self {
            requests_sent: plan.total_calls() as u64,
            attempted: outcome.counters.attempted,
            succeeded: outcome.counters.succeeded,
            latency_ns,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
        }
    }

    /// Calls per second over the whole run, or `None` if it finished in under a
    /// millisecond and the rate is unbounded.
    pub fn throughput_tps(&self) -> Option<f64> {
        throughput(self.attempted, self.elapsed_ms)
    }

    pub fn summary(&self) -> Result<SummaryStatistics, StatsError> {
        summarize(&self.latency_ns)
    }
}

/// `calls × 1000 / elapsed_ms`; `None` when `elapsed_ms` is zero.
pub fn throughput(calls: u64, elapsed_ms: u64) -> Option<f64> {
    if elapsed_ms == 0 {
        return None;
    }
    Some(calls as f64 * 1000.0 / elapsed_ms as f64)
}

pub fn summarize(data: &[i64]) -> Result<SummaryStatistics, StatsError> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable();

    Ok(SummaryStatistics {
        mean_ns: mean(&sorted)?,
        median_ns: median_sorted(&sorted)?,
        min_ns: min(&sorted)?,
        max_ns: max(&sorted)?,
        p999_ns: percentile_sorted(&sorted, TAIL_PERCENTILE)?,
    })
}

pub fn mean(data: &[i64]) -> Result<f64, StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    let sum: f64 = data.iter().map(|&v| v as f64).sum();
    Ok(sum / data.len() as f64)
}

/// Middle value; the average of the two middle values for even lengths.
pub fn median(data: &[i64]) -> Result<f64, StatsError> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

pub fn min(data: &[i64]) -> Result<f64, StatsError> {
    data.iter().min().map(|&v| v as f64).ok_or(StatsError::EmptyInput)
}

pub fn max(data: &[i64]) -> Result<f64, StatsError> {
    data.iter().max().map(|&v| v as f64).ok_or(StatsError::EmptyInput)
}

/// Value at percentile `p` (0–100) using rank `p/100 × (n − 1)` and linear
/// interpolation between the bracketing samples.
pub fn percentile(data: &[i64], p: f64) -> Result<f64, StatsError> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable();
    percentile_sorted(&sorted, p)
}

fn median_sorted(sorted: &[i64]) -> Result<f64, StatsError> {
    let n = sorted.len();
    if n == 0 {
        return Err(StatsError::EmptyInput);
    }
    if n % 2 == 0 {
        Ok((sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0)
    } else {
        Ok(sorted[n / 2] as f64)
    }
}

fn percentile_sorted(sorted: &[i64], p: f64) -> Result<f64, StatsError> {
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::OutOfBounds(p));
    }
    if sorted.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let lo = sorted[lower] as f64;
    if lower == upper {
        return Ok(lo);
    }
    let hi = sorted[upper] as f64;
    Ok(lo + (rank - lower as f64) * (hi - lo))
}
