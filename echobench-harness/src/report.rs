use serde::Serialize;

use crate::metrics::{Metrics, SummaryStatistics};
use crate::plan::RunPlan;
use crate::worker::TimingMode;

/// Final summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub concurrency: usize,
    pub calls_per_worker: usize,
    pub payload_bytes: usize,
    pub timing: TimingMode,
    pub elapsed_ms: u64,
    pub requests_sent: u64,
    pub requests_received: u64,
    pub requests_received_ok: u64,
    /// `None` when the run took under a millisecond.
    pub throughput_tps: Option<f64>,
    pub latency: SummaryStatistics,
}

impl Report {
    pub fn new(
        plan: &RunPlan,
        payload_bytes: usize,
        timing: TimingMode,
        metrics: &Metrics,
        latency: SummaryStatistics,
    ) -> Self {
        Self {
            concurrency: plan.concurrency(),
            calls_per_worker: plan.calls_per_worker(),
            payload_bytes,
            timing,
            elapsed_ms: metrics.elapsed_ms,
            requests_sent: metrics.requests_sent,
            requests_received: metrics.attempted,
            requests_received_ok: metrics.succeeded,
            throughput_tps: metrics.throughput_tps(),
            latency,
        }
    }

    /// Fixed-format text summary.
    pub fn render(&self) -> String {
        let l = &self.latency;
        let throughput = match self.throughput_tps {
            Some(tps) => format!("{:.1} tps", tps),
            None => "unbounded (elapsed < 1 ms)".to_string(),
        };

        let mut out = String::new();
        out.push_str("echobench Results\n");
        out.push_str("=================\n");
        out.push_str(&format!("Concurrency:           {}\n", self.concurrency));
        out.push_str(&format!("Requests per worker:   {}\n", self.calls_per_worker));
        out.push_str(&format!("Message size:          {} bytes\n", self.payload_bytes));
        out.push_str(&format!("Timing:                {}\n", self.timing.as_name()));
        out.push('\n');
        out.push_str(&format!(
            "Took:                  {} ms for {} requests\n",
            self.elapsed_ms, self.requests_sent
        ));
        out.push_str(&format!("Sent requests:         {}\n", self.requests_sent));
        out.push_str(&format!("Received requests:     {}\n", self.requests_received));
        out.push_str(&format!("Received requests OK:  {}\n", self.requests_received_ok));
        out.push_str(&format!("Throughput:            {}\n", throughput));
        out.push('\n');
        out.push_str(&format!(
            "Latency (ns):          mean {:.0}, median {:.0}, max {:.0}, min {:.0}, p99.9 {:.0}\n",
            l.mean_ns, l.median_ns, l.max_ns, l.min_ns, l.p999_ns
        ));
        out.push_str(&format!(
            "Latency (ms):          mean {:.3}, median {:.3}, max {:.3}, min {:.3}, p99.9 {:.3}\n",
            ns_to_ms(l.mean_ns),
            ns_to_ms(l.median_ns),
            ns_to_ms(l.max_ns),
            ns_to_ms(l.min_ns),
            ns_to_ms(l.p999_ns)
        ));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn ns_to_ms(ns: f64) -> f64 {
    ns / 1_000_000.0
}
