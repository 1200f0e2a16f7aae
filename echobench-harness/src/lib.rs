//! Closed-loop, fixed-concurrency latency benchmark for a request/reply service.
//!
//! A run is planned ([`plan::RunPlan`]), executed by the [`orchestrator`] over
//! one [`worker::Worker`] per unit of concurrency, merged into
//! [`metrics::Metrics`] and rendered by [`report::Report`].

pub mod counters;
pub mod error;
pub mod latch;
pub mod metrics;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod server;
pub mod worker;
