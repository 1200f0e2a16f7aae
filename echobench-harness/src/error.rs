use echobench_common::BenchError;
use std::fmt;
use thiserror::Error;

/// Worker phase in which a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Measurement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Warmup => f.write_str("warmup"),
            Phase::Measurement => f.write_str("measurement"),
        }
    }
}

/// Fatal outcome of a run. Any of these ends the run without aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("worker {worker_id} failed during {phase} call #{call}: {source}")]
    Worker {
        worker_id: usize,
        phase: Phase,
        call: usize,
        #[source]
        source: BenchError,
    },

    #[error("worker task terminated abnormally: {0}")]
    WorkerLost(String),
}

impl RunError {
    /// The underlying call failure, if this error came from a worker.
    pub fn cause(&self) -> Option<&BenchError> {
        match self {
            RunError::Worker { source, .. } => Some(source),
            RunError::WorkerLost(_) => None,
        }
    }
}
