use clap::Parser;
use echobench_client::{Client, ClientConfig};
use echobench_common::{BenchmarkMessage, PopulateDefaults, DEFAULT_SERVER_ADDRESS};
use echobench_harness::metrics::Metrics;
use echobench_harness::orchestrator;
use echobench_harness::plan::RunPlan;
use echobench_harness::report::Report;
use echobench_harness::server::LocalServer;
use echobench_harness::worker::TimingMode;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "echobench", about = "Closed-loop latency benchmark for the echo service")]
struct Args {
    /// Number of concurrent workers
    #[arg(short = 'c', long, default_value_t = 1, allow_negative_numbers = true)]
    concurrency: i64,

    /// Total requests for all workers
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    total: i64,

    /// Echo server address (host:port)
    #[arg(long, default_value = DEFAULT_SERVER_ADDRESS)]
    server: String,

    /// Build and spawn a local echo server on a free port instead of using --server
    #[arg(long)]
    local_server: bool,

    /// Processing delay for the local echo server (milliseconds)
    #[arg(long, default_value_t = 0)]
    server_delay_ms: u64,

    /// Latency timing: wrap-call | pre-dispatch
    #[arg(long, default_value = "wrap-call")]
    timing: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let timing = TimingMode::from_name(&args.timing).unwrap_or_else(|| {
        eprintln!("Unknown timing {:?}. Valid values: wrap-call, pre-dispatch", args.timing);
        process::exit(2);
    });

    let plan = RunPlan::new(args.concurrency, args.total).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });

    tracing::info!(
        concurrency = plan.concurrency(),
        requests_per_client = plan.calls_per_worker(),
        "Run planned"
    );

    let message = BenchmarkMessage::populated();
    let payload_bytes = message.encoded_len().unwrap_or_else(|e| {
        eprintln!("Failed to encode benchmark message: {e}");
        process::exit(2);
    });
    tracing::info!(payload_bytes, "Benchmark message prepared");

    // Kept alive until the run is over; dropping it kills the process.
    let local = if args.local_server {
        Some(LocalServer::start(args.server_delay_ms).await.unwrap_or_else(|e| {
            eprintln!("Failed to start local server: {e}");
            process::exit(3);
        }))
    } else {
        None
    };
    let address = local
        .as_ref()
        .map(|s| s.addr.to_string())
        .unwrap_or_else(|| args.server.clone());

    let client = Arc::new(Client::new(ClientConfig { address }));

    let result = orchestrator::run(client, &plan, Arc::new(message), timing).await;
    drop(local);

    let outcome = result.unwrap_or_else(|e| {
        eprintln!("FATAL: {e}");
        process::exit(1);
    });

    let metrics = Metrics::aggregate(&plan, outcome);
    let latency = metrics.summary().unwrap_or_else(|e| {
        eprintln!("FATAL: {e}");
        process::exit(1);
    });
    let report = Report::new(&plan, payload_bytes, timing, &metrics, latency);

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                process::exit(1);
            }
        }
    } else {
        print!("{}", report.render());
    }
}
