use clap::Parser;
use echobench_common::DEFAULT_SERVER_ADDRESS;
use echobench_server::{Server, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "echobench-server", about = "Echo responder for the echobench harness")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_SERVER_ADDRESS)]
    address: SocketAddr,

    /// Delay (milliseconds) to mock business processing on every call.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ServerConfig {
        address: args.address,
        delay: Duration::from_millis(args.delay_ms),
    };

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    // Print "Listening on <addr>" once the server signals it is bound.
    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
        }
    });

    Server::new(config).run(ready_tx).await?;
    Ok(())
}
