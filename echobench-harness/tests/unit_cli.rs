use echobench_server::{Server, ServerConfig};
use std::net::SocketAddr;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::time::timeout;

// Exit codes of the `echobench` binary: 0 success, 1 failed run,
// 2 bad configuration, 3 local server failed to start.

const RUN_TIMEOUT: Duration = Duration::from_secs(60);

fn echobench(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_echobench"));
    cmd.args(args).env("RUST_LOG", "error");
    cmd
}

async fn output(mut cmd: Command) -> Output {
    timeout(RUN_TIMEOUT, cmd.output())
        .await
        .expect("echobench did not exit in time")
        .expect("failed to launch echobench")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

async fn start_server() -> SocketAddr {
    let (ready_tx, ready_rx) = oneshot::channel();
    let server = Server::new(ServerConfig {
        address: "127.0.0.1:0".parse().unwrap(),
        delay: Duration::ZERO,
    });
    tokio::spawn(async move {
        server.run(ready_tx).await.expect("server failed");
    });
    timeout(RUN_TIMEOUT, ready_rx)
        .await
        .expect("server did not start in time")
        .expect("server ready signal dropped")
}

#[tokio::test]
async fn test_concurrency_above_total_exits_2() {
    let out = output(echobench(&["-c", "3", "-n", "2"])).await;
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("concurrency (3) must be <= total requests (2)"));
    assert!(stdout(&out).is_empty());
}

#[tokio::test]
async fn test_unknown_timing_exits_2() {
    let out = output(echobench(&["--timing", "bogus"])).await;
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Unknown timing \"bogus\""));
}

#[tokio::test]
async fn test_unreachable_server_exits_1_without_report() {
    let out = output(echobench(&["-c", "2", "-n", "4", "--server", "127.0.0.1:1"])).await;
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("FATAL: worker"));
    assert!(stderr(&out).contains("during warmup"));
    assert!(!stdout(&out).contains("echobench Results"));
}

#[tokio::test]
async fn test_local_server_start_failure_exits_3() {
    // Without cargo on PATH the local server cannot be built.
    let mut cmd = echobench(&["-c", "1", "-n", "1", "--local-server"]);
    cmd.env("PATH", "");
    let out = output(cmd).await;
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Failed to start local server"));
    assert!(stdout(&out).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_successful_run_exits_0_with_report() {
    let addr = start_server().await.to_string();
    let out = output(echobench(&["-c", "2", "-n", "10", "--server", &addr])).await;
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.starts_with("echobench Results\n"));
    assert!(text.contains("Concurrency:           2"));
    assert!(text.contains("Requests per worker:   5"));
    assert!(text.contains("Sent requests:         10"));
    assert!(text.contains("Received requests:     10"));
    assert!(text.contains("Received requests OK:  10"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_report_is_the_only_stdout() {
    let addr = start_server().await.to_string();
    let mut cmd = echobench(&["-c", "4", "-n", "10", "--server", &addr, "--json"]);
    // Logs at info level must stay off stdout.
    cmd.env("RUST_LOG", "info");
    let out = output(cmd).await;
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["concurrency"], 4);
    assert_eq!(report["calls_per_worker"], 2);
    assert_eq!(report["requests_sent"], 8);
    assert_eq!(report["requests_received_ok"], 8);
    assert_eq!(report["timing"], "wrap-call");
}
