use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// A locally spawned `echobench-server`, killed on drop.
pub struct LocalServer {
    child: Child,
    pub addr: SocketAddr,
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        self.child.kill().ok();
    }
}

/// Reserve a free TCP port by binding to port 0 and releasing it.
pub fn pick_free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Return the path to the `echobench-server` binary that sits alongside this
/// executable in `target/<profile>/` (or `target/<profile>/deps/` when run as a test).
fn server_binary_path() -> Result<PathBuf, String> {
    let mut path =
        std::env::current_exe().map_err(|e| format!("cannot determine own executable path: {e}"))?;
    path.pop(); // remove own filename
    if path.file_name().map(|n| n == "deps").unwrap_or(false) {
        path.pop(); // step out of target/<profile>/deps
    }
    path.push("echobench-server");
    Ok(path)
}

const READY_TIMEOUT: Duration = Duration::from_secs(30);

impl LocalServer {
    /// [`LocalServer::build_and_spawn`] on the blocking thread pool, for use
    /// from async code.
    pub async fn start(delay_ms: u64) -> Result<Self, String> {
        tokio::task::spawn_blocking(move || Self::build_and_spawn(delay_ms))
            .await
            .map_err(|e| format!("Local server startup task failed: {e}"))?
    }

    /// Build the `echobench-server` binary, spawn it on a free port with the
    /// given processing delay, and wait until it accepts connections.
    ///
    /// The caller should map an error to exit code 3.
    pub fn build_and_spawn(delay_ms: u64) -> Result<Self, String> {
        let status = Command::new("cargo")
            .args(["build", "-p", "echobench-server"])
            .status()
            .map_err(|e| format!("Failed to invoke cargo build: {e}"))?;
        if !status.success() {
            return Err(format!("cargo build -p echobench-server failed: {status}"));
        }

        let port = pick_free_port().map_err(|e| format!("Failed to reserve a port: {e}"))?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let child = Command::new(server_binary_path()?)
            .args([
                "--address".to_string(),
                addr.to_string(),
                "--delay-ms".to_string(),
                delay_ms.to_string(),
            ])
            .spawn()
            .map_err(|e| format!("Failed to spawn echobench-server: {e}"))?;
        // From here on the process is killed if readiness fails.
        let server = LocalServer { child, addr };

        poll_until_ready(server.addr, Instant::now() + READY_TIMEOUT)
            .map_err(|e| format!("echobench-server not ready within timeout: {e}"))?;

        tracing::info!(%addr, delay_ms, "Local echo server ready");
        Ok(server)
    }
}

/// Poll `addr` with a TCP connect attempt until the connection succeeds
/// or `deadline` is reached.
///
/// axum starts accepting the moment it binds, so a successful `connect`
/// implies it will also answer HTTP requests.
pub fn poll_until_ready(addr: SocketAddr, deadline: Instant) -> Result<(), String> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(format!("timed out waiting for {addr}"));
        }
        let probe = Duration::min(remaining, Duration::from_millis(200));
        if TcpStream::connect_timeout(&addr, probe).is_ok() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
