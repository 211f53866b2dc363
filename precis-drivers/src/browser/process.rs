use anyhow::{bail, Context, Result};
use std::net::TcpListener;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// A WebDriver server running as a child of this process.
///
/// The child is spawned with `kill_on_drop`, so dropping a `DriverProcess`
/// terminates it even when [`DriverProcess::shutdown`] is never reached.
pub struct DriverProcess {
    child: Child,
    port: u16,
    binary: String,
}

impl DriverProcess {
    /// Spawn `binary --port=<free port>` and wait until it accepts connections.
    pub async fn spawn(binary: &str, launch_timeout: Duration) -> Result<Self> {
        let port = free_local_port()?;
        let child = Command::new(binary)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to launch {binary}"))?;

        debug!(
            target: "browser.process",
            binary,
            port,
            pid = ?child.id(),
            "webdriver process spawned"
        );

        let mut process = Self {
            child,
            port,
            binary: binary.to_string(),
        };
        process.wait_until_listening(launch_timeout).await?;
        Ok(process)
    }

    /// Base URL of the WebDriver endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait_until_listening(&mut self, launch_timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + launch_timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                bail!(
                    "{} exited before accepting connections ({status})",
                    self.binary
                );
            }
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!(
                    "{} did not listen on port {} within {:?}",
                    self.binary,
                    self.port,
                    launch_timeout
                );
            }
            sleep(Duration::from_millis(50)).await;
        }
    }

    /// Kill the process and reap it.
    pub async fn shutdown(mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            if let Err(e) = self.child.kill().await {
                warn!(target: "browser.process", binary = %self.binary, error = %e, "kill failed");
                return Err(e.into());
            }
        }
        debug!(target: "browser.process", binary = %self.binary, "webdriver process stopped");
        Ok(())
    }
}

/// Ask the OS for an unused loopback port.
pub fn free_local_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("no free local port")?;
    Ok(listener.local_addr()?.port())
}
