#![allow(dead_code)]

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass1";

/// Server process bound to a private port; killed on drop
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    /// Spawn the binary with the in-memory backend and a bootstrap admin
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    pub async fn start_with(extra_env: &[(&str, &str)]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let child = spawn_server(port, extra_env)?;

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            child,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in as the bootstrap admin and return the bearer token
    pub async fn admin_token(&self) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "login": ADMIN_LOGIN, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());

        let body: Value = resp.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response had no token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_server(port: u16, extra_env: &[(&str, &str)]) -> Result<Child> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_usergroup-api"));
    cmd.env("APP_ENV", "development")
        .env("APP_STORAGE", "memory")
        .env("APP_PORT", port.to_string())
        .env("BOOTSTRAP_LOGIN", ADMIN_LOGIN)
        .env("BOOTSTRAP_PASSWORD", ADMIN_PASSWORD)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());
    for (key, value) in extra_env {
        cmd.env(key, value);
    }
    cmd.spawn().context("failed to spawn server binary")
}

/// Run the binary to completion and report how it exited
pub fn run_to_exit(port: u16, extra_env: &[(&str, &str)], timeout: Duration) -> Result<ExitStatus> {
    let mut child = spawn_server(port, extra_env)?;
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            anyhow::bail!("server was still running after {:?}", timeout);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
