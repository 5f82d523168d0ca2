// src/services/server.rs

//! Dynamic server lifecycle.
//!
//! The export needs a live server for its whole duration: `start` hands
//! out a handle once the server accepts connections, the export runs
//! against that handle, and `stop` releases it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::error::{AppError, Result};
use crate::models::ServerConfig;
use crate::utils::url::socket_address;

/// A running dynamic server.
#[derive(Debug)]
pub struct ServerHandle {
    base_url: String,
    child: Option<Child>,
}

impl ServerHandle {
    /// Handle for a server whose lifetime is managed elsewhere.
    pub fn external(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            child: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Starts and stops the server an export runs against.
#[async_trait]
pub trait SiteServer: Send + Sync {
    async fn start(&self) -> Result<ServerHandle>;
    async fn stop(&self, handle: ServerHandle) -> Result<()>;
}

/// How long and how often to probe for readiness.
#[derive(Debug, Clone, Copy)]
pub struct Readiness {
    pub timeout: Duration,
    pub poll: Duration,
}

impl From<&ServerConfig> for Readiness {
    fn from(config: &ServerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.ready_timeout_secs),
            poll: Duration::from_millis(config.ready_poll_ms.max(1)),
        }
    }
}

/// A server somebody else already started.
#[derive(Debug, Clone)]
pub struct ExternalServer {
    base_url: String,
    readiness: Readiness,
}

impl ExternalServer {
    pub fn new(base_url: impl Into<String>, readiness: Readiness) -> Self {
        Self {
            base_url: base_url.into(),
            readiness,
        }
    }
}

#[async_trait]
impl SiteServer for ExternalServer {
    async fn start(&self) -> Result<ServerHandle> {
        wait_until_ready(&self.base_url, self.readiness, None).await?;
        Ok(ServerHandle::external(self.base_url.clone()))
    }

    async fn stop(&self, _handle: ServerHandle) -> Result<()> {
        Ok(())
    }
}

/// A server hosted by a child process for the duration of the export.
#[derive(Debug, Clone)]
pub struct CommandServer {
    command: Vec<String>,
    base_url: String,
    readiness: Readiness,
}

impl CommandServer {
    pub fn new(command: Vec<String>, base_url: impl Into<String>, readiness: Readiness) -> Self {
        Self {
            command,
            base_url: base_url.into(),
            readiness,
        }
    }
}

#[async_trait]
impl SiteServer for CommandServer {
    async fn start(&self) -> Result<ServerHandle> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| AppError::server("server command is empty"))?;

        log::info!("Starting server: {}", self.command.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::server(format!("failed to spawn '{program}': {e}")))?;

        wait_until_ready(&self.base_url, self.readiness, Some(&mut child)).await?;
        log::info!("Server ready at {}", self.base_url);

        Ok(ServerHandle {
            base_url: self.base_url.clone(),
            child: Some(child),
        })
    }

    async fn stop(&self, handle: ServerHandle) -> Result<()> {
        if let Some(mut child) = handle.child
            && child.try_wait()?.is_none()
        {
            child.kill().await?;
            log::info!("Server stopped");
        }
        Ok(())
    }
}

/// Pick the server implementation for a run.
///
/// With a configured command and `spawn` enabled the exporter hosts the
/// server itself; otherwise it expects one at `base_url`.
pub fn from_config(config: &ServerConfig, spawn: bool) -> Box<dyn SiteServer> {
    let readiness = Readiness::from(config);
    match &config.command {
        Some(command) if spawn => Box::new(CommandServer::new(
            command.clone(),
            config.base_url.clone(),
            readiness,
        )),
        _ => Box::new(ExternalServer::new(config.base_url.clone(), readiness)),
    }
}

/// Poll until the server's address accepts TCP connections.
async fn wait_until_ready(
    base_url: &str,
    readiness: Readiness,
    mut child: Option<&mut Child>,
) -> Result<()> {
    let addr = socket_address(base_url)
        .ok_or_else(|| AppError::server(format!("cannot derive an address from {base_url}")))?;
    let started = Instant::now();

    loop {
        if TcpStream::connect(&addr).await.is_ok() {
            return Ok(());
        }
        if let Some(child) = child.as_deref_mut()
            && let Some(status) = child.try_wait()?
        {
            return Err(AppError::server(format!(
                "server exited with {status} before accepting connections"
            )));
        }
        if started.elapsed() >= readiness.timeout {
            return Err(AppError::server(format!(
                "{addr} not accepting connections after {}s",
                readiness.timeout.as_secs()
            )));
        }
        tokio::time::sleep(readiness.poll).await;
    }
}
