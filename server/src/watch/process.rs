use shared::types::log_message::LogMessage;
use std::{process::Stdio, sync::Arc};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
    sync::broadcast,
    task::JoinHandle,
};
use tracing::info;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed to kill process: {0}")]
    Kill(std::io::Error),
    #[error("no watch command configured")]
    NotConfigured,
}

/// The command line whose output is streamed to viewers.
#[derive(Debug, Clone)]
pub struct WatchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WatchCommand {
    /// Parses a whitespace-separated command line. Returns `None` for an
    /// empty or all-whitespace string.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

/// A supervised child process whose stdout/stderr lines are fanned out over a
/// broadcast channel, one `LogMessage` per line.
pub struct WatchedProcess {
    command: WatchCommand,
    child: Option<Child>,
    log_handles: Vec<JoinHandle<()>>,
    log_tx: Arc<broadcast::Sender<LogMessage>>,
}

impl WatchedProcess {
    pub fn new(command: WatchCommand, log_tx: Arc<broadcast::Sender<LogMessage>>) -> Self {
        Self {
            command,
            child: None,
            log_handles: Vec::new(),
            log_tx,
        }
    }

    pub async fn start(&mut self) -> Result<(), WatchError> {
        if self.child.is_some() {
            self.stop().await?;
        }
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        info!(program = %self.command.program, "starting watched process");

        let mut child = cmd.spawn().map_err(|source| WatchError::Spawn {
            program: self.command.program.clone(),
            source,
        })?;

        let log_tx = self.log_tx.clone();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout).lines();
            let handle = tokio::spawn(async move {
                while let Ok(Some(line)) = reader.next_line().await {
                    let _ = log_tx.send(LogMessage::new(line));
                }
            });
            self.log_handles.push(handle);
        }

        let log_tx = self.log_tx.clone();
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr).lines();
            let handle = tokio::spawn(async move {
                while let Ok(Some(line)) = reader.next_line().await {
                    let _ = log_tx.send(LogMessage::new(format!("[stderr] {}", line)));
                }
            });
            self.log_handles.push(handle);
        }
        self.child = Some(child);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), WatchError> {
        if let Some(mut child) = self.child.take() {
            match child.kill().await {
                Ok(_) => {
                    let _ = child.wait();
                }
                Err(e) => {
                    return Err(WatchError::Kill(e));
                }
            }
        }
        for handle in self.log_handles.drain(..) {
            handle.abort();
        }
        Ok(())
    }

    pub async fn restart(&mut self) -> Result<(), WatchError> {
        self.stop().await?;
        self.start().await?;
        Ok(())
    }
}
