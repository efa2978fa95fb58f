// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH collector: a persistent interactive shell with prompt-framed
//! request/response.

pub mod frame;
pub mod link;

pub use link::{RusshLink, ShellLink};

use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use async_trait::async_trait;
use picket_core::{HostProtocol, Job, Poll, Protocol, Purpose};
use std::time::Duration;

/// Pause between terminal-setup commands after connect.
const TERMINAL_COMMAND_SPACING: Duration = Duration::from_millis(250);
/// Settle time before the shell is considered usable.
const CONNECT_SETTLE: Duration = Duration::from_secs(1);
/// Sleep between drain cycles while waiting for a prompt.
const DRAIN_SLEEP: Duration = Duration::from_millis(100);
/// Consecutive empty drain cycles before the stall guard fires.
const MAX_EMPTY_DRAINS: u32 = 5;

/// Connection lifecycle of the persistent shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    New,
    Connecting,
    Connected,
    Executing,
    Disconnected,
}

impl std::fmt::Display for ShellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Executing => "executing",
            Self::Disconnected => "disconnected",
        })
    }
}

pub struct SshCollector {
    config: Option<HostProtocol>,
    resources: Option<Resources>,
    link: Option<Box<dyn ShellLink>>,
    state: ShellState,
    prompts: Vec<String>,
    online: bool,
}

impl SshCollector {
    pub fn new() -> Self {
        Self {
            config: None,
            resources: None,
            link: None,
            state: ShellState::New,
            prompts: frame::default_prompts(),
            online: false,
        }
    }

    /// Build a collector over an already-connected link (tests and sims).
    #[cfg(any(test, feature = "test-support"))]
    pub fn with_link(link: Box<dyn ShellLink>, prompts: Vec<String>) -> Self {
        let prompts = if prompts.is_empty() { frame::default_prompts() } else { prompts };
        Self {
            config: None,
            resources: None,
            link: Some(link),
            state: ShellState::Connected,
            prompts,
            online: true,
        }
    }

    fn deadline_secs(&self, poll: &Poll, job: &Job) -> u64 {
        if poll.timeout_secs > 0 {
            poll.timeout_secs
        } else if job.timeout_secs > 0 {
            job.timeout_secs
        } else {
            self.config.as_ref().map(|c| c.timeout_or_default()).unwrap_or(60)
        }
    }

    /// Run one command through the shell and frame the response.
    async fn run_command(&mut self, command: &str, secs: u64) -> Result<String, CollectError> {
        self.connect().await?;
        let link = self.link.as_mut().ok_or(CollectError::NotConnected)?;

        self.state = ShellState::Executing;
        link.clear();
        if let Err(error) = link.write(command.as_bytes()).await {
            self.drop_link().await;
            return Err(error);
        }
        if let Err(error) = link.write(b"\n").await {
            self.drop_link().await;
            return Err(error);
        }

        let link = self.link.as_mut().ok_or(CollectError::NotConnected)?;
        let deadline = tokio::time::Instant::now() + Duration::from_secs(secs);
        let mut buffer = String::new();
        let mut empty_drains = 0u32;
        loop {
            let mut drained = false;
            while let Some(chunk) = link.try_read() {
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                drained = true;
            }
            if frame::prompt_found(&buffer, &self.prompts) {
                break;
            }
            if drained {
                empty_drains = 0;
            } else {
                empty_drains += 1;
                if empty_drains >= MAX_EMPTY_DRAINS {
                    break;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(DRAIN_SLEEP).await;
        }

        self.state = ShellState::Connected;
        Ok(frame::clean_response(&buffer, command, &self.prompts))
    }

    async fn drop_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close().await;
        }
        self.state = ShellState::Disconnected;
        self.online = false;
    }
}

impl Default for SshCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolCollector for SshCollector {
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError> {
        if !config.prompts.is_empty() {
            self.prompts = config.prompts.clone();
        }
        self.config = Some(config.clone());
        self.resources = Some(resources.clone());
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::Ssh
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
        if self.link.is_some() {
            return Ok(());
        }
        let config = self.config.clone().ok_or(CollectError::NotConnected)?;
        let resources = self.resources.clone().ok_or(CollectError::NotConnected)?;

        self.state = ShellState::Connecting;
        let cred = resources.credentials.credential(&config.cred_id, Purpose::Ssh)?;
        let mut link = match RusshLink::connect(&config, &cred).await {
            Ok(link) => link,
            Err(error) => {
                self.state = ShellState::Disconnected;
                self.online = false;
                return Err(error);
            }
        };

        for command in &config.terminal_commands {
            link.write(command.as_bytes()).await?;
            link.write(b"\n").await?;
            tokio::time::sleep(TERMINAL_COMMAND_SPACING).await;
        }
        tokio::time::sleep(CONNECT_SETTLE).await;

        self.link = Some(Box::new(link));
        self.state = ShellState::Connected;
        self.online = true;
        tracing::debug!(host = %config.addr, "ssh shell established");
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.drop_link().await;
    }

    async fn exec(&mut self, poll: &Poll, job: &mut Job) {
        let secs = self.deadline_secs(poll, job);
        match self.run_command(&poll.what, secs).await {
            Ok(response) => {
                self.online = true;
                job.succeed(response.into_bytes());
            }
            Err(error) => {
                job.fail(error.to_string());
            }
        }
    }

    fn online(&self) -> bool {
        self.online
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
