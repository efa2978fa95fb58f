// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kubectl collector: shells the poll out against a decoded kubeconfig.
//!
//! The credential slot yields the context name (`user`) and a
//! base64-encoded kubeconfig (`secret`); init materializes the kubeconfig
//! into a temp file that lives as long as the collector.

use crate::args::substitute_args;
use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use picket_core::{HostProtocol, Job, Poll, Protocol, Purpose};
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

pub struct KubectlCollector {
    context: String,
    kubeconfig: Option<NamedTempFile>,
    timeout_secs: u64,
    online: bool,
}

impl KubectlCollector {
    pub fn new() -> Self {
        Self { context: String::new(), kubeconfig: None, timeout_secs: 60, online: false }
    }

    /// Build the one-shot script for a poll after `$`-substitution.
    fn script_line(&self, poll: &Poll, job: &Job) -> Result<String, CollectError> {
        let kubeconfig = self
            .kubeconfig
            .as_ref()
            .ok_or(CollectError::NotConnected)?
            .path()
            .display()
            .to_string();
        let what = substitute_args(&poll.what, job);
        Ok(format!("kubectl --kubeconfig={kubeconfig} --context={} {what}\n", self.context))
    }

    async fn run_script(&self, poll: &Poll, job: &Job) -> Result<Vec<u8>, CollectError> {
        let line = self.script_line(poll, job)?;

        // The script file is removed when this handle drops.
        let mut script = NamedTempFile::new()
            .map_err(|e| CollectError::Io(format!("kubectl script: {e}")))?;
        script
            .write_all(line.as_bytes())
            .map_err(|e| CollectError::Io(format!("kubectl script: {e}")))?;
        let path = script.path().display().to_string();

        let secs = if poll.timeout_secs > 0 { poll.timeout_secs } else { self.timeout_secs };
        let child = Command::new("bash")
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CollectError::Io(format!("kubectl spawn: {e}")))?;

        let output = tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
            .await
            .map_err(|_| CollectError::Timeout { what: format!("kubectl {}", poll.name), secs })?
            .map_err(|e| CollectError::Io(format!("kubectl: {e}")))?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        if !output.status.success() {
            return Err(CollectError::Protocol(format!(
                "kubectl {}: exit {}: {}",
                poll.name,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&combined).trim()
            )));
        }
        Ok(combined)
    }
}

impl Default for KubectlCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolCollector for KubectlCollector {
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError> {
        let cred = resources.credentials.credential(&config.cred_id, Purpose::Kubeconfig)?;
        let decoded = BASE64
            .decode(cred.secret.as_bytes())
            .map_err(|e| CollectError::Config(format!("kubeconfig decode: {e}")))?;

        let mut kubeconfig = NamedTempFile::new()
            .map_err(|e| CollectError::Io(format!("kubeconfig file: {e}")))?;
        kubeconfig
            .write_all(&decoded)
            .map_err(|e| CollectError::Io(format!("kubeconfig file: {e}")))?;

        self.context = cred.user;
        self.kubeconfig = Some(kubeconfig);
        self.timeout_secs = config.timeout_or_default();
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::Kubectl
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
        if self.kubeconfig.is_none() {
            return Err(CollectError::NotConnected);
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.kubeconfig = None;
        self.online = false;
    }

    async fn exec(&mut self, poll: &Poll, job: &mut Job) {
        match self.run_script(poll, job).await {
            Ok(bytes) => {
                self.online = true;
                job.succeed(bytes);
            }
            Err(error) => {
                self.online = false;
                job.fail(error.to_string());
            }
        }
    }

    fn online(&self) -> bool {
        self.online
    }
}

#[cfg(test)]
#[path = "kubectl_tests.rs"]
mod tests;
