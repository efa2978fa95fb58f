// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST collector: `METHOD::/path::{json-body}` polls over a shared client.

use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use async_trait::async_trait;
use picket_core::{Credential, HostProtocol, Job, Poll, Protocol, Purpose};
use reqwest::Method;
use std::time::Duration;

/// The parsed form of a REST poll body.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RestCall {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// Parse `METHOD::PATH::JSON_BODY` (the body part is optional).
pub(crate) fn parse_what(what: &str) -> Result<RestCall, CollectError> {
    let mut parts = what.splitn(3, "::");
    let method = parts.next().unwrap_or_default().trim();
    let path = parts
        .next()
        .ok_or_else(|| CollectError::Config(format!("rest poll '{what}': missing path")))?
        .trim();
    let body = parts.next().map(str::trim).filter(|b| !b.is_empty());

    let method = match method.to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        other => {
            return Err(CollectError::Config(format!("rest poll '{what}': bad method '{other}'")))
        }
    };
    let body = match body {
        Some(raw) => Some(
            serde_json::from_str(raw)
                .map_err(|e| CollectError::Config(format!("rest poll '{what}': bad body: {e}")))?,
        ),
        None => None,
    };
    Ok(RestCall { method, path: path.to_string(), body })
}

/// Base URL from the host config: `http_prefix` may be a bare scheme or a
/// full `scheme://` prefix; it defaults to https.
pub(crate) fn base_url(config: &HostProtocol) -> String {
    let prefix = config.http_prefix.as_deref().unwrap_or("https");
    if prefix.contains("://") {
        format!("{prefix}{}:{}", config.addr, config.port)
    } else {
        format!("{prefix}://{}:{}", config.addr, config.port)
    }
}

pub(crate) fn build_client(config: &HostProtocol) -> Result<reqwest::Client, CollectError> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_or_default()));
    match &config.cert {
        Some(pem) => {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| CollectError::Config(format!("rest cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }
        // Device endpoints routinely present self-signed certificates.
        None => builder = builder.danger_accept_invalid_certs(true),
    }
    builder.build().map_err(|e| CollectError::Config(format!("rest client: {e}")))
}

pub struct RestCollector {
    client: Option<reqwest::Client>,
    base: String,
    cred: Option<Credential>,
    online: bool,
}

impl RestCollector {
    pub fn new() -> Self {
        Self { client: None, base: String::new(), cred: None, online: false }
    }

    async fn run_call(&self, poll: &Poll) -> Result<Vec<u8>, CollectError> {
        let client = self.client.as_ref().ok_or(CollectError::NotConnected)?;
        let call = parse_what(&poll.what)?;
        let url = format!("{}{}", self.base, call.path);

        let mut request = client.request(call.method, &url);
        if let Some(cred) = &self.cred {
            request = request.basic_auth(&cred.user, Some(&cred.secret));
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollectError::Io(format!("rest {url}: {e}")))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CollectError::Io(format!("rest {url}: body: {e}")))?;
        if !status.is_success() {
            return Err(CollectError::Protocol(format!(
                "rest {url}: status {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }
        Ok(bytes.to_vec())
    }
}

impl Default for RestCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolCollector for RestCollector {
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError> {
        self.cred = Some(resources.credentials.credential(&config.cred_id, Purpose::Rest)?);
        self.base = base_url(config);
        self.client = Some(build_client(config)?);
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::Restconf
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
        // HTTP is connectionless here; the pooled client reconnects itself.
        if self.client.is_none() {
            return Err(CollectError::NotConnected);
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.client = None;
        self.online = false;
    }

    async fn exec(&mut self, poll: &Poll, job: &mut Job) {
        match self.run_call(poll).await {
            Ok(bytes) => {
                self.online = true;
                job.succeed(bytes);
            }
            Err(error) => {
                if !matches!(error, CollectError::Config(_)) {
                    self.online = false;
                }
                job.fail(error.to_string());
            }
        }
    }

    fn online(&self) -> bool {
        self.online
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
