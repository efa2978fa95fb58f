// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GraphQL collector: posts the poll body as a query document.

use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use crate::rest::{base_url, build_client};
use async_trait::async_trait;
use picket_core::{Credential, HostProtocol, Job, Poll, Protocol, Purpose};
use serde::Serialize;

#[derive(Serialize)]
struct QueryEnvelope<'a> {
    query: &'a str,
}

pub struct GraphQlCollector {
    client: Option<reqwest::Client>,
    endpoint: String,
    cred: Option<Credential>,
    online: bool,
}

impl GraphQlCollector {
    pub fn new() -> Self {
        Self { client: None, endpoint: String::new(), cred: None, online: false }
    }

    async fn run_query(&self, poll: &Poll) -> Result<Vec<u8>, CollectError> {
        let client = self.client.as_ref().ok_or(CollectError::NotConnected)?;
        let mut request = client
            .post(&self.endpoint)
            .json(&QueryEnvelope { query: &poll.what });
        if let Some(cred) = &self.cred {
            request = request.basic_auth(&cred.user, Some(&cred.secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollectError::Io(format!("graphql {}: {e}", self.endpoint)))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CollectError::Io(format!("graphql {}: body: {e}", self.endpoint)))?;
        if !status.is_success() {
            return Err(CollectError::Protocol(format!(
                "graphql {}: status {status}: {}",
                self.endpoint,
                String::from_utf8_lossy(&bytes)
            )));
        }
        Ok(bytes.to_vec())
    }
}

impl Default for GraphQlCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolCollector for GraphQlCollector {
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError> {
        self.cred = Some(resources.credentials.credential(&config.cred_id, Purpose::Graph)?);
        self.endpoint = format!("{}/graphql", base_url(config));
        self.client = Some(build_client(config)?);
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::GraphQl
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
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
        match self.run_query(poll).await {
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
#[path = "graphql_tests.rs"]
mod tests;
