// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-demand execution service.
//!
//! `POST /exec` routes: run locally when this node owns the job's host
//! collector, otherwise forward a `PUT /exec` to each sibling until one
//! succeeds. `PUT` is the terminal form — it only ever runs locally, so a
//! request can hop at most once.

use crate::service::{decode, encode, Fleet, EXEC_SERVICE};
use async_trait::async_trait;
use picket_bus::{BusError, Handler, Verb};
use picket_core::{Clock, Job};
use std::sync::Arc;

/// Deadline for each forwarding attempt.
const FORWARD_TIMEOUT_SECS: u64 = 30;
/// Error recorded when no sibling owns the target.
pub const PRIMARY_NOT_FOUND: &str = "Primary Not Found";

#[derive(Clone)]
pub struct ExecService<C: Clock> {
    fleet: Arc<Fleet<C>>,
}

impl<C: Clock> ExecService<C> {
    pub(crate) fn new(fleet: Arc<Fleet<C>>) -> Self {
        Self { fleet }
    }

    pub(crate) fn activate(&self) {
        self.fleet.ctx.bus.register(
            EXEC_SERVICE,
            self.fleet.ctx.area,
            Arc::new(ExecHandler { fleet: Arc::clone(&self.fleet) }),
        );
    }

    /// Run the job on this node if owned. `None` means "not ours" — either
    /// no collector for the host key, or its loop already stopped.
    async fn exec_local(&self, job: Job) -> Option<Job> {
        let collector = {
            let collectors = self.fleet.collectors.lock();
            collectors.get(&job.host_key()).cloned()
        };
        match collector {
            Some(collector) => match collector.exec_job(job).await {
                Ok(done) => Some(done),
                Err(error) => {
                    tracing::warn!(%error, "local exec failed, treating host as unowned");
                    None
                }
            },
            None => None,
        }
    }

    /// Route a job: local exec, or forward to whichever sibling owns it.
    pub async fn exec(&self, job: Job) -> Job {
        if let Some(done) = self.exec_local(job.clone()).await {
            return done;
        }

        let bus = &self.fleet.ctx.bus;
        let area = self.fleet.ctx.area;
        let local = bus.local_uuid();
        let payload = match encode(&job) {
            Ok(payload) => payload,
            Err(error) => {
                let mut job = job;
                job.fail(error.to_string());
                return job;
            }
        };

        for participant in bus.participants(EXEC_SERVICE, area) {
            if participant == local {
                continue;
            }
            match bus
                .request(
                    participant,
                    EXEC_SERVICE,
                    area,
                    Verb::Put,
                    payload.clone(),
                    FORWARD_TIMEOUT_SECS,
                )
                .await
            {
                Ok(response) => match decode::<Job>(&response) {
                    Ok(done) if done.error != PRIMARY_NOT_FOUND => return done,
                    Ok(_) => continue,
                    Err(error) => {
                        tracing::warn!(%participant, %error, "exec response decode failed");
                    }
                },
                Err(error) => {
                    tracing::debug!(%participant, %error, "exec forward attempt failed");
                }
            }
        }

        let mut job = job;
        job.error = PRIMARY_NOT_FOUND.to_string();
        job
    }

    /// Terminal form: local-only, never re-forwards.
    pub async fn exec_terminal(&self, job: Job) -> Job {
        match self.exec_local(job.clone()).await {
            Some(done) => done,
            None => {
                let mut job = job;
                job.error = PRIMARY_NOT_FOUND.to_string();
                job
            }
        }
    }
}

struct ExecHandler<C: Clock> {
    fleet: Arc<Fleet<C>>,
}

#[async_trait]
impl<C: Clock> Handler for ExecHandler<C> {
    async fn handle(&self, verb: Verb, payload: &[u8]) -> Result<Vec<u8>, BusError> {
        let job: Job = decode(payload)?;
        let service = ExecService { fleet: Arc::clone(&self.fleet) };
        let done = match verb {
            Verb::Post => service.exec(job).await,
            Verb::Put => service.exec_terminal(job).await,
            other => {
                return Err(BusError::Handler(format!("exec: unsupported verb {other}")))
            }
        };
        encode(&done)
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
