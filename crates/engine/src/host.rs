// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host collection engine: one background loop per (target, host).
//!
//! The loop pops cadence-ready jobs, dispatches them to the matching
//! protocol collector, runs change detection, forwards changed artifacts
//! to the target's parser link, and feeds boot-stage bookkeeping. Jobs
//! execute strictly sequentially within a host; on-demand exec requests
//! are served between jobs over a channel.

use crate::boot::{self, BootSequencer, STAGE_SMOOTHING_MAX};
use crate::error::EngineError;
use crate::library::PollLibrary;
use crate::queue::{JobsQueue, Popped};
use crate::statics::{is_static_job, run_static_job};
use picket_bus::{Bus, Verb};
use picket_core::poll::JOB_SYSTEM_MIB;
use picket_core::{Clock, DeviceClass, Host, HostKey, Job, Protocol, Target};
use picket_protocols::{
    GraphQlCollector, KubectlCollector, ProtocolCollector, Resources, RestCollector,
    SnmpCollector, SshCollector,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Protocol collectors owned by one host loop.
pub type CollectorSet = HashMap<Protocol, Box<dyn ProtocolCollector>>;

/// Depth of the on-demand exec channel.
const EXEC_QUEUE_DEPTH: usize = 8;

/// Shared services a host collector runs against.
#[derive(Clone)]
pub struct HostContext<C: Clock> {
    pub bus: Arc<dyn Bus>,
    pub library: Arc<dyn PollLibrary>,
    pub resources: Resources,
    pub clock: C,
    /// Service-area this collector fleet participates in.
    pub area: u16,
}

/// Build and configure the protocol collectors for a host's configs.
///
/// A collector whose init fails (typically a credential lookup) is logged
/// and skipped; the host keeps serving its other protocols.
pub fn build_collectors(host: &Host, resources: &Resources) -> CollectorSet {
    let mut set: CollectorSet = HashMap::new();
    for (protocol, config) in &host.configs {
        let mut collector: Box<dyn ProtocolCollector> = match protocol {
            Protocol::SnmpV2c => Box::new(SnmpCollector::new()),
            Protocol::Ssh => Box::new(SshCollector::new()),
            Protocol::Restconf => Box::new(RestCollector::new()),
            Protocol::GraphQl => Box::new(GraphQlCollector::new()),
            Protocol::Kubectl => Box::new(KubectlCollector::new()),
        };
        match collector.init(config, resources) {
            Ok(()) => {
                set.insert(*protocol, collector);
            }
            Err(error) => {
                tracing::warn!(
                    host = %host.host_id,
                    protocol = %protocol,
                    %error,
                    "collector init failed, protocol disabled for this host"
                );
            }
        }
    }
    set
}

struct ExecRequest {
    job: Job,
    reply: oneshot::Sender<Job>,
}

/// Handle to a running per-host loop. Cheap to clone; all clones drive
/// the same loop task.
pub struct HostCollector<C: Clock> {
    key: HostKey,
    queue: Arc<JobsQueue<C>>,
    exec_tx: mpsc::Sender<ExecRequest>,
    running: Arc<AtomicBool>,
    stopper: CancellationToken,
}

impl<C: Clock> Clone for HostCollector<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            queue: Arc::clone(&self.queue),
            exec_tx: self.exec_tx.clone(),
            running: Arc::clone(&self.running),
            stopper: self.stopper.clone(),
        }
    }
}

impl<C: Clock> HostCollector<C> {
    /// Spawn the loop for `host`, seeding boot stage zero.
    pub fn start(ctx: HostContext<C>, target: &Target, host: &Host, collectors: CollectorSet) -> Self {
        let key = HostKey::new(target.target_id.clone(), host.host_id.clone());
        let queue = Arc::new(JobsQueue::new(ctx.clock.clone(), ctx.resources.config.clone()));
        let (exec_tx, exec_rx) = mpsc::channel(EXEC_QUEUE_DEPTH);
        let running = Arc::new(AtomicBool::new(true));
        let stopper = CancellationToken::new();

        let run_loop = HostLoop {
            ctx,
            target: target.clone(),
            host_id: host.host_id.clone(),
            links_id: target.links_id.clone(),
            device_class: DeviceClass::default(),
            collectors,
            queue: Arc::clone(&queue),
            boot: BootSequencer::new(),
            running: Arc::clone(&running),
            stopper: stopper.clone(),
            exec_rx,
        };
        tokio::spawn(run_loop.run());

        Self { key, queue, exec_tx, running, stopper }
    }

    pub fn key(&self) -> &HostKey {
        &self.key
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The host's job queue (inspection and tests).
    pub fn queue(&self) -> &Arc<JobsQueue<C>> {
        &self.queue
    }

    /// Stop the loop; collectors disconnect as it unwinds.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.queue.shutdown();
        self.stopper.cancel();
    }

    /// Run one job out-of-band on the owning loop and return the mutated
    /// record. Fails only when the loop has already exited.
    pub async fn exec_job(&self, job: Job) -> Result<Job, EngineError> {
        let (reply, response) = oneshot::channel();
        let request = ExecRequest { job, reply };
        if self.exec_tx.send(request).await.is_err() {
            return Err(EngineError::Stopped(self.key.to_string()));
        }
        response.await.map_err(|_| EngineError::Stopped(self.key.to_string()))
    }
}

struct HostLoop<C: Clock> {
    ctx: HostContext<C>,
    target: Target,
    host_id: String,
    links_id: String,
    device_class: DeviceClass,
    collectors: CollectorSet,
    queue: Arc<JobsQueue<C>>,
    boot: BootSequencer,
    running: Arc<AtomicBool>,
    stopper: CancellationToken,
    exec_rx: mpsc::Receiver<ExecRequest>,
}

impl<C: Clock> HostLoop<C> {
    async fn run(mut self) {
        self.boot.load_stage(
            &self.ctx.library,
            &self.queue,
            &self.device_class,
            &self.target.target_id,
            &self.host_id,
            &self.links_id,
        );

        while self.running.load(Ordering::SeqCst) {
            match self.queue.pop() {
                Popped::Shutdown => break,
                Popped::Wait(secs) => {
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                        _ = self.stopper.cancelled() => {}
                        request = self.exec_rx.recv() => {
                            if let Some(request) = request {
                                self.handle_exec(request).await;
                            }
                        }
                    }
                }
                Popped::Job(job) => {
                    self.run_job(*job).await;
                    while let Ok(request) = self.exec_rx.try_recv() {
                        self.handle_exec(request).await;
                    }
                }
            }
        }

        for collector in self.collectors.values_mut() {
            collector.disconnect().await;
        }
        self.queue.shutdown();
        tracing::debug!(target_id = %self.target.target_id, host = %self.host_id, "host loop stopped");
    }

    async fn run_job(&mut self, mut job: Job) {
        let poll = match self.ctx.library.poll(&job.pollaris, &job) {
            Ok(poll) => poll,
            Err(error) => {
                tracing::warn!(job = %job.key(), %error, "no poll definition, skipping");
                // Stamp the attempt so the job waits out its cadence
                // instead of spinning on the missing definition.
                job.mark_ended(self.ctx.clock.epoch_secs());
                self.queue.complete(job);
                return;
            }
        };

        job.mark_start(self.ctx.clock.epoch_secs());

        if is_static_job(&job.name) {
            run_static_job(&mut job, &self.target, &self.collectors);
            job.mark_ended(self.ctx.clock.epoch_secs());
        } else {
            let Some(collector) = self.collectors.get_mut(&poll.protocol) else {
                job.mark_ended(self.ctx.clock.epoch_secs());
                tracing::warn!(
                    job = %job.key(),
                    protocol = %poll.protocol,
                    "no collector for protocol, disabling job"
                );
                self.queue.disable(&job.key());
                self.queue.complete(job);
                return;
            };
            collector.exec(&poll, &mut job).await;
            job.mark_ended(self.ctx.clock.epoch_secs());
        }

        if self.running.load(Ordering::SeqCst) {
            self.forward_if_changed(&job).await;
            self.boot_bookkeeping(&job).await;
        }

        if job.error_count >= self.ctx.resources.config.max_job_failures {
            tracing::warn!(
                job = %job.key(),
                failures = job.error_count,
                "failure threshold reached, disabling job"
            );
            self.queue.disable(&job.key());
        }
        self.queue.complete(job);
    }

    /// Change detection plus downstream forwarding (§ the parser link).
    async fn forward_if_changed(&self, job: &Job) {
        if !job.has_change() && !job.always {
            return;
        }
        let payload = match serde_json::to_vec(job) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(job = %job.key(), %error, "job encode failed");
                return;
            }
        };
        if let Err(error) = self
            .ctx
            .bus
            .proximity(&job.links_id, self.ctx.area, Verb::Post, payload)
            .await
        {
            tracing::warn!(job = %job.key(), link = %job.links_id, %error, "forward failed");
        }
    }

    async fn boot_bookkeeping(&mut self, job: &Job) {
        self.load_device_detail(job);

        if self.boot.stage().is_none() {
            return;
        }
        self.boot.record_completion(&job.key());
        if self.boot.is_complete() && self.boot.advance() {
            if self.ctx.resources.config.smooth_for_simulators {
                let pause = rand::thread_rng().gen_range(0..STAGE_SMOOTHING_MAX.as_secs());
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
            self.boot.load_stage(
                &self.ctx.library,
                &self.queue,
                &self.device_class,
                &self.target.target_id,
                &self.host_id,
                &self.links_id,
            );
        }
    }

    /// One-shot: a completed `systemMib` walk selects the device-specific
    /// detail bundle by sysObjectID.
    fn load_device_detail(&mut self, job: &Job) {
        if job.name != JOB_SYSTEM_MIB || self.boot.detail_loaded() || !job.error.is_empty() {
            return;
        }
        let Some(sysoid) = boot::sys_object_id(job) else {
            return;
        };
        let Some(detail) = self.ctx.library.by_key(&sysoid, &self.device_class) else {
            tracing::debug!(%sysoid, "no detail pollaris for device");
            return;
        };
        if detail.name == job.pollaris {
            return;
        }
        tracing::info!(%sysoid, pollaris = %detail.name, "device detail bundle selected");
        self.boot.set_detail_loaded();
        boot::schedule_detail(
            Arc::clone(&self.queue),
            detail,
            self.target.target_id.clone(),
            self.host_id.clone(),
            self.links_id.clone(),
        );
    }

    /// Out-of-band execution for the exec service; no queue bookkeeping,
    /// no forwarding — the caller receives the mutated job.
    async fn handle_exec(&mut self, request: ExecRequest) {
        let mut job = request.job;
        match self.ctx.library.poll(&job.pollaris, &job) {
            Err(error) => job.fail(error.to_string()),
            Ok(poll) => {
                job.mark_start(self.ctx.clock.epoch_secs());
                if is_static_job(&job.name) {
                    run_static_job(&mut job, &self.target, &self.collectors);
                } else if let Some(collector) = self.collectors.get_mut(&poll.protocol) {
                    collector.exec(&poll, &mut job).await;
                } else {
                    job.fail(format!("no collector for protocol {}", poll.protocol));
                }
                job.mark_ended(self.ctx.clock.epoch_secs());
            }
        }
        if request.reply.send(job).is_err() {
            tracing::debug!("exec requester went away");
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
