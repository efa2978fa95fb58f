// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cadence-based job queue with round-robin ordering.
//!
//! Ready-job selection scans insertion order; a selected job moves to the
//! tail so every eligible job runs once per cycle before any repeat.

use parking_lot::Mutex;
use picket_core::{Clock, EngineConfig, Job, JobKey, Pollaris};
use rand::Rng;
use std::collections::HashMap;

/// Sleep when the queue holds nothing schedulable at all.
const IDLE_WAIT_SECS: u64 = 1;

/// Outcome of a [`JobsQueue::pop`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popped {
    /// A ready job, already moved to the tail.
    Job(Box<Job>),
    /// Nothing ready; seconds until the nearest job is due.
    Wait(u64),
    /// The queue was shut down.
    Shutdown,
}

struct Inner {
    order: Vec<JobKey>,
    jobs: HashMap<JobKey, Job>,
    down: bool,
}

pub struct JobsQueue<C: Clock> {
    clock: C,
    config: EngineConfig,
    inner: Mutex<Inner>,
}

impl<C: Clock> JobsQueue<C> {
    pub fn new(clock: C, config: EngineConfig) -> Self {
        Self {
            clock,
            config,
            inner: Mutex::new(Inner { order: Vec::new(), jobs: HashMap::new(), down: false }),
        }
    }

    /// Materialize one job per enabled poll of `pollaris`.
    ///
    /// A job already present is re-armed (timings zeroed) instead of
    /// duplicated; disabled polls are skipped.
    pub fn insert_pollaris(
        &self,
        pollaris: &Pollaris,
        target_id: &str,
        host_id: &str,
        links_id: &str,
    ) {
        let mut inner = self.inner.lock();
        for poll in pollaris.polls.values() {
            if !poll.cadence.enabled {
                continue;
            }
            let key = JobKey::new(pollaris.name.clone(), poll.name.clone());
            match inner.jobs.get_mut(&key) {
                Some(existing) => {
                    existing.started = 0;
                    existing.ended = 0;
                    existing.cadence.enabled = true;
                }
                None => {
                    let job = Job {
                        target_id: target_id.to_string(),
                        host_id: host_id.to_string(),
                        links_id: links_id.to_string(),
                        pollaris: pollaris.name.clone(),
                        name: poll.name.clone(),
                        cadence: poll.cadence.clone(),
                        timeout_secs: poll.timeout_secs,
                        arguments: HashMap::new(),
                        started: 0,
                        ended: 0,
                        result: None,
                        last_result: None,
                        error: String::new(),
                        error_count: 0,
                        always: poll.always,
                    };
                    inner.order.push(key.clone());
                    inner.jobs.insert(key, job);
                }
            }
        }
    }

    /// Select the first cadence-ready job in order and move it to the tail.
    pub fn pop(&self) -> Popped {
        let now = self.clock.epoch_secs();
        let mut inner = self.inner.lock();
        if inner.down {
            return Popped::Shutdown;
        }

        let mut min_wait: Option<u64> = None;
        for idx in 0..inner.order.len() {
            let key = inner.order[idx].clone();
            let Some(job) = inner.jobs.get_mut(&key) else {
                continue;
            };
            if !job.cadence.enabled {
                continue;
            }
            let interval = job_cadence(&self.config, job, now);
            let elapsed = now.saturating_sub(job.ended);
            if elapsed >= interval {
                let selected = job.clone();
                inner.order.remove(idx);
                inner.order.push(key);
                return Popped::Job(Box::new(selected));
            }
            let wait = interval - elapsed;
            min_wait = Some(min_wait.map_or(wait, |w| w.min(wait)));
        }
        Popped::Wait(min_wait.unwrap_or(IDLE_WAIT_SECS))
    }

    /// Write a finished job's runtime state back into the queue.
    ///
    /// The stored enabled flag wins so a concurrent disable is not undone.
    pub fn complete(&self, job: Job) {
        let mut inner = self.inner.lock();
        if let Some(stored) = inner.jobs.get_mut(&job.key()) {
            let enabled = stored.cadence.enabled;
            *stored = job;
            stored.cadence.enabled = enabled;
        }
    }

    /// Disable a job in place; it stays queued but is skipped until
    /// re-inserted.
    pub fn disable(&self, key: &JobKey) {
        let mut inner = self.inner.lock();
        if let Some(job) = inner.jobs.get_mut(key) {
            job.cadence.enabled = false;
        }
    }

    pub fn shutdown(&self) {
        self.inner.lock().down = true;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    /// Snapshot of a stored job, for inspection.
    pub fn get(&self, key: &JobKey) -> Option<Job> {
        self.inner.lock().jobs.get(key).cloned()
    }
}

/// Effective interval for a job.
///
/// Steady state returns the active cadence slot. Under smoothed first
/// collection, a job that has never started draws a one-time uniform
/// offset in `[0, cadence)`; the first run is anchored at scheduling time
/// plus that offset, spreading initial collection across the window.
fn job_cadence(config: &EngineConfig, job: &mut Job, now: u64) -> u64 {
    let base = job.cadence.interval();
    if !config.smooth_first_collection || job.started != 0 || base == 0 {
        return base;
    }
    match job.cadence.startup() {
        Some(offset) => offset as u64,
        None => {
            let offset = rand::thread_rng().gen_range(0..base);
            job.cadence.set_startup(offset as i64);
            if job.ended == 0 {
                job.ended = now;
            }
            offset
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
