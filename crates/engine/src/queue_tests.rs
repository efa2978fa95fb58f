// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use picket_core::test_support::snmp_pollaris;
use picket_core::{EngineConfig, FakeClock};
use std::time::Duration;

fn queue_with(polls: &[(&str, u64)]) -> (JobsQueue<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    let queue = JobsQueue::new(clock.clone(), EngineConfig::default());
    for (name, cadence) in polls {
        let pollaris = snmp_pollaris("mib2", name, ".1.3.6.1.2.1.1.1.0", *cadence);
        queue.insert_pollaris(&pollaris, "t1", "h1", "parser");
    }
    (queue, clock)
}

fn pop_job<C: picket_core::Clock>(queue: &JobsQueue<C>) -> Job {
    match queue.pop() {
        Popped::Job(job) => *job,
        other => panic!("expected a ready job, got {other:?}"),
    }
}

#[test]
fn never_run_jobs_are_immediately_ready() {
    let (queue, _clock) = queue_with(&[("sysDescr", 30)]);
    let job = pop_job(&queue);
    assert_eq!(job.name, "sysDescr");
}

#[test]
fn waits_until_cadence_elapses() {
    let (queue, clock) = queue_with(&[("sysDescr", 30)]);

    let mut job = pop_job(&queue);
    job.mark_start(clock.epoch_secs());
    job.succeed(vec![1]);
    job.mark_ended(clock.epoch_secs());
    queue.complete(job);

    match queue.pop() {
        Popped::Wait(secs) => assert_eq!(secs, 30),
        other => panic!("expected wait, got {other:?}"),
    }

    clock.advance(Duration::from_secs(12));
    match queue.pop() {
        Popped::Wait(secs) => assert_eq!(secs, 18),
        other => panic!("expected wait, got {other:?}"),
    }

    clock.advance(Duration::from_secs(18));
    assert_eq!(pop_job(&queue).name, "sysDescr");
}

#[test]
fn round_robin_fairness() {
    // Two jobs ready at once: each must run exactly once per cycle.
    let (queue, clock) = queue_with(&[("a", 1), ("b", 1)]);

    let mut sequence = Vec::new();
    for _ in 0..6 {
        let mut job = pop_job(&queue);
        sequence.push(job.name.clone());
        job.mark_ended(clock.epoch_secs());
        queue.complete(job);
        clock.advance(Duration::from_secs(1));
    }

    assert_eq!(sequence, vec!["a", "b", "a", "b", "a", "b"]);
}

#[test]
fn duplicate_insert_rearms_single_entry() {
    let (queue, clock) = queue_with(&[("sysDescr", 30)]);

    let mut job = pop_job(&queue);
    job.mark_start(clock.epoch_secs());
    job.mark_ended(clock.epoch_secs());
    queue.complete(job);
    assert!(matches!(queue.pop(), Popped::Wait(_)));

    // Re-insert: still one entry, timings zeroed, immediately ready again.
    let pollaris = snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 30);
    queue.insert_pollaris(&pollaris, "t1", "h1", "parser");
    assert_eq!(queue.len(), 1);
    assert_eq!(pop_job(&queue).name, "sysDescr");
}

#[test]
fn disabled_jobs_are_skipped() {
    let (queue, _clock) = queue_with(&[("a", 1), ("b", 1)]);
    queue.disable(&JobKey::new("mib2", "a"));

    assert_eq!(pop_job(&queue).name, "b");
}

#[test]
fn reinsert_enables_disabled_job() {
    let (queue, _clock) = queue_with(&[("a", 1)]);
    queue.disable(&JobKey::new("mib2", "a"));
    assert!(matches!(queue.pop(), Popped::Wait(_)));

    let pollaris = snmp_pollaris("mib2", "a", ".1.3.6.1.2.1.1.1.0", 1);
    queue.insert_pollaris(&pollaris, "t1", "h1", "parser");
    assert_eq!(pop_job(&queue).name, "a");
}

#[test]
fn disabled_poll_definitions_not_materialized() {
    let clock = FakeClock::new();
    let queue = JobsQueue::new(clock, EngineConfig::default());
    let mut pollaris = snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 30);
    if let Some(poll) = pollaris.polls.get_mut("sysDescr") {
        poll.cadence.enabled = false;
    }

    queue.insert_pollaris(&pollaris, "t1", "h1", "parser");
    assert!(queue.is_empty());
}

#[test]
fn empty_queue_reports_idle_wait() {
    let clock = FakeClock::new();
    let queue: JobsQueue<FakeClock> = JobsQueue::new(clock, EngineConfig::default());
    assert!(matches!(queue.pop(), Popped::Wait(_)));
}

#[test]
fn shutdown_wins_over_everything() {
    let (queue, _clock) = queue_with(&[("a", 1)]);
    queue.shutdown();
    assert_eq!(queue.pop(), Popped::Shutdown);
}

#[test]
fn complete_preserves_concurrent_disable() {
    let (queue, clock) = queue_with(&[("a", 1)]);
    let mut job = pop_job(&queue);
    queue.disable(&job.key());

    job.mark_ended(clock.epoch_secs());
    queue.complete(job);

    let stored = queue.get(&JobKey::new("mib2", "a")).unwrap();
    assert!(!stored.cadence.enabled);
}

#[test]
fn smoothing_spreads_first_collection() {
    let clock = FakeClock::new();
    let config = EngineConfig { smooth_first_collection: true, ..Default::default() };
    let queue = JobsQueue::new(clock.clone(), config);
    let pollaris = snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 600);
    queue.insert_pollaris(&pollaris, "t1", "h1", "parser");

    // First pop draws the startup offset and anchors the window.
    let first = queue.pop();
    let stored = queue.get(&JobKey::new("mib2", "sysDescr")).unwrap();
    let offset = stored.cadence.startup().unwrap();
    assert!((0..600).contains(&offset));

    match first {
        // Zero offset: fired immediately, nothing more to check.
        Popped::Job(_) => assert_eq!(offset, 0),
        Popped::Wait(secs) => {
            assert_eq!(secs, offset as u64);
            // After the offset elapses the job fires.
            clock.advance(Duration::from_secs(offset as u64));
            assert!(matches!(queue.pop(), Popped::Job(_)));
        }
        Popped::Shutdown => panic!("queue not shut down"),
    }
}

#[test]
fn smoothing_does_not_delay_repeat_runs() {
    let clock = FakeClock::new();
    let config = EngineConfig { smooth_first_collection: true, ..Default::default() };
    let queue = JobsQueue::new(clock.clone(), config);
    let pollaris = snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 60);
    queue.insert_pollaris(&pollaris, "t1", "h1", "parser");

    // First pop draws the offset; advancing past the full window makes the
    // job ready whatever the draw was.
    let _ = queue.pop();
    clock.advance(Duration::from_secs(60));
    let mut job = pop_job(&queue);
    job.mark_start(clock.epoch_secs());
    job.mark_ended(clock.epoch_secs());
    queue.complete(job);

    // Steady state: the plain cadence applies again.
    match queue.pop() {
        Popped::Wait(secs) => assert_eq!(secs, 60),
        other => panic!("expected wait, got {other:?}"),
    }
    clock.advance(Duration::from_secs(60));
    assert!(matches!(queue.pop(), Popped::Job(_)));
}
