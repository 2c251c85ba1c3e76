// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-host async probing task. One is spawned per monitored host; it stays
//! on the scheduler's stagger independent of how long the helper takes to
//! reply by detaching each helper invocation into its own task.

use crate::events::{EventSender, PingEvent, PingStatus};
use crate::scheduler::Scheduler;
use crate::sequence_tracker::SequenceTracker;
use crate::helper::{ping_with_helper, HelperOutcome};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, Instant};

const POLL_INCREMENT: Duration = Duration::from_millis(10);
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared, cloneable configuration and control flags every prober reads.
pub struct ProberConfig {
    pub helper_path: PathBuf,
    pub timeout_ms: u32,
    pub slow_threshold: Duration,
    pub count: u64,
    pub stop: Arc<AtomicBool>,
    pub pause_ping: Arc<AtomicBool>,
}

fn wall_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Sleep until `target` wall-clock time, waking every [`POLL_INCREMENT`] so
/// the caller can observe `stop` promptly. `target` is translated to the
/// monotonic clock once at the start of the wait, per spec.md §9's
/// wall-vs-monotonic note.
async fn sleep_until_wall(target: f64, stop: &AtomicBool) {
    let now = wall_now();
    let delta = (target - now).max(0.0);
    let deadline = Instant::now() + Duration::from_secs_f64(delta);
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        sleep(remaining.min(POLL_INCREMENT)).await;
    }
}

async fn wait_out_pause(stop: &AtomicBool, pause_ping: &AtomicBool) {
    while pause_ping.load(Ordering::Relaxed) {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        sleep(PAUSE_POLL_INTERVAL).await;
    }
}

/// Run the probing loop for one host until `stop` is set or `count` sends
/// are exhausted (count == 0 means infinite). Spawns detached tasks for each
/// helper invocation; the loop itself never blocks on the network.
pub async fn run_prober(
    host_id: usize,
    addr: IpAddr,
    scheduler: Arc<Scheduler>,
    sequence_tracker: Arc<SequenceTracker>,
    events: EventSender,
    config: Arc<ProberConfig>,
) {
    scheduler.add_host(host_id);
    let sent_count = Arc::new(AtomicU64::new(0));

    loop {
        if config.stop.load(Ordering::Relaxed) {
            break;
        }
        wait_out_pause(&config.stop, &config.pause_ping).await;
        if config.stop.load(Ordering::Relaxed) {
            break;
        }

        let next_times = scheduler.get_next_ping_times(wall_now());
        let Some(&target) = next_times.get(&host_id) else {
            break;
        };
        sleep_until_wall(target, &config.stop).await;
        if config.stop.load(Ordering::Relaxed) {
            break;
        }
        wait_out_pause(&config.stop, &config.pause_ping).await;
        if config.stop.load(Ordering::Relaxed) {
            break;
        }

        let now = wall_now();
        let Some(seq) = sequence_tracker.get_next_sequence(host_id) else {
            // at outstanding cap: keep spacing without sending
            scheduler.mark_ping_sent(host_id, now);
            continue;
        };

        let _ = events.send(PingEvent::Sent {
            host_id,
            seq,
            sent_time: now,
        });
        scheduler.mark_ping_sent(host_id, now);

        let current = sent_count.fetch_add(1, Ordering::Relaxed) + 1;

        let helper_path = config.helper_path.clone();
        let timeout_ms = config.timeout_ms;
        let slow_threshold = config.slow_threshold;
        let sequence_tracker = sequence_tracker.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let outcome = ping_with_helper(&helper_path, addr, timeout_ms, seq).await;
            sequence_tracker.mark_replied(host_id, seq);

            let (status, rtt, ttl) = match outcome {
                Ok(HelperOutcome::Reply(reply)) => {
                    let status = if reply.rtt >= slow_threshold {
                        PingStatus::Slow
                    } else {
                        PingStatus::Success
                    };
                    (status, Some(reply.rtt), Some(reply.ttl))
                }
                Ok(HelperOutcome::Timeout) => (PingStatus::Fail, None, None),
                Err(err) => {
                    tracing::debug!(host_id, seq, error = %err, "helper invocation failed");
                    (PingStatus::Fail, None, None)
                }
            };

            let _ = events.send(PingEvent::Final {
                host_id,
                seq,
                status,
                rtt,
                ttl,
            });
        });

        if config.count > 0 && current >= config.count {
            break;
        }
    }

    let _ = events.send(PingEvent::Done { host_id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_bus;
    use crate::sequence_tracker::SequenceTracker;
    use std::time::Duration as StdDuration;

    #[tokio::test(flavor = "multi_thread")]
    async fn prober_emits_done_when_count_exhausted_and_stop_is_set() {
        let (tx, mut rx) = event_bus();
        let scheduler = Arc::new(Scheduler::new(
            StdDuration::from_millis(10),
            StdDuration::from_millis(10),
        ));
        let tracker = Arc::new(SequenceTracker::new(3));
        let stop = Arc::new(AtomicBool::new(false));
        let config = Arc::new(ProberConfig {
            helper_path: PathBuf::from("/nonexistent/ping_helper_for_tests"),
            timeout_ms: 50,
            slow_threshold: StdDuration::from_millis(100),
            count: 1,
            stop: stop.clone(),
            pause_ping: Arc::new(AtomicBool::new(false)),
        });

        run_prober(
            0,
            "127.0.0.1".parse().unwrap(),
            scheduler,
            tracker,
            tx,
            config,
        )
        .await;

        let mut saw_sent = false;
        let mut saw_done = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                PingEvent::Sent { .. } => saw_sent = true,
                PingEvent::Done { host_id } => {
                    saw_done = true;
                    assert_eq!(host_id, 0);
                }
                _ => {}
            }
        }
        assert!(saw_sent);
        assert!(saw_done);
    }

    #[tokio::test]
    async fn stop_flag_halts_before_first_send() {
        let (tx, mut rx) = event_bus();
        let scheduler = Arc::new(Scheduler::new(
            StdDuration::from_secs(60),
            StdDuration::from_secs(60),
        ));
        let tracker = Arc::new(SequenceTracker::new(3));
        let stop = Arc::new(AtomicBool::new(true));
        let config = Arc::new(ProberConfig {
            helper_path: PathBuf::from("/nonexistent/ping_helper_for_tests"),
            timeout_ms: 50,
            slow_threshold: StdDuration::from_millis(100),
            count: 0,
            stop,
            pause_ping: Arc::new(AtomicBool::new(false)),
        });

        run_prober(
            0,
            "127.0.0.1".parse().unwrap(),
            scheduler,
            tracker,
            tx,
            config,
        )
        .await;

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, PingEvent::Done { host_id: 0 }));
    }
}
