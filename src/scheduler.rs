// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Wall-clock seconds since an arbitrary but fixed epoch. The scheduler
/// reasons in wall time because stagger offsets are easiest to think about
/// that way; callers convert to monotonic time for the actual sleep.
pub type WallTime = f64;

#[derive(Debug, Clone, Copy, Default)]
struct HostTiming {
    last_send_time: Option<WallTime>,
    next_send_time: Option<WallTime>,
    send_count: u64,
}

/// Anchored real-time scheduler producing staggered per-host send instants.
///
/// Hosts are assigned a stagger slot equal to their insertion order. The
/// first send for host `i` lands at `anchor + i*stagger`; subsequent sends
/// are `last_send + interval`, unless that instant has already passed (e.g.
/// after a pause), in which case timing re-anchors to `now + i*stagger` so
/// stagger order is preserved across all hosts.
pub struct Scheduler {
    inner: Mutex<Inner>,
}

struct Inner {
    interval: f64,
    stagger: f64,
    anchor: Option<WallTime>,
    order: Vec<usize>,
    hosts: HashMap<usize, HostTiming>,
}

impl Scheduler {
    pub fn new(interval: Duration, stagger: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                interval: interval.as_secs_f64(),
                stagger: stagger.as_secs_f64(),
                anchor: None,
                order: Vec::new(),
                hosts: HashMap::new(),
            }),
        }
    }

    /// Idempotent insert; a host's stagger slot is its insertion index.
    pub fn add_host(&self, host_id: usize) {
        let mut inner = self.inner.lock();
        if !inner.hosts.contains_key(&host_id) {
            inner.hosts.insert(host_id, HostTiming::default());
            inner.order.push(host_id);
        }
    }

    pub fn set_interval(&self, interval: Duration) {
        self.inner.lock().interval = interval.as_secs_f64();
    }

    pub fn set_stagger(&self, stagger: Duration) {
        self.inner.lock().stagger = stagger.as_secs_f64();
    }

    pub fn host_count(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Compute each host's next send time given the current wall time.
    /// The schedule is pinned to a single anchor so stagger offsets stay
    /// stable across calls; a host whose naive next time has already
    /// passed (e.g. after a long pause) re-anchors only itself to
    /// `now + idx*stagger`, leaving every other host's timing untouched.
    pub fn get_next_ping_times(&self, now: WallTime) -> HashMap<usize, WallTime> {
        let mut inner = self.inner.lock();
        if inner.anchor.is_none() {
            inner.anchor = Some(now);
        }
        let anchor = inner.anchor.unwrap();
        let interval = inner.interval;
        let stagger = inner.stagger;

        let order = inner.order.clone();
        let mut computed: HashMap<usize, WallTime> = HashMap::with_capacity(order.len());

        for (idx, host_id) in order.iter().enumerate() {
            let timing = inner.hosts.get(host_id).copied().unwrap_or_default();
            let next = match timing.last_send_time {
                None => anchor + idx as f64 * stagger,
                Some(last) => {
                    let naive = last + interval;
                    if naive < now {
                        now + idx as f64 * stagger
                    } else {
                        naive
                    }
                }
            };
            computed.insert(*host_id, next);
        }

        for (host_id, next) in &computed {
            if let Some(timing) = inner.hosts.get_mut(host_id) {
                timing.next_send_time = Some(*next);
            }
        }

        computed
    }

    pub fn mark_ping_sent(&self, host_id: usize, when: WallTime) {
        let mut inner = self.inner.lock();
        if let Some(timing) = inner.hosts.get_mut(&host_id) {
            timing.last_send_time = Some(when);
            timing.send_count += 1;
        }
    }

    pub fn send_count(&self, host_id: usize) -> u64 {
        self.inner
            .lock()
            .hosts
            .get(&host_id)
            .map(|t| t.send_count)
            .unwrap_or(0)
    }

    /// Clear all per-host timing and re-anchor to `now`.
    pub fn reset_timing(&self, now: WallTime) {
        let mut inner = self.inner.lock();
        inner.anchor = Some(now);
        for timing in inner.hosts.values_mut() {
            timing.last_send_time = None;
            timing.next_send_time = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(n: usize, interval: f64) -> Scheduler {
        let s = Scheduler::new(
            Duration::from_secs_f64(interval),
            Duration::from_secs_f64(interval / n as f64),
        );
        for i in 0..n {
            s.add_host(i);
        }
        s
    }

    #[test]
    fn s1_staggering() {
        let s = scheduler(3, 1.0);
        let first = s.get_next_ping_times(1000.0);
        assert!((first[&0] - 1000.0).abs() < 1e-9);
        assert!((first[&1] - 1000.333_333_333).abs() < 1e-6);
        assert!((first[&2] - 1000.666_666_666).abs() < 1e-6);

        s.mark_ping_sent(0, 1000.0);
        let second = s.get_next_ping_times(1000.1);
        assert!((second[&0] - 1001.0).abs() < 1e-9);
        assert!((second[&1] - 1000.333_333_333).abs() < 1e-6);
        assert!((second[&2] - 1000.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn ordering_guarantee_stable_across_calls() {
        let s = scheduler(4, 2.0);
        let a = s.get_next_ping_times(500.0);
        let b = s.get_next_ping_times(500.0);
        for i in 0..4 {
            assert_eq!(a[&i], b[&i]);
        }
    }

    #[test]
    fn reanchors_after_dormancy() {
        let s = scheduler(2, 1.0);
        s.get_next_ping_times(0.0);
        s.mark_ping_sent(0, 0.0);
        s.mark_ping_sent(1, 0.5);
        // time jumps far ahead (e.g. after a pause)
        let resumed = s.get_next_ping_times(100.0);
        assert!(resumed[&0] >= 100.0);
        assert!(resumed[&1] >= 100.0);
        assert!((resumed[&1] - resumed[&0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reset_timing_clears_state() {
        let s = scheduler(2, 1.0);
        s.get_next_ping_times(0.0);
        s.mark_ping_sent(0, 0.0);
        s.reset_timing(50.0);
        let next = s.get_next_ping_times(50.0);
        assert!((next[&0] - 50.0).abs() < 1e-9);
    }
}
