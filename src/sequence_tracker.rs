// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Per-host ICMP sequence bookkeeping: a mod-2^16 counter and the set of
/// sequences that have been sent but not yet replied to. Caps in-flight pings
/// per host so a black-holed host can't grow memory unbounded or overwhelm
/// the helper.
pub struct SequenceTracker {
    max_outstanding: usize,
    inner: Mutex<HashMap<usize, HostSeq>>,
}

#[derive(Default)]
struct HostSeq {
    next_seq: u16,
    outstanding: HashSet<u16>,
}

impl SequenceTracker {
    pub fn new(max_outstanding: usize) -> Self {
        Self {
            max_outstanding,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the next sequence number for `host_id`, or `None` if the host
    /// is already at its outstanding-ping cap.
    pub fn get_next_sequence(&self, host_id: usize) -> Option<u16> {
        let mut guard = self.inner.lock();
        let host = guard.entry(host_id).or_default();
        if host.outstanding.len() >= self.max_outstanding {
            return None;
        }
        let seq = host.next_seq;
        host.outstanding.insert(seq);
        host.next_seq = host.next_seq.wrapping_add(1);
        Some(seq)
    }

    /// Mark `seq` as replied for `host_id`. Returns whether it was present.
    pub fn mark_replied(&self, host_id: usize, seq: u16) -> bool {
        let mut guard = self.inner.lock();
        match guard.get_mut(&host_id) {
            Some(host) => host.outstanding.remove(&seq),
            None => false,
        }
    }

    pub fn outstanding_count(&self, host_id: usize) -> usize {
        self.inner
            .lock()
            .get(&host_id)
            .map(|h| h.outstanding.len())
            .unwrap_or(0)
    }

    pub fn can_send(&self, host_id: usize) -> bool {
        self.outstanding_count(host_id) < self.max_outstanding
    }

    pub fn reset_host(&self, host_id: usize) {
        self.inner.lock().remove(&host_id);
    }

    pub fn reset_all(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_and_wraps() {
        let t = SequenceTracker::new(4);
        assert_eq!(t.get_next_sequence(0), Some(0));
        t.mark_replied(0, 0);
        assert_eq!(t.get_next_sequence(0), Some(1));
    }

    #[test]
    fn caps_outstanding() {
        let t = SequenceTracker::new(3);
        assert_eq!(t.get_next_sequence(0), Some(0));
        assert_eq!(t.get_next_sequence(0), Some(1));
        assert_eq!(t.get_next_sequence(0), Some(2));
        assert_eq!(t.get_next_sequence(0), None);
        assert!(t.mark_replied(0, 1));
        assert_eq!(t.get_next_sequence(0), Some(3));
    }

    #[test]
    fn wraps_at_65536() {
        let t = SequenceTracker::new(1);
        // force next_seq to 65534 by draining replies as we go
        {
            let mut guard = t.inner.lock();
            guard.entry(0).or_default().next_seq = 65534;
        }
        assert_eq!(t.get_next_sequence(0), Some(65534));
        assert!(t.mark_replied(0, 65534));
        assert_eq!(t.get_next_sequence(0), Some(65535));
        assert!(t.mark_replied(0, 65535));
        assert_eq!(t.get_next_sequence(0), Some(0));
    }

    #[test]
    fn mark_replied_roundtrip() {
        let t = SequenceTracker::new(3);
        let seq = t.get_next_sequence(0).unwrap();
        assert!(t.mark_replied(0, seq));
        assert!(!t.mark_replied(0, seq));
    }

    #[test]
    fn hosts_are_independent() {
        let t = SequenceTracker::new(1);
        assert_eq!(t.get_next_sequence(0), Some(0));
        assert_eq!(t.get_next_sequence(1), Some(0));
    }
}
