// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History navigation: a bounded ring of deep-copied per-host state, taken
//! roughly once a second, with `history_offset` selecting live (0) or a
//! specific past snapshot.

use crate::ring::{RingState, StatsCounters};
use std::collections::{HashMap, VecDeque};

pub const HISTORY_DURATION_MINUTES: u64 = 30;
pub const SNAPSHOT_INTERVAL_SECONDS: f64 = 1.0;

fn max_snapshots() -> usize {
    (HISTORY_DURATION_MINUTES * 60) as usize
}

/// One immutable deep copy of every host's ring state and stats.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestamp: f64,
    pub rings: HashMap<usize, RingState>,
    pub stats: HashMap<usize, StatsCounters>,
}

pub struct SnapshotRing {
    ring: VecDeque<Snapshot>,
    capacity: usize,
    last_snapshot_time: f64,
    /// 0 = live; > 0 = index `len - 1 - offset`.
    history_offset: usize,
    cached_page_step: Option<(usize, usize)>, // keyed on (term_w, term_h) -> page_step
}

impl Default for SnapshotRing {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotRing {
    pub fn new() -> Self {
        Self {
            ring: VecDeque::with_capacity(max_snapshots()),
            capacity: max_snapshots(),
            last_snapshot_time: 0.0,
            history_offset: 0,
            cached_page_step: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn history_offset(&self) -> usize {
        self.history_offset
    }

    pub fn is_live(&self) -> bool {
        self.history_offset == 0
    }

    /// Append a snapshot if at least `SNAPSHOT_INTERVAL_SECONDS` has elapsed
    /// since the last one. If currently viewing history, bumps the offset
    /// so it keeps pointing at the same logical snapshot (not the same wall
    /// time), per spec.md §4.6.
    pub fn maybe_snapshot(
        &mut self,
        now: f64,
        rings: &HashMap<usize, RingState>,
        stats: &HashMap<usize, StatsCounters>,
    ) -> bool {
        if now - self.last_snapshot_time < SNAPSHOT_INTERVAL_SECONDS {
            return false;
        }
        self.last_snapshot_time = now;
        self.push(Snapshot {
            timestamp: now,
            rings: rings.clone(),
            stats: stats.clone(),
        });
        true
    }

    fn push(&mut self, snap: Snapshot) {
        if self.history_offset > 0 {
            self.history_offset = (self.history_offset + 1).min(self.ring.len().max(1));
        }
        self.ring.push_back(snap);
        if self.ring.len() > self.capacity {
            self.ring.pop_front();
        }
    }

    /// Move the offset back by `step` snapshots (toward older history),
    /// clamped to `len - 1`.
    pub fn move_back(&mut self, step: usize) {
        if self.ring.is_empty() {
            return;
        }
        self.history_offset = (self.history_offset + step).min(self.ring.len() - 1);
    }

    /// Move the offset forward by `step` snapshots (toward live), floored
    /// at 0.
    pub fn move_forward(&mut self, step: usize) {
        self.history_offset = self.history_offset.saturating_sub(step);
    }

    pub fn current(&self) -> Option<&Snapshot> {
        if self.ring.is_empty() {
            return None;
        }
        let idx = self.ring.len() - 1 - self.history_offset.min(self.ring.len() - 1);
        self.ring.get(idx)
    }

    /// Page step (cached by terminal size) equals the current timeline
    /// width; recomputed only when the terminal size changes.
    pub fn cached_page_step(&mut self, term_w: usize, term_h: usize, timeline_width: usize) -> usize {
        match self.cached_page_step {
            Some((cached_key, cached_val)) if cached_key == term_w * 100_000 + term_h => cached_val,
            _ => {
                let step = timeline_width.max(1);
                self.cached_page_step = Some((term_w * 100_000 + term_h, step));
                step
            }
        }
    }

    pub fn invalidate_page_step_cache(&mut self) {
        self.cached_page_step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> (HashMap<usize, RingState>, HashMap<usize, StatsCounters>) {
        let mut rings = HashMap::new();
        rings.insert(0, RingState::new(10));
        let mut stats = HashMap::new();
        stats.insert(0, StatsCounters::default());
        (rings, stats)
    }

    #[test]
    fn snapshots_gated_by_interval() {
        let mut sr = SnapshotRing::new();
        let (rings, stats) = empty_state();
        assert!(sr.maybe_snapshot(0.0, &rings, &stats));
        assert!(!sr.maybe_snapshot(0.5, &rings, &stats));
        assert!(sr.maybe_snapshot(1.0, &rings, &stats));
        assert_eq!(sr.len(), 2);
    }

    #[test]
    fn offset_increments_while_viewing_history() {
        let mut sr = SnapshotRing::new();
        let (rings, stats) = empty_state();
        sr.maybe_snapshot(0.0, &rings, &stats);
        sr.maybe_snapshot(1.0, &rings, &stats);
        sr.move_back(1);
        assert_eq!(sr.history_offset(), 1);
        sr.maybe_snapshot(2.0, &rings, &stats);
        // still points at the same logical (now second-to-last) snapshot
        assert_eq!(sr.history_offset(), 2);
    }

    #[test]
    fn move_forward_returns_to_live() {
        let mut sr = SnapshotRing::new();
        let (rings, stats) = empty_state();
        sr.maybe_snapshot(0.0, &rings, &stats);
        sr.maybe_snapshot(1.0, &rings, &stats);
        sr.move_back(5);
        assert_eq!(sr.history_offset(), 1);
        sr.move_forward(10);
        assert!(sr.is_live());
    }

    #[test]
    fn page_step_cache_keyed_on_terminal_size() {
        let mut sr = SnapshotRing::new();
        assert_eq!(sr.cached_page_step(80, 24, 61), 61);
        assert_eq!(sr.cached_page_step(80, 24, 999), 61);
        sr.invalidate_page_step_cache();
        assert_eq!(sr.cached_page_step(80, 24, 70), 70);
    }
}
