// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-host ring-buffer state and running statistics. Owned exclusively by
//! the UI loop; probers never touch these, they only produce [`crate::events::PingEvent`]s.

use crate::events::PingStatus;
use std::collections::VecDeque;

/// Timeline glyph categories. `Pending` is a reservation made at send time
/// and overwritten in place once the final result arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    Pending,
    Success,
    Slow,
    Fail,
}

impl From<PingStatus> for SlotStatus {
    fn from(s: PingStatus) -> Self {
        match s {
            PingStatus::Success => SlotStatus::Success,
            PingStatus::Slow => SlotStatus::Slow,
            PingStatus::Fail => SlotStatus::Fail,
        }
    }
}

/// Four length-aligned ring buffers (invariant: equal len and maxlen at all
/// times) plus a per-status index of which sequence numbers landed where.
#[derive(Debug, Clone)]
pub struct RingState {
    maxlen: usize,
    timeline: VecDeque<SlotStatus>,
    rtt: VecDeque<Option<f64>>,
    send_time: VecDeque<f64>,
    ttl: VecDeque<Option<u32>>,
    pending_seqs: VecDeque<u16>,
    success_seqs: VecDeque<u16>,
    slow_seqs: VecDeque<u16>,
    fail_seqs: VecDeque<u16>,
}

impl RingState {
    pub fn new(maxlen: usize) -> Self {
        let maxlen = maxlen.max(1);
        Self {
            maxlen,
            timeline: VecDeque::with_capacity(maxlen),
            rtt: VecDeque::with_capacity(maxlen),
            send_time: VecDeque::with_capacity(maxlen),
            ttl: VecDeque::with_capacity(maxlen),
            pending_seqs: VecDeque::new(),
            success_seqs: VecDeque::new(),
            slow_seqs: VecDeque::new(),
            fail_seqs: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn maxlen(&self) -> usize {
        self.maxlen
    }

    pub fn timeline(&self) -> &VecDeque<SlotStatus> {
        &self.timeline
    }

    pub fn rtt(&self) -> &VecDeque<Option<f64>> {
        &self.rtt
    }

    pub fn send_time(&self) -> &VecDeque<f64> {
        &self.send_time
    }

    pub fn ttl(&self) -> &VecDeque<Option<u32>> {
        &self.ttl
    }

    fn push_back_capped(&mut self, status: SlotStatus, rtt: Option<f64>, send_time: f64, ttl: Option<u32>) {
        self.timeline.push_back(status);
        self.rtt.push_back(rtt);
        self.send_time.push_back(send_time);
        self.ttl.push_back(ttl);
        if self.timeline.len() > self.maxlen {
            self.timeline.pop_front();
            self.rtt.pop_front();
            self.send_time.pop_front();
            self.ttl.pop_front();
        }
    }

    /// Record a `sent` event: append a pending slot and index its sequence.
    pub fn record_sent(&mut self, seq: u16, sent_time: f64) {
        self.push_back_capped(SlotStatus::Pending, None, sent_time, None);
        self.pending_seqs.push_back(seq);
        if self.pending_seqs.len() > self.maxlen {
            self.pending_seqs.pop_front();
        }
    }

    /// Record a final event: overwrite the last slot in place if it's
    /// pending for this exact sequence, else append a new slot. Returns the
    /// resolved [`SlotStatus`] so the caller can drive stats/flash logic.
    pub fn record_final(
        &mut self,
        seq: u16,
        status: PingStatus,
        rtt: Option<f64>,
        ttl: Option<u32>,
        finalized_at: f64,
    ) -> SlotStatus {
        let slot_status: SlotStatus = status.into();
        let overwrite = self.timeline.back() == Some(&SlotStatus::Pending)
            && self.pending_seqs.back() == Some(&seq);

        if overwrite {
            *self.timeline.back_mut().unwrap() = slot_status;
            *self.rtt.back_mut().unwrap() = rtt;
            *self.send_time.back_mut().unwrap() = finalized_at;
            *self.ttl.back_mut().unwrap() = ttl;
            self.pending_seqs.pop_back();
        } else {
            self.push_back_capped(slot_status, rtt, finalized_at, ttl);
        }

        let bucket = match slot_status {
            SlotStatus::Success => &mut self.success_seqs,
            SlotStatus::Slow => &mut self.slow_seqs,
            SlotStatus::Fail => &mut self.fail_seqs,
            SlotStatus::Pending => unreachable!("final events never resolve to pending"),
        };
        bucket.push_back(seq);
        if bucket.len() > self.maxlen {
            bucket.pop_front();
        }

        slot_status
    }

    pub fn category(&self, status: SlotStatus) -> &VecDeque<u16> {
        match status {
            SlotStatus::Pending => &self.pending_seqs,
            SlotStatus::Success => &self.success_seqs,
            SlotStatus::Slow => &self.slow_seqs,
            SlotStatus::Fail => &self.fail_seqs,
        }
    }

    /// Resize to a new width, preserving the most recent `min(old, new)`
    /// entries (tail-clip on shrink, pad-empty on grow). Per spec.md §4.7 /
    /// §9: no attempt is made to preserve column alignment with the new
    /// width, only recent content.
    pub fn resize(&mut self, new_maxlen: usize) {
        let new_maxlen = new_maxlen.max(1);
        if new_maxlen == self.maxlen {
            return;
        }
        self.maxlen = new_maxlen;
        for deque_len in [
            self.timeline.len(),
            self.rtt.len(),
            self.send_time.len(),
            self.ttl.len(),
        ] {
            debug_assert_eq!(deque_len, self.timeline.len());
        }
        while self.timeline.len() > new_maxlen {
            self.timeline.pop_front();
            self.rtt.pop_front();
            self.send_time.pop_front();
            self.ttl.pop_front();
        }
        for bucket in [
            &mut self.pending_seqs,
            &mut self.success_seqs,
            &mut self.slow_seqs,
            &mut self.fail_seqs,
        ] {
            while bucket.len() > new_maxlen {
                bucket.pop_front();
            }
        }
    }

    /// Latest timeline slot's rtt, if any.
    pub fn latest_rtt(&self) -> Option<f64> {
        self.rtt.back().copied().flatten()
    }

    pub fn latest_ttl(&self) -> Option<u32> {
        self.ttl.back().copied().flatten()
    }

    /// Length of the current trailing run of `Fail` slots (0 if last slot
    /// isn't a fail, or if empty).
    pub fn fail_streak(&self) -> usize {
        self.timeline
            .iter()
            .rev()
            .take_while(|s| **s == SlotStatus::Fail)
            .count()
    }

    /// Length of the current trailing run of `Success`/`Slow` slots.
    pub fn success_streak(&self) -> usize {
        self.timeline
            .iter()
            .rev()
            .take_while(|s| **s == SlotStatus::Success || **s == SlotStatus::Slow)
            .count()
    }
}

/// Running per-host counters, updated only on finalisation (never on
/// `sent`). `total == success + slow + fail` is an invariant.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsCounters {
    pub success: u64,
    pub slow: u64,
    pub fail: u64,
    pub total: u64,
    pub rtt_sum: f64,
    pub rtt_sum_sq: f64,
    pub rtt_count: u64,
}

impl StatsCounters {
    pub fn record(&mut self, status: SlotStatus, rtt: Option<f64>) {
        match status {
            SlotStatus::Success => self.success += 1,
            SlotStatus::Slow => self.slow += 1,
            SlotStatus::Fail => self.fail += 1,
            SlotStatus::Pending => return,
        }
        self.total += 1;
        if let Some(rtt) = rtt {
            self.rtt_sum += rtt;
            self.rtt_sum_sq += rtt * rtt;
            self.rtt_count += 1;
        }
    }

    pub fn mean_rtt(&self) -> Option<f64> {
        (self.rtt_count > 0).then(|| self.rtt_sum / self.rtt_count as f64)
    }

    /// Population stddev of RTT, `sqrt(max(0, E[x^2] - E[x]^2))`.
    pub fn stddev_rtt(&self) -> Option<f64> {
        let mean = self.mean_rtt()?;
        let mean_sq = self.rtt_sum_sq / self.rtt_count as f64;
        Some((mean_sq - mean * mean).max(0.0).sqrt())
    }

    pub fn success_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.success as f64 / self.total as f64 * 100.0)
    }

    pub fn loss_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.fail as f64 / self.total as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_deques_stay_aligned() {
        let mut r = RingState::new(4);
        r.record_sent(1, 0.0);
        r.record_sent(2, 0.1);
        assert_eq!(r.timeline.len(), r.rtt.len());
        assert_eq!(r.timeline.len(), r.send_time.len());
        assert_eq!(r.timeline.len(), r.ttl.len());
    }

    #[test]
    fn s2_pending_alignment() {
        let mut a = RingState::new(8);
        let mut b = RingState::new(8);
        a.record_sent(1, 0.0);
        b.record_sent(1, 0.010);
        a.record_final(1, PingStatus::Success, Some(0.020), Some(64), 0.030);
        b.record_final(1, PingStatus::Fail, None, None, 1.010);

        assert_eq!(a.timeline.back(), Some(&SlotStatus::Success));
        assert_eq!(b.timeline.back(), Some(&SlotStatus::Fail));
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn overwrite_in_place_moves_seq_category() {
        let mut r = RingState::new(4);
        r.record_sent(5, 0.0);
        assert_eq!(r.category(SlotStatus::Pending).len(), 1);
        r.record_final(5, PingStatus::Success, Some(0.01), Some(64), 0.01);
        assert_eq!(r.category(SlotStatus::Pending).len(), 0);
        assert_eq!(r.category(SlotStatus::Success).len(), 1);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn final_without_pending_appends() {
        let mut r = RingState::new(4);
        r.record_final(5, PingStatus::Fail, None, None, 0.01);
        assert_eq!(r.len(), 1);
        assert_eq!(r.timeline.back(), Some(&SlotStatus::Fail));
    }

    #[test]
    fn resize_shrinks_tail_clip() {
        let mut r = RingState::new(4);
        for i in 0..4u16 {
            r.record_final(i, PingStatus::Success, Some(0.01), Some(1), i as f64);
        }
        r.resize(2);
        assert_eq!(r.len(), 2);
        assert_eq!(r.maxlen(), 2);
    }

    #[test]
    fn resize_grows_without_padding_content() {
        let mut r = RingState::new(2);
        r.record_final(1, PingStatus::Fail, None, None, 0.0);
        r.resize(5);
        assert_eq!(r.maxlen(), 5);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn stats_counted_only_on_final() {
        let mut stats = StatsCounters::default();
        let mut ring = RingState::new(4);
        ring.record_sent(1, 0.0);
        assert_eq!(stats.total, 0);
        let status = ring.record_final(1, PingStatus::Slow, Some(0.5), Some(50), 0.5);
        stats.record(status, Some(0.5));
        assert_eq!(stats.total, 1);
        assert_eq!(stats.slow, 1);
        assert_eq!(stats.success + stats.slow + stats.fail, stats.total);
    }

    #[test]
    fn stddev_formula() {
        let mut stats = StatsCounters::default();
        for rtt in [0.01, 0.02, 0.03] {
            stats.record(SlotStatus::Success, Some(rtt));
        }
        let mean = stats.mean_rtt().unwrap();
        assert!((mean - 0.02).abs() < 1e-9);
        assert!(stats.stddev_rtt().unwrap() > 0.0);
    }

    #[test]
    fn fail_streak_counts_trailing_fails() {
        let mut r = RingState::new(8);
        r.record_final(1, PingStatus::Success, Some(0.01), None, 0.0);
        r.record_final(2, PingStatus::Fail, None, None, 1.0);
        r.record_final(3, PingStatus::Fail, None, None, 2.0);
        assert_eq!(r.fail_streak(), 2);
        assert_eq!(r.success_streak(), 0);
    }
}
