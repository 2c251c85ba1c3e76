// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

/// Final ping status, in increasing order of severity for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PingStatus {
    Success,
    Slow,
    Fail,
}

impl PingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PingStatus::Success => "success",
            PingStatus::Slow => "slow",
            PingStatus::Fail => "fail",
        }
    }
}

/// One message on the event bus, carrying either a `sent` placeholder
/// reservation, a final result, or a per-host completion sentinel.
#[derive(Debug, Clone)]
pub enum PingEvent {
    Sent {
        host_id: usize,
        seq: u16,
        sent_time: f64,
    },
    Final {
        host_id: usize,
        seq: u16,
        status: PingStatus,
        rtt: Option<Duration>,
        ttl: Option<u32>,
    },
    Done {
        host_id: usize,
    },
}

impl PingEvent {
    pub fn host_id(&self) -> usize {
        match self {
            PingEvent::Sent { host_id, .. } => *host_id,
            PingEvent::Final { host_id, .. } => *host_id,
            PingEvent::Done { host_id } => *host_id,
        }
    }
}

/// Unbounded MPMC-style event bus: any number of probers produce, the single
/// UI loop consumes via non-blocking drains. Backed by `tokio::sync::mpsc`
/// (one sender cloned per producer, one receiver owned by the UI loop).
pub type EventSender = tokio::sync::mpsc::UnboundedSender<PingEvent>;
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<PingEvent>;

pub fn event_bus() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Drain every event currently queued without blocking. Producers never
/// block on a full channel since the channel is unbounded; this only ever
/// returns once the channel is momentarily empty.
pub fn drain(rx: &mut EventReceiver) -> Vec<PingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_collects_without_blocking() {
        let (tx, mut rx) = event_bus();
        tx.send(PingEvent::Sent {
            host_id: 0,
            seq: 1,
            sent_time: 0.0,
        })
        .unwrap();
        tx.send(PingEvent::Done { host_id: 0 }).unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].host_id(), 0);
    }

    #[tokio::test]
    async fn drain_empty_channel_returns_empty() {
        let (_tx, mut rx) = event_bus();
        assert!(drain(&mut rx).is_empty());
    }
}
