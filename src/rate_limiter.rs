// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::ParaPingError;

/// Maximum aggregate ping rate across all hosts, in pings per second.
pub const MAX_RATE: f64 = 50.0;

/// Validate that pinging `host_count` hosts at `interval_secs` does not exceed
/// [`MAX_RATE`] aggregate pings/second. Stateless: a single function call is
/// the entire contract.
pub fn validate(host_count: usize, interval_secs: f64) -> Result<f64, ParaPingError> {
    let rate: f64 = host_count as f64 / interval_secs;
    if rate <= MAX_RATE {
        return Ok(rate);
    }

    let max_hosts: usize = (MAX_RATE * interval_secs).floor() as usize;
    let min_interval: f64 = host_count as f64 / MAX_RATE;
    let suggestion = format!(
        "Reduce host count from {host_count} to {max_hosts}, or increase interval from {interval_secs:.1}s to {min_interval:.1}s, or run multiple instances.",
    );

    Err(ParaPingError::RateLimit {
        host_count,
        interval: interval_secs,
        rate,
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_within_cap() {
        assert!(validate(10, 1.0).is_ok());
        assert_eq!(validate(50, 1.0).unwrap(), 50.0);
    }

    #[test]
    fn rejects_over_cap() {
        let err = validate(100, 1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("50"));
        assert!(msg.contains("Reduce host count from 100 to 50"));
        assert!(msg.contains("Increase interval from 1.0s to 2.0s"));
    }

    #[test]
    fn rate_is_exact() {
        match validate(100, 1.0) {
            Err(ParaPingError::RateLimit { rate, .. }) => assert_eq!(rate, 100.0),
            other => panic!("expected RateLimit error, got {other:?}"),
        }
    }
}
