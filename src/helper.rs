// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wraps the external privileged ICMP helper binary. The core never sends
//! ICMP itself; it shells out to a helper that implements the CLI contract
//! below and turns its exit code/stdout into a [`HelperOutcome`].

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Helper exit codes, per the CLI contract.
const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_ARGVAL: i32 = 2;
const EXIT_RESOLUTION: i32 = 3;
const EXIT_SOCKET_PERMISSION: i32 = 4;
const EXIT_SEND: i32 = 5;
const EXIT_SELECT: i32 = 6;
const EXIT_TIMEOUT: i32 = 7;
const EXIT_RECEIVE: i32 = 8;

#[derive(Debug, Error)]
pub enum PingHelperError {
    #[error("ping helper not found at '{0}'")]
    NotFound(PathBuf),

    #[error("ping helper exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("ping helper produced unparsable output: '{0}'")]
    UnparsableOutput(String),

    #[error("ping helper I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ping helper process timed out")]
    ProcessTimeout,
}

/// A successful (non-timeout) reply from the helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelperReply {
    pub rtt: Duration,
    pub ttl: u32,
}

/// Outcome of one helper invocation, collapsing "timeout" (exit 7, not an
/// error) and "reply" into one type the prober can match on directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HelperOutcome {
    Reply(HelperReply),
    Timeout,
}

/// Run the helper binary against `host` with the given timeout and sequence
/// number, parse its result. `timeout_ms` and `icmp_seq` are validated
/// against the contract's argument limits before spawning.
pub async fn ping_with_helper(
    helper_path: &Path,
    host: IpAddr,
    timeout_ms: u32,
    icmp_seq: u16,
) -> Result<HelperOutcome, PingHelperError> {
    if !(1..=60_000).contains(&timeout_ms) {
        return Err(PingHelperError::UnparsableOutput(format!(
            "timeout_ms {timeout_ms} out of range [1, 60000]"
        )));
    }

    if !helper_path.exists() {
        return Err(PingHelperError::NotFound(helper_path.to_path_buf()));
    }

    let mut cmd = Command::new(helper_path);
    cmd.arg(host.to_string())
        .arg(timeout_ms.to_string())
        .arg(icmp_seq.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Give the subprocess a little slack over its own timeout so we observe
    // its exit-7 response rather than racing it with our own cancellation.
    let budget = Duration::from_millis(timeout_ms as u64) + Duration::from_millis(1000);

    let output = timeout(budget, cmd.output())
        .await
        .map_err(|_| PingHelperError::ProcessTimeout)??;

    let code = output.status.code().unwrap_or(-1);
    match code {
        EXIT_SUCCESS => parse_success_stdout(&String::from_utf8_lossy(&output.stdout)),
        EXIT_TIMEOUT => Ok(HelperOutcome::Timeout),
        EXIT_USAGE | EXIT_ARGVAL | EXIT_RESOLUTION | EXIT_SOCKET_PERMISSION | EXIT_SEND
        | EXIT_SELECT | EXIT_RECEIVE => Err(PingHelperError::NonZeroExit {
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        other => Err(PingHelperError::NonZeroExit {
            code: other,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
    }
}

/// Parse `rtt_ms=<float> ttl=<int>` from the helper's success-path stdout.
fn parse_success_stdout(stdout: &str) -> Result<HelperOutcome, PingHelperError> {
    let line = stdout.trim();
    let mut rtt_ms: Option<f64> = None;
    let mut ttl: Option<u32> = None;

    for token in line.split_whitespace() {
        if let Some(v) = token.strip_prefix("rtt_ms=") {
            rtt_ms = v.parse().ok();
        } else if let Some(v) = token.strip_prefix("ttl=") {
            ttl = v.parse().ok();
        }
    }

    match (rtt_ms, ttl) {
        (Some(rtt_ms), Some(ttl)) if rtt_ms.is_finite() && rtt_ms >= 0.0 => {
            Ok(HelperOutcome::Reply(HelperReply {
                rtt: Duration::from_secs_f64(rtt_ms / 1000.0),
                ttl,
            }))
        }
        _ => Err(PingHelperError::UnparsableOutput(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_line() {
        let out = parse_success_stdout("rtt_ms=12.5 ttl=64\n").unwrap();
        match out {
            HelperOutcome::Reply(r) => {
                assert!((r.rtt.as_secs_f64() - 0.0125).abs() < 1e-9);
                assert_eq!(r.ttl, 64);
            }
            _ => panic!("expected Reply"),
        }
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(parse_success_stdout("garbage").is_err());
        assert!(parse_success_stdout("rtt_ms=abc ttl=64").is_err());
        assert!(parse_success_stdout("rtt_ms=1.0").is_err());
    }

    #[tokio::test]
    async fn not_found_errors() {
        let err = ping_with_helper(
            Path::new("/nonexistent/ping_helper_for_tests"),
            "127.0.0.1".parse().unwrap(),
            1000,
            1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PingHelperError::NotFound(_)));
    }
}
