// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;
use thiserror::Error;

/// Pre-flight and configuration errors. Anything reaching `main` through this
/// type is printed to stderr and the process exits non-zero; per-ping and
/// resolver failures never surface here, they are converted locally into
/// `fail` events or `None` values instead.
#[derive(Debug, Error)]
pub enum ParaPingError {
    #[error("no hosts provided (pass addresses, use -f, or list a [hosts] section in the config file)")]
    NoHosts,

    #[error(
        "rate limit exceeded: {host_count} hosts at {interval:.3}s interval is {rate:.1} pings/s (max 50/s). {suggestion}"
    )]
    RateLimit {
        host_count: usize,
        interval: f64,
        rate: f64,
        suggestion: String,
    },

    #[error("too many hosts: {0} exceeds the maximum of {1}")]
    TooManyHosts(usize, usize),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("ping helper not found at '{0}'")]
    HelperNotFound(PathBuf),

    #[error("failed to read host file '{path}': {source}")]
    HostFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("invalid value for config field '{key}': expected {expected}, got '{got}'")]
    ConfigField {
        key: String,
        expected: String,
        got: String,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParaPingError>;
