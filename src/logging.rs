// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging setup. The TUI owns the terminal, so diagnostics never
//! go to stdout/stderr directly once the UI is running; they go to a file
//! when `log_file` is set, and are otherwise suppressed past startup.

use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }

    fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Initialize the global tracing subscriber. When `log_file` is given, logs
/// go there (append mode); otherwise they go to stderr, which is only safe
/// before the TUI enters the alternate screen.
pub fn init(level: LogLevel, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match log_file {
        Some(path) => {
            if let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
                builder.with_writer(move || file.try_clone().expect("log file clone")).init();
            } else {
                builder.with_writer(std::io::stderr).init();
            }
        }
        None => {
            builder.with_writer(std::io::stderr).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Debug);
    }
}
