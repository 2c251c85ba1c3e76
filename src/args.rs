// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::layout::PanelPosition;
use clap::{Parser, crate_authors, crate_description, crate_name, crate_version};
use std::path::PathBuf;

fn parse_interval(arg: &str) -> Result<f64, String> {
    match arg.parse::<f64>() {
        Ok(v) if (0.1..=60.0).contains(&v) => Ok(v),
        Ok(v) => Err(format!("interval must be between 0.1 and 60 seconds, got {v}")),
        Err(_) => Err(format!("invalid interval: {arg}")),
    }
}

fn parse_panel_position(arg: &str) -> Result<PanelPosition, String> {
    match arg.to_ascii_lowercase().as_str() {
        "right" => Ok(PanelPosition::Right),
        "left" => Ok(PanelPosition::Left),
        "top" => Ok(PanelPosition::Top),
        "bottom" => Ok(PanelPosition::Bottom),
        "none" => Ok(PanelPosition::None),
        _ => Err(format!("invalid panel position '{arg}' (expected right, left, top, bottom, none)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Display,
    Ping,
}

fn parse_display_mode(arg: &str) -> Result<DisplayMode, String> {
    match arg.to_ascii_lowercase().as_str() {
        "display" => Ok(DisplayMode::Display),
        "ping" => Ok(DisplayMode::Ping),
        _ => Err(format!("invalid pause mode '{arg}' (expected display, ping)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotTz {
    Utc,
    Display,
}

fn parse_snapshot_tz(arg: &str) -> Result<SnapshotTz, String> {
    match arg.to_ascii_lowercase().as_str() {
        "utc" => Ok(SnapshotTz::Utc),
        "display" => Ok(SnapshotTz::Display),
        _ => Err(format!("invalid snapshot timezone mode '{arg}' (expected utc, display)")),
    }
}

/// Command line configuration, parsed and clamped to the ranges spec.md §6
/// requires. `None` fields mean "fall through to config file or default" —
/// the merge with [`crate::config::FileConfig`] happens in `app.rs`.
#[derive(Parser, Debug, Clone)]
#[command(name = crate_name!(), version = crate_version!(), author = crate_authors!(), about = crate_description!())]
pub struct CliArgs {
    #[arg(value_name = "HOST", help = "Hosts to monitor (IP or IP,alias); combined with -f and config [hosts]")]
    pub hosts: Vec<String>,

    #[arg(short = 't', long = "timeout", value_name = "SECONDS", help = "Ping timeout in seconds")]
    pub timeout: Option<u32>,

    #[arg(short = 'c', long = "count", default_value = "0", value_name = "N", help = "Stop after N pings per host (0 = infinite)")]
    pub count: u64,

    #[arg(short = 's', long = "slow-threshold", value_name = "SECONDS", help = "RTT above which a reply is marked slow")]
    pub slow_threshold: Option<f64>,

    #[arg(short = 'i', long = "interval", value_parser = parse_interval, value_name = "SECONDS", help = "Ping interval per host, 0.1-60s")]
    pub interval: Option<f64>,

    #[arg(short = 'v', long = "verbose", help = "Increase output verbosity")]
    pub verbose: bool,

    #[arg(long = "debug", help = "Print debug information where applicable")]
    pub debug: bool,

    #[arg(short = 'f', long = "file", value_name = "PATH", help = "Host list file (IP,alias per line)")]
    pub host_file: Option<PathBuf>,

    #[arg(short = 'P', long = "panel", value_parser = parse_panel_position, value_name = "POSITION", help = "Summary panel position: right, left, top, bottom, none")]
    pub panel_position: Option<PanelPosition>,

    #[arg(short = 'm', long = "pause-mode", value_parser = parse_display_mode, value_name = "MODE", help = "What 'p' pauses: display or ping")]
    pub pause_mode: Option<DisplayMode>,

    #[arg(short = 'z', long = "timezone", value_name = "IANA_TZ", help = "Display timezone, e.g. Europe/Helsinki")]
    pub timezone: Option<String>,

    #[arg(short = 'Z', long = "snapshot-timezone", value_parser = parse_snapshot_tz, value_name = "MODE", help = "Snapshot filename/content timezone: utc or display")]
    pub snapshot_timezone: Option<SnapshotTz>,

    #[arg(short = 'F', long = "flash-on-fail", help = "Flash the terminal bell-free indicator on failures")]
    pub flash_on_fail: bool,

    #[arg(short = 'B', long = "bell-on-fail", help = "Ring the terminal bell on failures")]
    pub bell_on_fail: bool,

    #[arg(short = 'C', long = "color", help = "Enable ANSI color output (off by default)")]
    pub color: bool,

    #[arg(short = 'H', long = "helper", value_name = "PATH", help = "Path to the ping helper binary [default: ./ping_helper]")]
    pub ping_helper: Option<PathBuf>,

    #[arg(long = "no-config", help = "Do not load ~/.paraping.conf")]
    pub no_config: bool,

    #[arg(long = "config", value_name = "PATH", help = "Use an alternate config file path")]
    pub config_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_out_of_range() {
        assert!(parse_interval("0.05").is_err());
        assert!(parse_interval("61").is_err());
        assert!(parse_interval("1.0").is_ok());
    }

    #[test]
    fn panel_position_parses_case_insensitively() {
        assert_eq!(parse_panel_position("RIGHT"), Ok(PanelPosition::Right));
        assert!(parse_panel_position("diagonal").is_err());
    }

    #[test]
    fn snapshot_tz_parses() {
        assert_eq!(parse_snapshot_tz("utc"), Ok(SnapshotTz::Utc));
        assert_eq!(parse_snapshot_tz("display"), Ok(SnapshotTz::Display));
        assert!(parse_snapshot_tz("nope").is_err());
    }
}
