// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `~/.paraping.conf` loading: INI or YAML, autodetected from the first
//! non-blank, non-comment line. Priority order is CLI > config file >
//! hardcoded defaults; the merge itself happens in [`crate::app`].

use crate::error::ParaPingError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Raw, type-coerced config values. All fields optional: a missing key
/// means "fall through to CLI default".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileConfig {
    pub interval: Option<f64>,
    pub timeout: Option<u32>,
    pub slow_threshold: Option<f64>,
    pub timezone: Option<String>,
    pub color: Option<bool>,
    pub flash_on_fail: Option<bool>,
    pub bell_on_fail: Option<bool>,
    pub panel_position: Option<String>,
    pub pause_mode: Option<String>,
    pub ping_helper: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub snapshot_timezone: Option<String>,
    pub hosts: Vec<String>,
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_default();
    Path::new(&home).join(".paraping.conf")
}

/// Load config from `path` (or the default path if `None`). Returns the
/// default (empty) `FileConfig` if the file doesn't exist.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig, ParaPingError> {
    let path_buf = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path_buf.exists() {
        return Ok(FileConfig::default());
    }

    let contents = std::fs::read_to_string(&path_buf).map_err(|source| ParaPingError::ConfigIo {
        path: path_buf.clone(),
        source,
    })?;

    if is_yaml_file(&contents) {
        load_yaml_config(&path_buf, &contents)
    } else {
        load_ini_config(&path_buf, &contents)
    }
}

/// First non-blank, non-comment line starting with `[` ⇒ INI; anything
/// else ⇒ YAML.
fn is_yaml_file(contents: &str) -> bool {
    for line in contents.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        return !stripped.starts_with('[');
    }
    false
}

const FIELD_NAMES: &[&str] = &[
    "interval",
    "timeout",
    "slow_threshold",
    "timezone",
    "color",
    "flash_on_fail",
    "bell_on_fail",
    "panel_position",
    "pause_mode",
    "ping_helper",
    "log_level",
    "log_file",
    "snapshot_timezone",
];

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn set_field(cfg: &mut FileConfig, path: &Path, key: &str, raw: &str) -> Result<(), ParaPingError> {
    let field_err = |expected: &str| ParaPingError::ConfigField {
        key: key.to_string(),
        expected: expected.to_string(),
        got: raw.to_string(),
    };

    match key {
        "interval" => cfg.interval = Some(raw.parse().map_err(|_| field_err("float"))?),
        "timeout" => cfg.timeout = Some(raw.parse().map_err(|_| field_err("int"))?),
        "slow_threshold" => cfg.slow_threshold = Some(raw.parse().map_err(|_| field_err("float"))?),
        "timezone" => cfg.timezone = Some(raw.to_string()),
        "color" => cfg.color = Some(parse_bool(raw).ok_or_else(|| field_err("bool"))?),
        "flash_on_fail" => cfg.flash_on_fail = Some(parse_bool(raw).ok_or_else(|| field_err("bool"))?),
        "bell_on_fail" => cfg.bell_on_fail = Some(parse_bool(raw).ok_or_else(|| field_err("bool"))?),
        "panel_position" => cfg.panel_position = Some(raw.to_string()),
        "pause_mode" => cfg.pause_mode = Some(raw.to_string()),
        "ping_helper" => cfg.ping_helper = Some(raw.to_string()),
        "log_level" => cfg.log_level = Some(raw.to_string()),
        "log_file" => cfg.log_file = Some(raw.to_string()),
        "snapshot_timezone" => cfg.snapshot_timezone = Some(raw.to_string()),
        _ => {
            tracing::warn!(path = %path.display(), key, "unknown config key in [default] section, ignoring");
        }
    }
    Ok(())
}

/// Small INI parser: `[section]` headers, `key=value`/`key:value` pairs.
/// Bare lines in `[hosts]` (no delimiter) are host entries too.
fn load_ini_config(path: &Path, contents: &str) -> Result<FileConfig, ParaPingError> {
    let mut cfg = FileConfig::default();
    let mut section: Option<String> = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = Some(line[1..line.len() - 1].trim().to_ascii_lowercase());
            continue;
        }

        let Some(current_section) = section.as_deref() else {
            continue;
        };

        let delim_idx = line.find(['=', ':']);
        match current_section {
            "hosts" => {
                let entry = match delim_idx {
                    Some(idx) => {
                        let value = line[idx + 1..].trim();
                        if value.is_empty() {
                            line[..idx].trim()
                        } else {
                            value
                        }
                    }
                    None => line,
                };
                if !entry.is_empty() {
                    cfg.hosts.push(entry.to_string());
                }
            }
            "default" => match delim_idx {
                Some(idx) => {
                    let key = line[..idx].trim().to_ascii_lowercase();
                    let value = line[idx + 1..].trim();
                    if value.is_empty() {
                        tracing::warn!(path = %path.display(), key, "config key has no value, ignoring");
                    } else if FIELD_NAMES.contains(&key.as_str()) {
                        set_field(&mut cfg, path, &key, value)?;
                    } else {
                        tracing::warn!(path = %path.display(), key, "unknown config key, ignoring");
                    }
                }
                None => {
                    tracing::warn!(path = %path.display(), line, "line in [default] section has no delimiter, ignoring");
                }
            },
            _ => {}
        }
    }

    Ok(cfg)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    #[serde(default)]
    default: HashMap<String, serde_yaml::Value>,
    #[serde(default)]
    hosts: Vec<serde_yaml::Value>,
}

fn load_yaml_config(path: &Path, contents: &str) -> Result<FileConfig, ParaPingError> {
    let parsed: YamlConfig = serde_yaml::from_str(contents).map_err(|e| ParaPingError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut cfg = FileConfig::default();
    for (key, value) in &parsed.default {
        if value.is_null() {
            continue;
        }
        if !FIELD_NAMES.contains(&key.as_str()) {
            tracing::warn!(path = %path.display(), key, "unknown config key in 'default' section, ignoring");
            continue;
        }
        let raw = yaml_scalar_to_string(value);
        set_field(&mut cfg, path, key, &raw)?;
    }

    cfg.hosts = parsed
        .hosts
        .iter()
        .map(yaml_scalar_to_string)
        .filter(|s| !s.is_empty())
        .collect();

    Ok(cfg)
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ini_by_bracket() {
        assert!(!is_yaml_file("[default]\ninterval = 1.0\n"));
        assert!(!is_yaml_file("# comment\n[default]\n"));
    }

    #[test]
    fn detects_yaml_otherwise() {
        assert!(is_yaml_file("default:\n  interval: 1.0\n"));
        assert!(is_yaml_file("# comment\ndefault:\n"));
    }

    #[test]
    fn parses_ini_default_and_hosts() {
        let text = "[default]\ninterval=2.5\ncolor=yes\n\n[hosts]\n10.0.0.1\n10.0.0.2,router\n";
        let cfg = load_ini_config(Path::new("test.conf"), text).unwrap();
        assert_eq!(cfg.interval, Some(2.5));
        assert_eq!(cfg.color, Some(true));
        assert_eq!(cfg.hosts, vec!["10.0.0.1", "10.0.0.2,router"]);
    }

    #[test]
    fn parses_ini_colon_delimiter() {
        let text = "[default]\ninterval: 3.0\n";
        let cfg = load_ini_config(Path::new("test.conf"), text).unwrap();
        assert_eq!(cfg.interval, Some(3.0));
    }

    #[test]
    fn parses_yaml_default_and_hosts() {
        let text = "default:\n  interval: 2.5\n  color: true\nhosts:\n  - 10.0.0.1\n  - 10.0.0.2\n";
        let cfg = load_yaml_config(Path::new("test.yaml"), text).unwrap();
        assert_eq!(cfg.interval, Some(2.5));
        assert_eq!(cfg.color, Some(true));
        assert_eq!(cfg.hosts, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn missing_file_returns_default() {
        let cfg = load_config(Some(Path::new("/nonexistent/.paraping.conf"))).unwrap();
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn invalid_field_value_errors() {
        let text = "[default]\ninterval=not-a-number\n";
        assert!(load_ini_config(Path::new("test.conf"), text).is_err());
    }
}
