// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration: pre-flight validation, config/CLI merge, task spawning,
//! the main UI loop, and graceful shutdown. Grounded in the original
//! `cli.py::run` control flow and the teacher's `main.rs` task-spawn shape.

use crate::args::{CliArgs, DisplayMode, SnapshotTz};
use crate::config::{self, FileConfig};
use crate::controller::{self, ControllerState, Effect, Mode, PauseMode};
use crate::error::{ParaPingError, Result};
use crate::escape::{self, ResolvedKey};
use crate::events::{event_bus, PingEvent};
use crate::hostfile::{parse_cli_host_arg, read_input_file, HostLine};
use crate::layout::{compute_main_layout, compute_panel_sizes, PanelPosition};
use crate::logging::{self, LogLevel};
use crate::prober::{run_prober, ProberConfig};
use crate::rate_limiter;
use crate::render::{self, HostEntry};
use crate::resolvers::{self, AsnCache, AsnReply, RdnsReply};
use crate::ring::{RingState, StatsCounters};
use crate::scheduler::Scheduler;
use crate::sequence_tracker::SequenceTracker;
use crate::snapshot::SnapshotRing;
use crate::tui::{panic_handler, TerminalGuard};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Hard ceiling on monitored hosts, independent of the rate-limit check:
/// a single process fanning out more than this many prober tasks stops
/// being "a terminal monitor" and starts being a load generator.
pub const MAX_HOSTS: usize = 128;

const UI_TICK: Duration = Duration::from_millis(20);
const RENDER_INTERVAL: Duration = Duration::from_millis(150);
const DEFAULT_SLOW_THRESHOLD_SECS: f64 = 0.2;
const DEFAULT_TIMEOUT_SECS: u32 = 2;
const MAX_OUTSTANDING_PER_HOST: usize = 3;

struct HostInfo {
    addr: IpAddr,
    alias: String,
    rdns: Option<String>,
    asn: Option<u32>,
}

fn wall_now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

/// Merge CLI, config-file, and hardcoded defaults (CLI wins, then config,
/// then default), building the final runtime settings.
struct Settings {
    hosts: Vec<HostLine>,
    interval: f64,
    timeout_secs: u32,
    slow_threshold: f64,
    panel_position: PanelPosition,
    pause_mode: PauseMode,
    color: bool,
    flash_on_fail: bool,
    bell_on_fail: bool,
    ping_helper: PathBuf,
    log_level: LogLevel,
    log_file: Option<PathBuf>,
    count: u64,
    display_tz: chrono_tz::Tz,
    snapshot_tz: SnapshotTz,
}

fn gather_hosts(cli: &CliArgs, file_cfg: &FileConfig) -> Result<Vec<HostLine>> {
    let mut hosts = Vec::new();

    for raw in &cli.hosts {
        if let Some(h) = parse_cli_host_arg(raw) {
            hosts.push(h);
        }
    }

    if let Some(path) = &cli.host_file {
        hosts.extend(read_input_file(path)?);
    }

    for raw in &file_cfg.hosts {
        if let Some(h) = parse_cli_host_arg(raw) {
            hosts.push(h);
        }
    }

    Ok(hosts)
}

fn build_settings(cli: &CliArgs, file_cfg: &FileConfig) -> Result<Settings> {
    let hosts = gather_hosts(cli, file_cfg)?;
    if hosts.is_empty() {
        return Err(ParaPingError::NoHosts);
    }
    if hosts.len() > MAX_HOSTS {
        return Err(ParaPingError::TooManyHosts(hosts.len(), MAX_HOSTS));
    }

    let interval = cli.interval.or(file_cfg.interval).unwrap_or(1.0);
    let timeout_secs = cli.timeout.or(file_cfg.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
    let slow_threshold = cli
        .slow_threshold
        .or(file_cfg.slow_threshold)
        .unwrap_or(DEFAULT_SLOW_THRESHOLD_SECS);

    let panel_position = cli.panel_position.unwrap_or_else(|| {
        file_cfg
            .panel_position
            .as_deref()
            .and_then(|s| match s.to_ascii_lowercase().as_str() {
                "left" => Some(PanelPosition::Left),
                "right" => Some(PanelPosition::Right),
                "top" => Some(PanelPosition::Top),
                "bottom" => Some(PanelPosition::Bottom),
                "none" => Some(PanelPosition::None),
                _ => None,
            })
            .unwrap_or(PanelPosition::Right)
    });

    let pause_mode = cli.pause_mode.map(|m| match m {
        DisplayMode::Display => PauseMode::Display,
        DisplayMode::Ping => PauseMode::Ping,
    }).unwrap_or_else(|| {
        match file_cfg.pause_mode.as_deref() {
            Some("display") => PauseMode::Display,
            _ => PauseMode::Ping,
        }
    });

    // Color is opt-in, matching the original CLI's `-C`/`--color` default-off
    // behavior; off-TTY output is never colored regardless of the flag.
    let stdout_is_tty = std::io::stdout().is_terminal();
    let color = stdout_is_tty && (cli.color || file_cfg.color.unwrap_or(false));

    let flash_on_fail = cli.flash_on_fail || file_cfg.flash_on_fail.unwrap_or(false);
    let bell_on_fail = cli.bell_on_fail || file_cfg.bell_on_fail.unwrap_or(false);

    let ping_helper = cli
        .ping_helper
        .clone()
        .or_else(|| file_cfg.ping_helper.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./ping_helper"));
    if !ping_helper.exists() {
        return Err(ParaPingError::HelperNotFound(ping_helper));
    }

    let log_level = LogLevel::from_flags(cli.verbose, cli.debug).max(
        match file_cfg.log_level.as_deref() {
            Some("debug") => LogLevel::Debug,
            Some("info") => LogLevel::Info,
            _ => LogLevel::Warn,
        },
    );
    let log_file = file_cfg.log_file.clone().map(PathBuf::from);

    let tz_name = cli.timezone.clone().or_else(|| file_cfg.timezone.clone());
    let display_tz = match tz_name {
        Some(name) => name
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ParaPingError::UnknownTimezone(name))?,
        None => chrono_tz::UTC,
    };
    let snapshot_tz = cli.snapshot_timezone.unwrap_or_else(|| {
        match file_cfg.snapshot_timezone.as_deref() {
            Some("display") => SnapshotTz::Display,
            _ => SnapshotTz::Utc,
        }
    });

    rate_limiter::validate(hosts.len(), interval)?;

    Ok(Settings {
        hosts,
        interval,
        timeout_secs,
        slow_threshold,
        panel_position,
        pause_mode,
        color,
        flash_on_fail,
        bell_on_fail,
        ping_helper,
        log_level,
        log_file,
        count: cli.count,
        display_tz,
        snapshot_tz,
    })
}

/// Current wall-clock time in the configured display timezone, per
/// spec.md §6's `-z`/`-Z` options.
fn now_in(tz: chrono_tz::Tz) -> chrono::DateTime<chrono_tz::Tz> {
    chrono::Utc::now().with_timezone(&tz)
}

/// Entry point called from `main`. Returns a non-zero-exit error on any
/// pre-flight failure; all per-ping/resolver failures are handled inside
/// the loop and never surface here.
pub async fn run(cli: CliArgs) -> Result<()> {
    let file_cfg = if cli.no_config {
        FileConfig::default()
    } else {
        config::load_config(cli.config_path.as_deref())?
    };

    let settings = build_settings(&cli, &file_cfg)?;
    logging::init(settings.log_level, settings.log_file.as_deref());
    tracing::info!(hosts = settings.hosts.len(), interval = settings.interval, "starting up");

    let stop = Arc::new(AtomicBool::new(false));
    setup_signal_handler(stop.clone());
    std::panic::set_hook(Box::new(panic_handler));

    let mut host_infos: Vec<HostInfo> = settings
        .hosts
        .iter()
        .map(|h| HostInfo {
            addr: h.addr,
            alias: h.alias.clone(),
            rdns: None,
            asn: None,
        })
        .collect();

    let ring_capacity = 3600usize;
    let mut rings: HashMap<usize, RingState> = HashMap::new();
    let mut stats: HashMap<usize, StatsCounters> = HashMap::new();
    for (id, _) in host_infos.iter().enumerate() {
        rings.insert(id, RingState::new(ring_capacity));
        stats.insert(id, StatsCounters::default());
    }

    let stagger = settings.interval / settings.hosts.len() as f64;
    let scheduler = Arc::new(Scheduler::new(
        Duration::from_secs_f64(settings.interval),
        Duration::from_secs_f64(stagger),
    ));
    let sequence_tracker = Arc::new(SequenceTracker::new(MAX_OUTSTANDING_PER_HOST));
    let (event_tx, mut event_rx) = event_bus();

    let pause_ping = Arc::new(AtomicBool::new(false));
    let prober_config = Arc::new(ProberConfig {
        helper_path: settings.ping_helper.clone(),
        timeout_ms: settings.timeout_secs.saturating_mul(1000),
        slow_threshold: Duration::from_secs_f64(settings.slow_threshold),
        count: settings.count,
        stop: stop.clone(),
        pause_ping: pause_ping.clone(),
    });

    let mut prober_tasks = Vec::new();
    for (id, info) in host_infos.iter().enumerate() {
        prober_tasks.push(tokio::spawn(run_prober(
            id,
            info.addr,
            scheduler.clone(),
            sequence_tracker.clone(),
            event_tx.clone(),
            prober_config.clone(),
        )));
    }
    drop(event_tx);

    let (asn_req_tx, asn_req_rx) = mpsc::unbounded_channel();
    let (asn_reply_tx, mut asn_reply_rx) = mpsc::unbounded_channel();
    let (rdns_req_tx, rdns_req_rx) = mpsc::unbounded_channel();
    let (rdns_reply_tx, mut rdns_reply_rx) = mpsc::unbounded_channel();
    let asn_worker = resolvers::spawn_asn_worker(asn_req_rx, asn_reply_tx);
    let rdns_worker = resolvers::spawn_rdns_worker(rdns_req_rx, rdns_reply_tx);
    let mut asn_cache = AsnCache::default();
    for (id, info) in host_infos.iter().enumerate() {
        let _ = rdns_req_tx.send((id, info.addr));
        if asn_cache.needs_retry(id, wall_now()) {
            let _ = asn_req_tx.send((id, info.addr));
        }
    }

    let mut controller = ControllerState::new(settings.color, settings.pause_mode);
    controller.panel_position = settings.panel_position;
    controller.flash_on_fail = settings.flash_on_fail;
    controller.bell_on_fail = settings.bell_on_fail;
    let mut snapshots = SnapshotRing::new();
    let mut completed_hosts = 0usize;
    let total_hosts = host_infos.len();

    // A terminal without TTY access or a failed tcsetattr (piped stdout,
    // no controlling terminal, etc.) must not be fatal: fall back to a
    // headless run that still drives the probers and reports progress as
    // plain stdout lines instead of the ratatui UI.
    let mut terminal = match TerminalGuard::new(RENDER_INTERVAL.as_millis(), cli.debug) {
        Ok(term) => Some(term),
        Err(e) => {
            tracing::warn!(error = %e, "raw-mode terminal unavailable, degrading to plain-text progress");
            eprintln!("warning: terminal UI unavailable ({e}); continuing with plain-text progress");
            None
        }
    };
    let start = Instant::now();
    let mut last_render = Instant::now() - RENDER_INTERVAL;
    let mut esc_started: Option<Instant> = None;

    'main: while !stop.load(Ordering::Relaxed) {
        if terminal.is_some() {
            if event::poll(UI_TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        // ignore release/repeat noise on platforms that report it
                    } else if key.code == KeyCode::Esc {
                        esc_started = Some(Instant::now());
                    } else if let Some(started) = esc_started.take() {
                        // crossterm decodes CSI sequences into discrete key
                        // events before we see them, so an arrow arriving
                        // within the cap is the sequence's resolution; any
                        // other key means Esc was bare, and that key must
                        // still be dispatched rather than discarded.
                        let resolved = if started.elapsed() <= escape::TOTAL_CAP {
                            match key.code {
                                KeyCode::Up => ResolvedKey::ArrowUp,
                                KeyCode::Down => ResolvedKey::ArrowDown,
                                KeyCode::Left => ResolvedKey::ArrowLeft,
                                KeyCode::Right => ResolvedKey::ArrowRight,
                                _ => ResolvedKey::Bare,
                            }
                        } else {
                            ResolvedKey::Bare
                        };
                        let is_arrow = matches!(
                            resolved,
                            ResolvedKey::ArrowUp | ResolvedKey::ArrowDown | ResolvedKey::ArrowLeft | ResolvedKey::ArrowRight
                        );
                        let effect = controller::dispatch_escape(&mut controller, resolved);
                        apply_effect(effect, &mut controller, &mut snapshots, &rings, settings.display_tz, settings.snapshot_tz);
                        if !is_arrow && key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                            stop.store(true, Ordering::Relaxed);
                        } else if !is_arrow {
                            let effect = dispatch_normal_key(key, &mut controller);
                            if effect == Effect::Quit {
                                stop.store(true, Ordering::Relaxed);
                                break 'main;
                            }
                            apply_effect(effect, &mut controller, &mut snapshots, &rings, settings.display_tz, settings.snapshot_tz);
                        }
                    } else if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        stop.store(true, Ordering::Relaxed);
                    } else {
                        let effect = dispatch_normal_key(key, &mut controller);
                        if effect == Effect::Quit {
                            stop.store(true, Ordering::Relaxed);
                            break 'main;
                        }
                        apply_effect(effect, &mut controller, &mut snapshots, &rings, settings.display_tz, settings.snapshot_tz);
                    }
                }
            }
            if esc_started.is_some_and(|s| s.elapsed() > escape::TOTAL_CAP) {
                esc_started = None;
                controller::dispatch_escape(&mut controller, ResolvedKey::Bare);
            }
        } else {
            tokio::time::sleep(UI_TICK).await;
        }

        pause_ping.store(
            controller.paused && controller.pause_mode == PauseMode::Ping,
            Ordering::Relaxed,
        );

        for event in crate::events::drain(&mut event_rx) {
            match event {
                PingEvent::Sent { host_id, seq, sent_time } => {
                    if let Some(ring) = rings.get_mut(&host_id) {
                        ring.record_sent(seq, sent_time);
                    }
                }
                PingEvent::Final { host_id, seq, status, rtt, ttl } => {
                    if let Some(ring) = rings.get_mut(&host_id) {
                        let rtt_secs = rtt.map(|d| d.as_secs_f64());
                        let resolved = ring.record_final(seq, status, rtt_secs, ttl, wall_now());
                        if let Some(s) = stats.get_mut(&host_id) {
                            s.record(resolved, rtt_secs);
                        }
                        if resolved == crate::ring::SlotStatus::Fail
                            && !controller.show_help
                            && controller.mode == Mode::Live
                        {
                            if controller.bell_on_fail {
                                eprint!("\x07");
                            }
                            if controller.flash_on_fail {
                                // reverse-video flash: invert then restore
                                eprint!("\x1b[?5h\x1b[?5l");
                            }
                        }
                    }
                }
                PingEvent::Done { host_id: _ } => {
                    completed_hosts += 1;
                    if total_hosts > 0 && completed_hosts >= total_hosts && settings.count > 0 {
                        stop.store(true, Ordering::Relaxed);
                    }
                }
            }
        }

        while let Ok(reply) = asn_reply_rx.try_recv() {
            let AsnReply { host_id, asn } = reply;
            asn_cache.set(host_id, asn, wall_now());
            if let Some(info) = host_infos.get_mut(host_id) {
                info.asn = asn;
            }
        }
        while let Ok(reply) = rdns_reply_rx.try_recv() {
            let RdnsReply { host_id, name } = reply;
            if let Some(info) = host_infos.get_mut(host_id) {
                info.rdns = name;
            }
        }

        if !controller.paused || controller.pause_mode == PauseMode::Display {
            snapshots.maybe_snapshot(wall_now(), &rings, &stats);
        }

        if last_render.elapsed() >= RENDER_INTERVAL {
            last_render = Instant::now();
            match terminal.as_mut() {
                Some(term) => draw(term, &controller, &host_infos, &rings, &stats, &mut snapshots, start, settings.display_tz)?,
                None => print_progress_line(&host_infos, &rings, &stats, start),
            }
        }
    }

    drop(terminal);
    tracing::info!("shutting down, waiting for prober tasks");
    drop(asn_req_tx);
    drop(rdns_req_tx);
    for task in prober_tasks {
        let _ = task.await;
    }
    let _ = asn_worker.await;
    let _ = rdns_worker.await;

    print_summary(&host_infos, &stats);
    Ok(())
}

/// Dispatch a key that isn't Esc and isn't part of an Esc-prefixed arrow
/// sequence: plain characters and Enter. Ctrl-C is handled by the caller.
fn dispatch_normal_key(key: event::KeyEvent, controller: &mut ControllerState) -> Effect {
    if let KeyCode::Char(c) = key.code {
        controller::dispatch_char(controller, c)
    } else if matches!(key.code, KeyCode::Enter) {
        controller::dispatch_char(controller, '\r')
    } else {
        Effect::None
    }
}

fn apply_effect(
    effect: Effect,
    controller: &mut ControllerState,
    snapshots: &mut SnapshotRing,
    rings: &HashMap<usize, RingState>,
    display_tz: chrono_tz::Tz,
    snapshot_tz: SnapshotTz,
) {
    match effect {
        Effect::HistoryBack => {
            let step = snapshots.cached_page_step(80, 24, 60);
            snapshots.move_back(step);
            controller.status_message = Some(format!("Viewing {} snapshot(s) ago", snapshots.history_offset()));
        }
        Effect::HistoryForward => {
            let step = snapshots.cached_page_step(80, 24, 60);
            snapshots.move_forward(step);
            if snapshots.is_live() {
                controller.status_message = None;
            }
        }
        Effect::InvalidateLayoutCache => {
            snapshots.invalidate_page_step_cache();
        }
        Effect::SaveSnapshot => {
            let tz = match snapshot_tz {
                SnapshotTz::Display => display_tz,
                SnapshotTz::Utc => chrono_tz::UTC,
            };
            save_snapshot_file(rings, tz);
        }
        Effect::ScrollUp => {
            controller.host_scroll_offset = controller.host_scroll_offset.saturating_sub(1);
        }
        Effect::ScrollDown => {
            controller.host_scroll_offset = controller.host_scroll_offset.saturating_add(1);
        }
        Effect::Quit | Effect::EnterHostSelectGraph | Effect::None => {}
    }
}

/// Render every host's timeline as plain (uncolored) text lines and write
/// them to `paraping_snapshot_<timestamp>.txt`, per spec.md §6.
fn save_snapshot_file(rings: &HashMap<usize, RingState>, tz: chrono_tz::Tz) {
    let now = now_in(tz);
    let filename = format!("paraping_snapshot_{}.txt", now.format("%Y%m%d_%H%M%S"));
    let mut lines = Vec::new();
    let mut ids: Vec<_> = rings.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        if let Some(ring) = rings.get(&id) {
            let glyphs: String = ring.timeline().iter().map(|s| render::status_glyph(*s)).collect();
            lines.push(render::format_status_line(&id.to_string(), &glyphs, 8));
        }
    }
    if let Err(e) = std::fs::write(&filename, lines.join("\n")) {
        tracing::warn!(error = %e, "failed to write snapshot file");
    }
}

fn draw(
    terminal: &mut TerminalGuard,
    controller: &ControllerState,
    host_infos: &[HostInfo],
    rings: &HashMap<usize, RingState>,
    stats: &HashMap<usize, StatsCounters>,
    snapshots: &mut SnapshotRing,
    start: Instant,
    display_tz: chrono_tz::Tz,
) -> std::io::Result<()> {
    terminal.term.draw(|frame| {
        let area = frame.area();
        let sizes = compute_panel_sizes(area, controller.panel_position);

        let entries: Vec<HostEntry> = host_infos
            .iter()
            .enumerate()
            .map(|(id, info)| HostEntry {
                host_id: id,
                label: info.alias.clone(),
                fail_count: stats.get(&id).map(|s| s.fail).unwrap_or(0),
                fail_streak: rings.get(&id).map(|r| r.fail_streak()).unwrap_or(0),
                latest_rtt: rings.get(&id).and_then(|r| r.latest_rtt()),
            })
            .collect();
        let entries = render::build_display_entries(
            entries,
            controller.sort_mode,
            controller.filter_mode,
            DEFAULT_SLOW_THRESHOLD_SECS,
        );

        let label_lens: Vec<usize> = entries.iter().map(|e| e.label.len()).collect();
        let main_layout = compute_main_layout(&label_lens, sizes.main, 2);
        let _page_step = snapshots.cached_page_step(area.width as usize, area.height as usize, main_layout.timeline_width as usize);

        let now = now_in(display_tz);
        let header = render::render_header(
            controller.paused,
            controller.sort_mode.label(),
            controller.main_view,
            &now.format("%H:%M:%S %Z").to_string(),
        );

        let mut lines: Vec<Line> = vec![Line::from(header)];
        for entry in entries.iter().take(main_layout.visible_hosts as usize) {
            if let Some(ring) = rings.get(&entry.host_id) {
                lines.push(render::render_main_row(
                    controller.main_view,
                    ring,
                    &entry.label,
                    main_layout.label_width as usize,
                    controller.use_color,
                ));
            }
        }

        let main_block = Block::default().borders(Borders::ALL).title("ParaPing");
        frame.render_widget(Paragraph::new(lines).block(main_block), sizes.main);

        if let Some(panel_area) = sizes.panel {
            let mut panel_lines: Vec<Line> = Vec::new();
            for entry in &entries {
                if let (Some(ring), Some(s)) = (rings.get(&entry.host_id), stats.get(&entry.host_id)) {
                    let suffix = render::build_summary_suffix(controller.summary_mode, ring, s);
                    panel_lines.push(Line::from(format!("{}: {}", entry.label, suffix)));
                }
            }
            let panel_block = Block::default().borders(Borders::ALL).title("Summary");
            frame.render_widget(Paragraph::new(panel_lines).block(panel_block), panel_area);
        }

        let status_area = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area)[1];
        let activity = render::activity_indicator(start.elapsed(), 10, 20, controller.paused);
        let status = render::build_status_line(
            controller.sort_mode,
            controller.filter_mode,
            controller.paused,
            controller.status_message.as_deref(),
        );
        frame.render_widget(Paragraph::new(format!("{status} {activity}")), status_area);

        if controller.show_help {
            render_help_overlay(frame, area);
        }
    })?;
    Ok(())
}

fn render_help_overlay(frame: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect) {
    let help_text = [
        "q quit | h help | v view | o sort | f filter | a asn | m summary",
        "c color | b bell | F fullscreen | w panel | W panel pos | p pause | s snapshot",
        "g/G host select | n/p navigate | Enter graph | Esc cancel",
    ]
    .join("\n");
    let block = Block::default().borders(Borders::ALL).title("Help (press any key)");
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Non-interactive fallback for when raw-mode setup fails: one line per
/// render tick summarizing each host's latest status, with no ANSI
/// positioning or ratatui framing.
fn print_progress_line(
    host_infos: &[HostInfo],
    rings: &HashMap<usize, RingState>,
    stats: &HashMap<usize, StatsCounters>,
    start: Instant,
) {
    let mut parts = Vec::with_capacity(host_infos.len());
    for (id, info) in host_infos.iter().enumerate() {
        let glyph = rings
            .get(&id)
            .and_then(|r| r.timeline().iter().next_back().copied())
            .map(render::status_glyph)
            .unwrap_or('.');
        let fails = stats.get(&id).map(|s| s.fail).unwrap_or(0);
        parts.push(format!("{}:{glyph}({fails})", info.alias));
    }
    println!("[{:>6.1}s] {}", start.elapsed().as_secs_f64(), parts.join(" "));
}

fn print_summary(host_infos: &[HostInfo], stats: &HashMap<usize, StatsCounters>) {
    println!("{}", "=".repeat(60));
    println!("SUMMARY");
    println!("{}", "=".repeat(60));
    for (id, info) in host_infos.iter().enumerate() {
        if let Some(s) = stats.get(&id) {
            println!(
                "{:<20} sent/recv {}/{} loss {:.1}% mean {:.1}ms",
                info.alias,
                s.total,
                s.success + s.slow,
                s.loss_rate().unwrap_or(0.0),
                s.mean_rtt().unwrap_or(0.0) * 1000.0,
            );
        }
    }
}

fn setup_signal_handler(stop: Arc<AtomicBool>) {
    use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::Signals;

    let listen = [SIGINT, SIGTERM, SIGQUIT];
    if let Ok(mut signals) = Signals::new(listen) {
        std::thread::spawn(move || {
            for _sig in signals.forever() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    }
}
